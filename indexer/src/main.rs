use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use serde::Deserialize;
use tracing_subscriber::{fmt, EnvFilter};
use walkdir::WalkDir;
use webdex_core::builder::build_index;
use webdex_core::emitter::{EmitStats, PostingEmitter, SegmentEmitter};
use webdex_core::sort::sort_segments;
use webdex_core::{EngineConfig, IndexPaths, QueryMode, SearchContext};

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

/// One crawled page as produced by the archive reader.
#[derive(Debug, Deserialize)]
struct InputPage {
    #[serde(default)]
    url: Option<String>,
    body: String,
}

#[derive(Parser)]
#[command(name = "indexer")]
#[command(about = "Build and query a compressed BM25 inverted index", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Turn page files (JSON/JSONL) into posting segments and the document mapping
    Emit {
        /// Input path (file or directory)
        #[arg(long)]
        input: String,
        /// Index directory
        #[arg(long)]
        output: String,
    },
    /// Sort all posting segments by term, then docId
    Sort {
        #[arg(long)]
        index: String,
    },
    /// Build the lexicon and postings blob from the sorted stream
    Build {
        #[arg(long)]
        index: String,
    },
    /// Emit, sort and build in one go
    Pipeline {
        #[arg(long)]
        input: String,
        #[arg(long)]
        output: String,
    },
    /// Run one query against a built index
    Query {
        #[arg(long)]
        index: String,
        /// Space-separated keywords
        #[arg(long)]
        q: String,
        /// union | intersection
        #[arg(long, default_value = "intersection")]
        mode: String,
        /// Number of results
        #[arg(long, default_value_t = 10)]
        k: usize,
    },
}

fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Emit { input, output } => emit(&input, &output).map(|_| ()),
        Commands::Sort { index } => sort(&IndexPaths::new(index)),
        Commands::Build { index } => {
            build_index(&IndexPaths::new(index))?;
            Ok(())
        }
        Commands::Pipeline { input, output } => {
            emit(&input, &output)?;
            let paths = IndexPaths::new(&output);
            sort(&paths)?;
            build_index(&paths)?;
            Ok(())
        }
        Commands::Query { index, q, mode, k } => query(&index, &q, &mode, k),
    }
}

fn input_files(input: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = Vec::new();
    if input.is_dir() {
        for entry in WalkDir::new(input).into_iter().filter_map(|e| e.ok()) {
            let p = entry.path();
            if p.is_file() {
                if let Some(ext) = p.extension().and_then(|s| s.to_str()) {
                    if matches!(ext, "json" | "jsonl") {
                        files.push(p.to_path_buf());
                    }
                }
            }
        }
    } else if input.is_file() {
        files.push(input.to_path_buf());
    }
    files.sort();
    files
}

fn emit(input: &str, output: &str) -> Result<EmitStats> {
    let files = input_files(Path::new(input));
    if files.is_empty() {
        bail!("no .json or .jsonl input under {input}");
    }
    let mut emitter = PostingEmitter::create(IndexPaths::new(output))?;
    for (i, file) in files.iter().enumerate() {
        let mut segment = emitter.begin_segment(i + 1)?;
        if file.extension().and_then(|s| s.to_str()) == Some("jsonl") {
            emit_jsonl(file, &mut segment)?;
        } else {
            emit_json(file, &mut segment)?;
        }
        segment.finish()?;
        tracing::info!(segment = i + 1, file = %file.display(), "segment written");
    }
    let stats = emitter.finish()?;
    tracing::info!(
        num_docs = stats.accepted,
        rejected = stats.rejected,
        missing_url = stats.missing_url,
        postings = stats.postings,
        "emitted postings"
    );
    Ok(stats)
}

fn emit_jsonl(file: &Path, segment: &mut SegmentEmitter<'_>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    for (i, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() { continue; }
        match serde_json::from_str::<InputPage>(&line) {
            Ok(page) => {
                segment.emit(page.url.as_deref(), &page.body)?;
            }
            Err(e) => tracing::warn!(file = %file.display(), line = i + 1, error = %e, "skipping malformed page"),
        }
    }
    Ok(())
}

fn emit_json(file: &Path, segment: &mut SegmentEmitter<'_>) -> Result<()> {
    let reader = BufReader::new(File::open(file)?);
    let json: serde_json::Value = serde_json::from_reader(reader)?;
    let values = match json {
        serde_json::Value::Array(arr) => arr,
        v @ serde_json::Value::Object(_) => vec![v],
        _ => vec![],
    };
    for v in values {
        match serde_json::from_value::<InputPage>(v) {
            Ok(page) => {
                segment.emit(page.url.as_deref(), &page.body)?;
            }
            Err(e) => tracing::warn!(file = %file.display(), error = %e, "skipping malformed page"),
        }
    }
    Ok(())
}

fn sort(paths: &IndexPaths) -> Result<()> {
    let segments = paths.list_segments()?;
    sort_segments(&segments, &paths.sorted())?;
    Ok(())
}

fn query(index: &str, q: &str, mode: &str, k: usize) -> Result<()> {
    let mode: QueryMode = match mode.parse() {
        Ok(m) => m,
        Err(e) => bail!(e),
    };
    let ctx = SearchContext::open(IndexPaths::new(index), EngineConfig::default().with_result_limit(k))?;
    let start = std::time::Instant::now();
    let hits = ctx.search_top(q, mode, k);
    for r in &hits.results {
        println!("URL = {}", r.url);
        println!("score = {:.4}", r.score);
        println!();
        println!("{}", r.snippet.as_deref().unwrap_or(""));
        println!("{}", "=".repeat(72));
    }
    println!("{} of {} hits in {:.3} s", hits.results.len(), hits.total_hits, start.elapsed().as_secs_f64());
    Ok(())
}
