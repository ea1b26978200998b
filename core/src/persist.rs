use crate::Result;
use serde::{Deserialize, Serialize};
use std::fs::{create_dir_all, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

pub const FORMAT_VERSION: u32 = 1;
const ZSTD_LEVEL: i32 = 3;

#[derive(Debug, Serialize, Deserialize)]
pub struct MetaFile {
    pub num_docs: u32,
    pub num_terms: u64,
    pub postings_bytes: u64,
    pub created_at: String,
    pub version: u32,
}

#[derive(Debug, Clone)]
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn segments_dir(&self) -> PathBuf { self.root.join("segments") }
    pub fn segment(&self, index: usize) -> PathBuf { self.segments_dir().join(format!("{index:05}.zst")) }
    pub fn texts_dir(&self) -> PathBuf { self.root.join("texts") }
    /// Text store path relative to the root, as written into the document mapping.
    pub fn text_store_name(index: usize) -> String { format!("texts/{index:05}.txt") }
    pub fn doc_mapping(&self) -> PathBuf { self.root.join("doc_mapping.zst") }
    pub fn sorted(&self) -> PathBuf { self.root.join("sorted.zst") }
    pub fn postings(&self) -> PathBuf { self.root.join("postings.bin") }
    pub fn lexicon(&self) -> PathBuf { self.root.join("lexicon.zst") }
    pub fn meta(&self) -> PathBuf { self.root.join("meta.json") }

    /// All emitted segment streams in segment order.
    pub fn list_segments(&self) -> Result<Vec<PathBuf>> {
        let mut out = Vec::new();
        for entry in std::fs::read_dir(self.segments_dir())? {
            let p = entry?.path();
            if p.extension().and_then(|s| s.to_str()) == Some("zst") {
                out.push(p);
            }
        }
        out.sort();
        Ok(out)
    }
}

fn is_compressed(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("zst")
}

/// Open a line-oriented stream, decompressing `.zst` files.
pub fn open_text_reader(path: &Path) -> Result<Box<dyn BufRead>> {
    let file = File::open(path)?;
    if is_compressed(path) {
        let decoder = zstd::Decoder::new(file)?;
        Ok(Box::new(BufReader::new(decoder)))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Create a line-oriented stream. Dropping without calling `finish` may lose the tail.
pub fn create_text_writer(path: &Path) -> Result<TextWriter> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let file = BufWriter::new(File::create(path)?);
    if is_compressed(path) {
        Ok(TextWriter::Zstd(zstd::Encoder::new(file, ZSTD_LEVEL)?))
    } else {
        Ok(TextWriter::Plain(file))
    }
}

pub enum TextWriter {
    Plain(BufWriter<File>),
    Zstd(zstd::Encoder<'static, BufWriter<File>>),
}

impl TextWriter {
    pub fn finish(self) -> Result<()> {
        let mut inner = match self {
            TextWriter::Plain(w) => w,
            TextWriter::Zstd(enc) => enc.finish()?,
        };
        inner.flush()?;
        Ok(())
    }
}

impl Write for TextWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            TextWriter::Plain(w) => w.write(buf),
            TextWriter::Zstd(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            TextWriter::Plain(w) => w.flush(),
            TextWriter::Zstd(w) => w.flush(),
        }
    }
}

/// Positioned read of `length` bytes at `offset`. The range must lie inside
/// the file; nothing is allocated for a range that does not.
pub fn read_range(path: &Path, offset: u64, length: u64) -> Result<Vec<u8>> {
    let mut f = File::open(path)?;
    let file_len = f.metadata()?.len();
    match offset.checked_add(length) {
        Some(end) if end <= file_len => {}
        _ => {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("range {offset}+{length} exceeds file length {file_len}"),
            )
            .into())
        }
    }
    f.seek(SeekFrom::Start(offset))?;
    let mut buf = vec![0u8; length as usize];
    f.read_exact(&mut buf)?;
    Ok(buf)
}

pub fn save_meta(paths: &IndexPaths, meta: &MetaFile) -> Result<()> {
    create_dir_all(&paths.root)?;
    let mut f = File::create(paths.meta())?;
    let json = serde_json::to_string_pretty(meta)?;
    f.write_all(json.as_bytes())?;
    Ok(())
}

pub fn load_meta(paths: &IndexPaths) -> Result<MetaFile> {
    let mut f = File::open(paths.meta())?;
    let mut buf = String::new();
    f.read_to_string(&mut buf)?;
    let meta: MetaFile = serde_json::from_str(&buf)?;
    Ok(meta)
}

pub fn now_rfc3339() -> String {
    time::OffsetDateTime::now_utc()
        .format(&time::format_description::well_known::Rfc3339)
        .unwrap_or_default()
}
