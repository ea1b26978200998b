//! Single-pass inverted index construction over a term-sorted record stream.
//!
//! A term's block is `vbyte(docId deltas) ++ vbyte(frequencies)`; the first
//! delta is the absolute docId. Blocks are appended to the postings blob back
//! to back and only the lexicon knows where one ends and the next begins.

use crate::codec;
use crate::index::{DocId, LexiconEntry, PostingRecord};
use crate::persist::{create_text_writer, now_rfc3339, open_text_reader, save_meta, IndexPaths, MetaFile, FORMAT_VERSION};
use crate::Result;
use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufWriter, Write};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BuildStats {
    pub terms: u64,
    pub postings: u64,
    pub bytes: u64,
    pub skipped_lines: u64,
}

pub struct IndexBuilder<P: Write, L: Write> {
    postings: P,
    lexicon: L,
    term: Option<String>,
    docs: BTreeMap<DocId, u32>,
    offset: u64,
    block: Vec<u8>,
    stats: BuildStats,
}

impl<P: Write, L: Write> IndexBuilder<P, L> {
    pub fn new(postings: P, lexicon: L) -> Self {
        Self {
            postings,
            lexicon,
            term: None,
            docs: BTreeMap::new(),
            offset: 0,
            block: Vec::new(),
            stats: BuildStats::default(),
        }
    }

    /// Records must arrive sorted by term; a term change flushes the previous group.
    pub fn push(&mut self, rec: PostingRecord) -> Result<()> {
        if self.term.as_deref() != Some(rec.term.as_str()) {
            self.flush_term()?;
            self.term = Some(rec.term);
        }
        self.docs.insert(rec.doc_id, rec.frequency);
        Ok(())
    }

    /// Parse and push every line of a sorted stream, skipping malformed lines.
    pub fn push_lines<R: BufRead>(&mut self, reader: R) -> Result<()> {
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match PostingRecord::parse(&line) {
                Some(rec) => self.push(rec)?,
                None => {
                    tracing::warn!(line = i + 1, content = %line, "skipping malformed posting");
                    self.stats.skipped_lines += 1;
                }
            }
        }
        Ok(())
    }

    fn flush_term(&mut self) -> Result<()> {
        let Some(term) = self.term.take() else {
            return Ok(());
        };
        if self.docs.is_empty() {
            return Ok(());
        }
        self.block.clear();
        let mut prev: DocId = 0;
        for &doc_id in self.docs.keys() {
            codec::encode(doc_id - prev, &mut self.block);
            prev = doc_id;
        }
        codec::encode_all(self.docs.values().copied(), &mut self.block);

        self.postings.write_all(&self.block)?;
        let entry = LexiconEntry {
            offset: self.offset,
            length: self.block.len() as u64,
            doc_count: self.docs.len() as u32,
        };
        self.lexicon.write_all(entry.to_line(&term).as_bytes())?;

        self.offset += entry.length;
        self.stats.terms += 1;
        self.stats.postings += self.docs.len() as u64;
        self.stats.bytes = self.offset;
        self.docs.clear();
        Ok(())
    }

    /// Flush the last group and hand back the sinks.
    pub fn finish(mut self) -> Result<(P, L, BuildStats)> {
        self.flush_term()?;
        self.postings.flush()?;
        self.lexicon.flush()?;
        Ok((self.postings, self.lexicon, self.stats))
    }
}

/// Build `postings.bin`, `lexicon.zst` and `meta.json` from the sorted stream.
pub fn build_index(paths: &IndexPaths) -> Result<BuildStats> {
    // The manifest marks a finished index; it comes back only once everything is flushed.
    match std::fs::remove_file(paths.meta()) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => return Err(e.into()),
        _ => {}
    }
    let reader = open_text_reader(&paths.sorted())?;
    let postings = BufWriter::new(File::create(paths.postings())?);
    let lexicon = create_text_writer(&paths.lexicon())?;

    let mut builder = IndexBuilder::new(postings, lexicon);
    builder.push_lines(reader)?;
    let (postings, lexicon, stats) = builder.finish()?;
    postings.into_inner().map_err(|e| e.into_error())?.sync_all()?;
    lexicon.finish()?;

    let num_docs = count_mapped_docs(paths)?;
    let meta = MetaFile {
        num_docs,
        num_terms: stats.terms,
        postings_bytes: stats.bytes,
        created_at: now_rfc3339(),
        version: FORMAT_VERSION,
    };
    save_meta(paths, &meta)?;
    tracing::info!(num_docs, num_terms = stats.terms, postings_bytes = stats.bytes, "index build complete");
    Ok(stats)
}

fn count_mapped_docs(paths: &IndexPaths) -> Result<u32> {
    if !paths.doc_mapping().exists() {
        return Ok(0);
    }
    let mut n = 0;
    for line in open_text_reader(&paths.doc_mapping())?.lines() {
        if !line?.trim().is_empty() {
            n += 1;
        }
    }
    Ok(n)
}
