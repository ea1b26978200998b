//! Turns page text into unsorted posting segments plus the document mapping.

use crate::index::{DocId, DocMeta, PostingRecord};
use crate::persist::{create_text_writer, IndexPaths, TextWriter};
use crate::tokenizer::count_terms;
use crate::Result;
use std::fs::{create_dir_all, remove_dir_all, File};
use std::io::{BufWriter, Write};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EmitStats {
    pub accepted: u32,
    pub rejected: u32,
    pub missing_url: u32,
    pub postings: u64,
}

/// Owns docId allocation and the document mapping stream across all segments.
pub struct PostingEmitter {
    paths: IndexPaths,
    mapping: TextWriter,
    last_doc_id: DocId,
    stats: EmitStats,
}

impl PostingEmitter {
    /// Start a fresh emit run. Segments and text stores left by an earlier
    /// run are removed, since their docIds would collide with the new ones.
    pub fn create(paths: IndexPaths) -> Result<Self> {
        for dir in [paths.segments_dir(), paths.texts_dir()] {
            if dir.exists() {
                remove_dir_all(&dir)?;
            }
            create_dir_all(&dir)?;
        }
        let mapping = create_text_writer(&paths.doc_mapping())?;
        Ok(Self { paths, mapping, last_doc_id: 0, stats: EmitStats::default() })
    }

    /// Start writing segment `index`: its posting stream and its text store.
    pub fn begin_segment(&mut self, index: usize) -> Result<SegmentEmitter<'_>> {
        let postings = create_text_writer(&self.paths.segment(index))?;
        let text_name = IndexPaths::text_store_name(index);
        let texts = BufWriter::new(File::create(self.paths.root.join(&text_name))?);
        Ok(SegmentEmitter { parent: self, postings, texts, text_name, text_offset: 0 })
    }

    pub fn stats(&self) -> EmitStats {
        self.stats
    }

    pub fn finish(self) -> Result<EmitStats> {
        self.mapping.finish()?;
        Ok(self.stats)
    }
}

pub struct SegmentEmitter<'a> {
    parent: &'a mut PostingEmitter,
    postings: TextWriter,
    texts: BufWriter<File>,
    text_name: String,
    text_offset: u64,
}

impl SegmentEmitter<'_> {
    /// Emit one page. Returns the assigned docId, or `None` when the page is skipped.
    pub fn emit(&mut self, url: Option<&str>, body: &str) -> Result<Option<DocId>> {
        let url = match url.map(str::trim) {
            Some(u) if !u.is_empty() && !u.contains(char::is_whitespace) => u,
            _ => {
                self.parent.stats.missing_url += 1;
                return Ok(None);
            }
        };
        let terms = count_terms(body);
        if !terms.is_indexable() {
            tracing::debug!(url, raw = terms.raw_tokens, accepted = terms.accepted, "page rejected");
            self.parent.stats.rejected += 1;
            return Ok(None);
        }

        let doc_id = self.parent.last_doc_id + 1;
        for (term, frequency) in terms.counts {
            let rec = PostingRecord { term, doc_id, frequency };
            self.postings.write_all(rec.to_line().as_bytes())?;
            self.parent.stats.postings += 1;
        }

        let bytes = body.as_bytes();
        self.texts.write_all(bytes)?;
        let meta = DocMeta {
            url: url.to_string(),
            term_count: terms.accepted,
            source_file: self.text_name.clone(),
            offset: self.text_offset,
            length: bytes.len() as u64,
        };
        self.text_offset += bytes.len() as u64;
        self.parent.mapping.write_all(meta.to_line(doc_id).as_bytes())?;

        self.parent.last_doc_id = doc_id;
        self.parent.stats.accepted += 1;
        Ok(Some(doc_id))
    }

    pub fn finish(mut self) -> Result<()> {
        self.texts.flush()?;
        self.postings.finish()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::open_text_reader;
    use std::io::BufRead;
    use tempfile::tempdir;

    fn page(terms: usize, noise: usize) -> String {
        let mut s = String::new();
        for i in 0..terms {
            s.push_str(if i % 2 == 0 { "alpha " } else { "beta " });
        }
        for _ in 0..noise {
            s.push_str("- ");
        }
        s
    }

    #[test]
    fn low_signal_pages_get_no_doc_id() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let mut emitter = PostingEmitter::create(paths.clone()).unwrap();
        let mut seg = emitter.begin_segment(1).unwrap();
        assert_eq!(seg.emit(Some("http://a.example/"), &page(10, 90)).unwrap(), None);
        assert_eq!(seg.emit(Some("http://b.example/"), &page(11, 89)).unwrap(), Some(1));
        assert_eq!(seg.emit(None, &page(50, 0)).unwrap(), None);
        assert_eq!(seg.emit(Some("http://c.example/"), &page(4, 0)).unwrap(), Some(2));
        seg.finish().unwrap();
        let stats = emitter.finish().unwrap();
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.rejected, 1);
        assert_eq!(stats.missing_url, 1);

        let postings: Vec<String> =
            open_text_reader(&paths.segment(1)).unwrap().lines().map(|l| l.unwrap()).collect();
        assert_eq!(postings, vec!["alpha 1 6", "beta 1 5", "alpha 2 2", "beta 2 2"]);

        let mapping: Vec<String> =
            open_text_reader(&paths.doc_mapping()).unwrap().lines().map(|l| l.unwrap()).collect();
        assert_eq!(mapping.len(), 2);
        let (id, meta) = DocMeta::parse(&mapping[1]).unwrap();
        assert_eq!(id, 2);
        assert_eq!(meta.term_count, 4);
        let text = std::fs::read(dir.path().join(&meta.source_file)).unwrap();
        let start = meta.offset as usize;
        assert_eq!(&text[start..start + meta.length as usize], page(4, 0).as_bytes());
    }

    #[test]
    fn new_run_discards_previous_segments() {
        let dir = tempdir().unwrap();
        let paths = IndexPaths::new(dir.path());
        let mut emitter = PostingEmitter::create(paths.clone()).unwrap();
        for i in 1..=2 {
            let mut seg = emitter.begin_segment(i).unwrap();
            seg.emit(Some("http://old.example/"), "python code here").unwrap();
            seg.finish().unwrap();
        }
        emitter.finish().unwrap();
        assert_eq!(paths.list_segments().unwrap().len(), 2);

        let mut emitter = PostingEmitter::create(paths.clone()).unwrap();
        let mut seg = emitter.begin_segment(1).unwrap();
        assert_eq!(seg.emit(Some("http://new.example/"), "gardening tips today").unwrap(), Some(1));
        seg.finish().unwrap();
        emitter.finish().unwrap();

        assert_eq!(paths.list_segments().unwrap(), vec![paths.segment(1)]);
        assert!(!dir.path().join(IndexPaths::text_store_name(2)).exists());
        let postings: Vec<String> =
            open_text_reader(&paths.segment(1)).unwrap().lines().map(|l| l.unwrap()).collect();
        assert!(postings.iter().all(|l| !l.starts_with("python")));
    }

    #[test]
    fn doc_ids_continue_across_segments() {
        let dir = tempdir().unwrap();
        let mut emitter = PostingEmitter::create(IndexPaths::new(dir.path())).unwrap();
        let mut seg = emitter.begin_segment(1).unwrap();
        assert_eq!(seg.emit(Some("http://a.example/"), "first page body").unwrap(), Some(1));
        seg.finish().unwrap();
        let mut seg = emitter.begin_segment(2).unwrap();
        assert_eq!(seg.emit(Some("http://b.example/"), "second page body").unwrap(), Some(2));
        seg.finish().unwrap();
        assert_eq!(emitter.stats().accepted, 2);
    }
}
