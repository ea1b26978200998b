//! Loaders for the two in-memory tables the query engine needs.

use crate::index::{DocId, DocMeta, LexiconEntry};
use crate::persist::open_text_reader;
use crate::Result;
use std::collections::HashMap;
use std::io::BufRead;
use std::path::Path;

#[derive(Debug, Default, Clone)]
pub struct Lexicon {
    entries: HashMap<String, LexiconEntry>,
}

impl Lexicon {
    pub fn load(path: &Path) -> Result<Self> {
        let lexicon = Self::from_reader(open_text_reader(path)?)?;
        tracing::info!(terms = lexicon.len(), path = %path.display(), "lexicon loaded");
        Ok(lexicon)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut entries = HashMap::new();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match LexiconEntry::parse(&line) {
                Some((term, entry)) => {
                    entries.insert(term, entry);
                }
                None => tracing::warn!(line = i + 1, "skipping malformed lexicon entry"),
            }
        }
        Ok(Self { entries })
    }

    pub fn get(&self, term: &str) -> Option<&LexiconEntry> {
        self.entries.get(term)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// docId -> document metadata, plus the collection totals BM25 needs.
#[derive(Debug, Default, Clone)]
pub struct DocumentMap {
    docs: HashMap<DocId, DocMeta>,
    total_terms: u64,
}

impl DocumentMap {
    pub fn load(path: &Path) -> Result<Self> {
        let map = Self::from_reader(open_text_reader(path)?)?;
        tracing::info!(docs = map.len(), total_terms = map.total_terms, "document mapping loaded");
        Ok(map)
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut map = Self::default();
        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match DocMeta::parse(&line) {
                Some((doc_id, meta)) => map.insert(doc_id, meta),
                None => tracing::warn!(line = i + 1, "skipping malformed document mapping"),
            }
        }
        Ok(map)
    }

    pub fn insert(&mut self, doc_id: DocId, meta: DocMeta) {
        self.total_terms += u64::from(meta.term_count);
        if let Some(old) = self.docs.insert(doc_id, meta) {
            self.total_terms -= u64::from(old.term_count);
        }
    }

    pub fn get(&self, doc_id: DocId) -> Option<&DocMeta> {
        self.docs.get(&doc_id)
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    pub fn total_terms(&self) -> u64 {
        self.total_terms
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicon_skips_bad_lines() {
        let text = "nobel 1 12 3 \nbroken 5\nprize x 1 1\n\nnigeria 13 4 2 \n";
        let lex = Lexicon::from_reader(text.as_bytes()).unwrap();
        assert_eq!(lex.len(), 2);
        assert_eq!(lex.get("nigeria").unwrap().offset, 12);
        assert!(lex.get("prize").is_none());
    }

    #[test]
    fn mapping_totals() {
        let text = "1 http://a/ 10 texts/1.txt 1 40 \n2 http://b/ 20 texts/1.txt 41 80 \n3 http://c/ \n";
        let map = DocumentMap::from_reader(text.as_bytes()).unwrap();
        assert_eq!(map.len(), 2);
        assert_eq!(map.total_terms(), 30);
        assert_eq!(map.get(2).unwrap().offset, 40);
    }
}
