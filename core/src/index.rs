use serde::{Deserialize, Serialize};

pub type DocId = u32;

/// One (term, document) pair as it travels from the emitter to the builder.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct PostingRecord {
    pub term: String,
    pub doc_id: DocId,
    pub frequency: u32,
}

impl PostingRecord {
    /// Parse `"<term> <docId> <frequency>"`.
    pub fn parse(line: &str) -> Option<Self> {
        let mut parts = line.split_whitespace();
        let term = parts.next()?;
        let doc_id = parts.next()?.parse().ok()?;
        let frequency = parts.next()?.parse().ok()?;
        if parts.next().is_some() {
            return None;
        }
        Some(Self { term: term.to_string(), doc_id, frequency })
    }

    pub fn to_line(&self) -> String {
        format!("{} {} {}\n", self.term, self.doc_id, self.frequency)
    }
}

/// Location of a term's block inside the postings blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LexiconEntry {
    /// 0-based byte offset; persisted as offset + 1.
    pub offset: u64,
    pub length: u64,
    pub doc_count: u32,
}

impl LexiconEntry {
    pub fn to_line(&self, term: &str) -> String {
        format!("{} {} {} {} \n", term, self.offset + 1, self.length, self.doc_count)
    }

    pub fn parse(line: &str) -> Option<(String, Self)> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 4 {
            return None;
        }
        let offset: u64 = fields[1].parse().ok()?;
        let entry = LexiconEntry {
            offset: offset.checked_sub(1)?,
            length: fields[2].parse().ok()?,
            doc_count: fields[3].parse().ok()?,
        };
        Some((fields[0].to_string(), entry))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocMeta {
    pub url: String,
    /// Post-filter term count; the BM25 document length.
    pub term_count: u32,
    /// Text store holding the page body, relative to the index root.
    pub source_file: String,
    pub offset: u64,
    pub length: u64,
}

impl DocMeta {
    pub fn to_line(&self, doc_id: DocId) -> String {
        format!(
            "{} {} {} {} {} {} \n",
            doc_id,
            self.url,
            self.term_count,
            self.source_file,
            self.offset + 1,
            self.length
        )
    }

    pub fn parse(line: &str) -> Option<(DocId, Self)> {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != 6 {
            return None;
        }
        let offset: u64 = fields[4].parse().ok()?;
        let meta = DocMeta {
            url: fields[1].to_string(),
            term_count: fields[2].parse().ok()?,
            source_file: fields[3].to_string(),
            offset: offset.checked_sub(1)?,
            length: fields[5].parse().ok()?,
        };
        Some((fields[0].parse().ok()?, meta))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub doc_id: DocId,
    pub url: String,
    pub score: f64,
    pub snippet: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lexicon_offsets_are_one_based_on_disk() {
        let e = LexiconEntry { offset: 0, length: 12, doc_count: 3 };
        let line = e.to_line("nobel");
        assert_eq!(line, "nobel 1 12 3 \n");
        assert_eq!(LexiconEntry::parse(&line), Some(("nobel".to_string(), e)));
        assert_eq!(LexiconEntry::parse("nobel 0 12 3"), None);
        assert_eq!(LexiconEntry::parse("nobel 1 12"), None);
    }

    #[test]
    fn mapping_line_shape() {
        let m = DocMeta {
            url: "http://a.example/x".into(),
            term_count: 40,
            source_file: "texts/1.txt".into(),
            offset: 10,
            length: 99,
        };
        let line = m.to_line(7);
        assert_eq!(line, "7 http://a.example/x 40 texts/1.txt 11 99 \n");
        assert_eq!(DocMeta::parse(&line), Some((7, m)));
        assert_eq!(DocMeta::parse("7 http://a.example/x \n"), None);
    }

    #[test]
    fn posting_record_rejects_bad_fields() {
        assert_eq!(
            PostingRecord::parse("rust 4 2"),
            Some(PostingRecord { term: "rust".into(), doc_id: 4, frequency: 2 })
        );
        assert_eq!(PostingRecord::parse("rust four 2"), None);
        assert_eq!(PostingRecord::parse("rust 4"), None);
        assert_eq!(PostingRecord::parse("rust 4 2 9"), None);
    }
}
