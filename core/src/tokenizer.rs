use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeMap;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref TERM: Regex = Regex::new(r"^[a-z0-9]{3,}$").expect("valid regex");
}

/// A document is kept only if more than this share of its raw tokens are terms.
pub const MIN_TERM_RATIO: f64 = 0.1;

/// Lower-case a raw token the same way for indexing and querying.
pub fn normalize(token: &str) -> String {
    token.nfkc().collect::<String>().to_lowercase()
}

/// ASCII alphanumeric, at least three characters.
pub fn is_term(normalized: &str) -> bool {
    TERM.is_match(normalized)
}

/// Per-document term statistics produced before a docId is assigned.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TermCounts {
    pub counts: BTreeMap<String, u32>,
    pub raw_tokens: usize,
    pub accepted: u32,
}

impl TermCounts {
    /// True when the page carries enough real words to be indexed.
    pub fn is_indexable(&self) -> bool {
        self.raw_tokens > 0 && (self.accepted as f64) / (self.raw_tokens as f64) > MIN_TERM_RATIO
    }
}

/// Split on whitespace, normalize, drop non-terms and count what is left.
pub fn count_terms(text: &str) -> TermCounts {
    let mut out = TermCounts::default();
    for raw in text.split_whitespace() {
        out.raw_tokens += 1;
        let token = normalize(raw);
        if !is_term(&token) {
            continue;
        }
        *out.counts.entry(token).or_insert(0) += 1;
        out.accepted += 1;
    }
    out
}

/// Query words: normalized, empty pieces dropped, first occurrence wins on repeats.
pub fn query_words(keywords: &str) -> Vec<String> {
    let mut words: Vec<String> = Vec::new();
    for raw in keywords.split_whitespace() {
        let w = normalize(raw);
        if !w.is_empty() && !words.contains(&w) {
            words.push(w);
        }
    }
    words
}
