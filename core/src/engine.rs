use crate::combine::{combine, QueryMode};
use crate::config::EngineConfig;
use crate::index::{DocId, DocMeta, SearchResult};
use crate::lexicon::{DocumentMap, Lexicon};
use crate::error::IndexError;
use crate::persist::{load_meta, read_range, IndexPaths, FORMAT_VERSION};
use crate::postings::PostingList;
use crate::scoring::Bm25;
use crate::snippet::make_snippet;
use crate::tokenizer::query_words;
use crate::topk::TopK;
use crate::Result;

/// Ranked results plus the number of candidates that were scored.
#[derive(Debug, Clone, Default)]
pub struct SearchHits {
    pub total_hits: usize,
    pub results: Vec<SearchResult>,
}

/// Read-only state shared by every query against one index.
///
/// Nothing here is mutated after `open`, so one instance behind an `Arc`
/// serves any number of concurrent searches; each search decodes its own
/// posting lists.
pub struct SearchContext {
    paths: IndexPaths,
    lexicon: Lexicon,
    docs: DocumentMap,
    bm25: Bm25,
    config: EngineConfig,
}

impl SearchContext {
    /// Load a finished index. An index without `meta.json` is still being
    /// built (or its build failed) and is refused.
    pub fn open(paths: IndexPaths, config: EngineConfig) -> Result<Self> {
        let meta = load_meta(&paths)?;
        if meta.version != FORMAT_VERSION {
            return Err(IndexError::IncompatibleIndex { found: meta.version, expected: FORMAT_VERSION });
        }
        let lexicon = Lexicon::load(&paths.lexicon())?;
        let docs = DocumentMap::load(&paths.doc_mapping())?;
        Ok(Self::from_parts(paths, lexicon, docs, config))
    }

    pub fn from_parts(paths: IndexPaths, lexicon: Lexicon, docs: DocumentMap, config: EngineConfig) -> Self {
        let bm25 = Bm25::new(docs.len() as u32, docs.total_terms(), &config);
        Self { paths, lexicon, docs, bm25, config }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn num_docs(&self) -> u32 {
        self.bm25.num_docs
    }

    pub fn num_terms(&self) -> usize {
        self.lexicon.len()
    }

    pub fn document(&self, doc_id: DocId) -> Option<&DocMeta> {
        self.docs.get(doc_id)
    }

    pub fn search(&self, keywords: &str, mode: QueryMode) -> Vec<SearchResult> {
        self.search_top(keywords, mode, self.config.result_limit).results
    }

    pub fn search_top(&self, keywords: &str, mode: QueryMode, k: usize) -> SearchHits {
        let words = query_words(keywords);
        if words.is_empty() {
            return SearchHits::default();
        }
        let mut lists: Vec<PostingList> = words.iter().map(|w| self.posting_list(w)).collect();
        let ft: Vec<u32> = lists.iter().map(|l| l.len() as u32).collect();

        let mut top = TopK::new(k);
        let mut total_hits = 0;
        combine(mode, &mut lists, |doc_id, fdt| {
            let Some(meta) = self.docs.get(doc_id) else {
                tracing::debug!(doc_id, "posting references unknown document");
                return;
            };
            let score = self.bm25.score(&ft, fdt, meta.term_count);
            // ft > N (mapping lines lost) makes the idf ratio negative.
            if !score.is_finite() {
                tracing::warn!(doc_id, ?ft, num_docs = self.bm25.num_docs, "dropping non-finite score");
                return;
            }
            total_hits += 1;
            top.offer(doc_id, score);
        });

        let results = top
            .into_sorted_vec()
            .into_iter()
            .filter_map(|hit| {
                let meta = self.docs.get(hit.doc_id)?;
                Some(SearchResult {
                    doc_id: hit.doc_id,
                    url: meta.url.clone(),
                    score: hit.score,
                    snippet: self.snippet(hit.doc_id, meta, &words),
                })
            })
            .collect();
        SearchHits { total_hits, results }
    }

    /// Decoded list for `term`; empty when the term is unknown or its block is unusable.
    pub fn posting_list(&self, term: &str) -> PostingList {
        let Some(entry) = self.lexicon.get(term) else {
            return PostingList::empty();
        };
        let block = match read_range(&self.paths.postings(), entry.offset, entry.length) {
            Ok(b) => b,
            Err(e) => {
                tracing::warn!(term, error = %e, "failed to read posting block");
                return PostingList::empty();
            }
        };
        match PostingList::decode(&block) {
            Ok(list) => {
                if list.len() != entry.doc_count as usize {
                    tracing::warn!(term, decoded = list.len(), expected = entry.doc_count, "document count mismatch");
                }
                list
            }
            Err(e) => {
                tracing::warn!(term, error = %e, "failed to decode posting block");
                PostingList::empty()
            }
        }
    }

    fn snippet(&self, doc_id: DocId, meta: &DocMeta, words: &[String]) -> Option<String> {
        let path = self.paths.root.join(&meta.source_file);
        match read_range(&path, meta.offset, meta.length) {
            Ok(bytes) => {
                let content = String::from_utf8_lossy(&bytes);
                Some(make_snippet(&content, words, self.config.snippet_span, self.config.snippet_max_chars))
            }
            Err(e) => {
                tracing::warn!(doc_id, error = %e, "failed to read document text");
                None
            }
        }
    }
}
