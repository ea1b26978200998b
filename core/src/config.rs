use serde::{Deserialize, Serialize};

/// Query-time settings shared by every search against one index.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EngineConfig {
    /// K of the top-K heap.
    pub result_limit: usize,
    /// Maximum distance in characters between the first and last match of a snippet window.
    pub snippet_span: usize,
    /// Snippets longer than this are cut and suffixed with "...".
    pub snippet_max_chars: usize,
    pub k1: f64,
    pub b: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            result_limit: 10,
            snippet_span: 300,
            snippet_max_chars: 497,
            k1: 1.2,
            b: 0.75,
        }
    }
}

impl EngineConfig {
    pub fn with_result_limit(mut self, k: usize) -> Self {
        self.result_limit = k;
        self
    }
}
