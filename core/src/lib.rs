pub mod builder;
pub mod codec;
pub mod combine;
pub mod config;
pub mod emitter;
pub mod engine;
pub mod error;
pub mod index;
pub mod lexicon;
pub mod persist;
pub mod postings;
pub mod scoring;
pub mod snippet;
pub mod sort;
pub mod tokenizer;
pub mod topk;

pub use combine::QueryMode;
pub use config::EngineConfig;
pub use engine::{SearchContext, SearchHits};
pub use error::{CodecError, IndexError, Result};
pub use index::{DocId, DocMeta, LexiconEntry, PostingRecord, SearchResult};
pub use persist::IndexPaths;
