//! Passage corpus, embedding index and its on-disk cache.

pub mod corpus;
pub mod index;
pub mod persist;

pub use corpus::CorpusStore;
pub use index::{cosine_similarity, EmbeddingIndex, ScoredPassage};
pub use persist::{corpus_fingerprint, IndexCache, PersistedIndex};
