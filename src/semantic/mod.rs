//! Semantic search infrastructure for message embeddings.
//!
//! # Architecture
//!
//! - `embeddings`: the `Embedder` trait and the fastembed-backed model
//! - `hash`: download-free feature-hashing embedder
//! - `index`: in-memory vector index with inner-product search
//! - `storage`: binary vectors.bin cache keyed by message path
//! - `preprocess`: text preparation and content hashing
//! - `service`: builds the index for a corpus and answers queries

pub mod embeddings;
pub mod hash;
mod index;
mod preprocess;
mod service;
mod storage;

pub use embeddings::{Embedder, EmbeddingError};
pub use service::{create_embedder, vectors_path, SemanticSearchError, SemanticSearcher};

/// Default embedding model name, the sentence-transformers MiniLM.
pub const DEFAULT_MODEL: &str = "all-MiniLM-L6-v2";
