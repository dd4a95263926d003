//! Feature-hashing embedder.
//!
//! Maps lowercased alphanumeric tokens into a fixed number of buckets with
//! CRC32, using a second hash bit as the sign. Vectors are deterministic
//! across runs and need no model download, so similarity reduces to
//! weighted token overlap.

use super::embeddings::{Embedder, EmbeddingError};

pub const HASH_MODEL_NAME: &str = "hash";

pub const DEFAULT_HASH_DIMENSIONS: usize = 256;

pub struct HashEmbedder {
    dimensions: usize,
}

impl HashEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIMENSIONS)
    }
}

impl Embedder for HashEmbedder {
    fn name(&self) -> &str {
        HASH_MODEL_NAME
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut vector = vec![0.0f32; self.dimensions];

        for token in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let token = token.to_lowercase();
            let hash = crc32fast::hash(token.as_bytes());
            let bucket = (hash as usize) % self.dimensions;
            let sign = if hash & 0x8000_0000 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        Ok(vector)
    }
}
