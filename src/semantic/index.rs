//! In-memory vector index with inner-product search.
//!
//! Vectors are L2-normalized on insert, so the inner product with a
//! normalized query is the cosine similarity.

/// In-memory vector index keyed by corpus position.
pub struct VectorIndex {
    /// (corpus position, normalized embedding)
    entries: Vec<(usize, Vec<f32>)>,
    dimensions: usize,
}

/// Search hit from the vector index.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Corpus position
    pub index: usize,
    /// Cosine similarity score (-1.0 to 1.0)
    pub score: f32,
}

/// Errors that can occur during index operations.
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("Dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Cannot store or search with zero-norm vector")]
    ZeroNormVector,
}

impl VectorIndex {
    pub fn new(dimensions: usize) -> Self {
        Self::with_capacity(dimensions, 0)
    }

    pub fn with_capacity(dimensions: usize, capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            dimensions,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Normalize and append an embedding.
    pub fn add(&mut self, index: usize, embedding: Vec<f32>) -> Result<(), IndexError> {
        let normalized = self.normalize(embedding)?;
        self.entries.push((index, normalized));
        Ok(())
    }

    /// Return the `top_k` entries most similar to `query`, best first.
    ///
    /// Never returns more hits than there are entries.
    pub fn search(
        &self,
        query: &[f32],
        top_k: usize,
        min_similarity: Option<f32>,
    ) -> Result<Vec<SearchResult>, IndexError> {
        if self.entries.is_empty() || top_k == 0 {
            return Ok(vec![]);
        }

        let query = self.normalize(query.to_vec())?;

        let mut results: Vec<SearchResult> = self
            .entries
            .iter()
            .map(|(index, embedding)| SearchResult {
                index: *index,
                score: dot(&query, embedding),
            })
            .filter(|hit| min_similarity.map_or(true, |min| hit.score >= min))
            .collect();

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        Ok(results)
    }

    fn normalize(&self, mut v: Vec<f32>) -> Result<Vec<f32>, IndexError> {
        if v.len() != self.dimensions {
            return Err(IndexError::DimensionMismatch {
                expected: self.dimensions,
                got: v.len(),
            });
        }

        let norm = l2_norm(&v);
        if norm < f32::EPSILON {
            return Err(IndexError::ZeroNormVector);
        }

        v.iter_mut().for_each(|x| *x /= norm);
        Ok(v)
    }
}

fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
