//! Semantic search over a loaded corpus.
//!
//! Embeds every message once (reusing cached vectors when the content is
//! unchanged), keeps the normalized vectors in a [`VectorIndex`] and
//! answers queries by inner-product search.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::SemanticSearchConfig;
use crate::mail::Corpus;
use crate::semantic::embeddings::{Embedder, EmbeddingError, EmbeddingModel};
use crate::semantic::hash::{HashEmbedder, HASH_MODEL_NAME};
use crate::semantic::index::{IndexError, SearchResult, VectorIndex};
use crate::semantic::preprocess::{content_hash, preprocess_content};
use crate::semantic::storage::{VectorCache, VectorCacheError, VectorStorage};

const VECTORS_FILE: &str = "vectors.bin";

/// Errors that can occur during semantic search operations.
#[derive(Debug, thiserror::Error)]
pub enum SemanticSearchError {
    #[error("Embedding error: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Index error: {0}")]
    Index(#[from] IndexError),

    #[error("Storage error: {0}")]
    Storage(#[from] VectorCacheError),
}

/// Summary of an index build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub indexed: usize,
    pub embedded: usize,
    pub reused: usize,
    pub skipped: usize,
}

/// Pick the embedder named in the config.
pub fn create_embedder(
    config: &SemanticSearchConfig,
    base_path: &Path,
) -> Result<Arc<dyn Embedder>, EmbeddingError> {
    if config.model.eq_ignore_ascii_case(HASH_MODEL_NAME) {
        return Ok(Arc::new(HashEmbedder::default()));
    }

    let model = EmbeddingModel::new(&config.model, base_path)?;
    Ok(Arc::new(model))
}

pub struct SemanticSearcher {
    embedder: Arc<dyn Embedder>,
    index: VectorIndex,
    min_similarity: Option<f32>,
    report: BuildReport,
}

impl SemanticSearcher {
    /// Embed the corpus.
    ///
    /// With `cache_dir` set, vectors are read from and written back to
    /// `<cache_dir>/vectors.bin`.
    pub fn build(
        corpus: &Corpus,
        embedder: Arc<dyn Embedder>,
        cache_dir: Option<&Path>,
        min_similarity: Option<f32>,
    ) -> Result<Self, SemanticSearchError> {
        let storage = cache_dir.map(|dir| VectorStorage::new(dir.join(VECTORS_FILE)));
        let model_id = embedder.model_id_hash();
        let dimensions = embedder.dimensions();

        let mut cache = match &storage {
            Some(storage) if storage.exists() => load_cache(storage, &model_id, dimensions)?,
            _ => VectorCache::new(),
        };

        let mut report = BuildReport::default();
        let mut index = VectorIndex::with_capacity(dimensions, corpus.len());

        // (corpus position, cache key, hash, text) still needing an embedding
        let mut pending: Vec<(usize, String, u64, String)> = Vec::new();
        let mut keys = Vec::with_capacity(corpus.len());

        for (position, email) in corpus.emails().iter().enumerate() {
            let key = email.path.to_string_lossy().into_owned();
            keys.push(key.clone());

            let Some(text) = preprocess_content(&email.content) else {
                report.skipped += 1;
                continue;
            };
            let hash = content_hash(&email.content);

            match cache.lookup(&key, hash) {
                Some(embedding) => {
                    add_or_skip(&mut index, position, embedding.to_vec(), &mut report);
                    report.reused += 1;
                }
                None => pending.push((position, key, hash, text)),
            }
        }

        if !pending.is_empty() {
            log::info!("embedding {} emails with '{}'", pending.len(), embedder.name());
            let texts: Vec<String> = pending.iter().map(|(_, _, _, text)| text.clone()).collect();
            let embeddings = embedder.embed_batch(&texts)?;

            for ((position, key, hash, _), embedding) in pending.into_iter().zip(embeddings) {
                cache.insert(key, hash, embedding.clone());
                add_or_skip(&mut index, position, embedding, &mut report);
                report.embedded += 1;
            }
        }

        report.indexed = index.len();

        if let Some(storage) = &storage {
            cache.retain_paths(&keys);
            storage.save(&cache, &model_id, dimensions)?;
            log::debug!("saved {} vectors to {}", cache.len(), storage.path().display());
        }

        Ok(Self {
            embedder,
            index,
            min_similarity,
            report,
        })
    }

    pub fn report(&self) -> &BuildReport {
        &self.report
    }

    pub fn model_name(&self) -> &str {
        self.embedder.name()
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Most similar messages for `query`, best first.
    pub fn search(&self, query: &str, top_k: usize) -> Result<Vec<SearchResult>, SemanticSearchError> {
        let query = query.trim();
        if query.is_empty() || self.index.is_empty() {
            return Ok(vec![]);
        }

        let embedding = self.embedder.embed(query)?;
        match self.index.search(&embedding, top_k, self.min_similarity) {
            Ok(results) => Ok(results),
            // a query sharing nothing with the vocabulary of a hashing embedder
            Err(IndexError::ZeroNormVector) => Ok(vec![]),
            Err(e) => Err(e.into()),
        }
    }
}

fn add_or_skip(index: &mut VectorIndex, position: usize, embedding: Vec<f32>, report: &mut BuildReport) {
    if let Err(e) = index.add(position, embedding) {
        log::warn!("not indexing email #{position}: {e}");
        report.skipped += 1;
    }
}

fn load_cache(
    storage: &VectorStorage,
    model_id: &[u8; 32],
    dimensions: usize,
) -> Result<VectorCache, SemanticSearchError> {
    match storage.load(model_id, dimensions) {
        Ok(cache) => {
            log::info!("loaded {} cached vectors", cache.len());
            Ok(cache)
        }
        Err(VectorCacheError::ModelMismatch) | Err(VectorCacheError::DimensionMismatch { .. }) => {
            log::warn!("model changed, rebuilding vector cache");
            Ok(VectorCache::new())
        }
        Err(VectorCacheError::VersionMismatch(file_ver, _)) => {
            log::warn!("vector cache version {} unsupported, rebuilding", file_ver);
            Ok(VectorCache::new())
        }
        Err(VectorCacheError::Io(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            log::warn!("vector cache {} is truncated, rebuilding", storage.path().display());
            Ok(VectorCache::new())
        }
        Err(VectorCacheError::InvalidFormat(reason)) => {
            log::warn!("vector cache is unreadable ({reason}), rebuilding");
            Ok(VectorCache::new())
        }
        Err(e) => {
            log::error!("failed to load vectors: {}", e);
            Err(e.into())
        }
    }
}

/// Where the vector cache lives for a base path.
pub fn vectors_path(base_path: &Path) -> PathBuf {
    base_path.join(VECTORS_FILE)
}
