//! The `Embedder` seam and its fastembed implementation.
//!
//! Models are ONNX files fetched from Hugging Face on first use and kept
//! under `<base_path>/models`.

use fastembed::{InitOptions, TextEmbedding};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Texts handed to the ONNX session per call.
const BATCH_SIZE: usize = 64;

/// Accepted names (lowercased), the fastembed model, and its output width.
const KNOWN_MODELS: &[(&[&str], fastembed::EmbeddingModel, usize)] = &[
    (&["all-minilm-l6-v2", "allminilml6v2"], fastembed::EmbeddingModel::AllMiniLML6V2, 384),
    (&["all-minilm-l6-v2-q", "allminilml6v2q"], fastembed::EmbeddingModel::AllMiniLML6V2Q, 384),
    (&["bge-small-en-v1.5", "bgesmallenv15"], fastembed::EmbeddingModel::BGESmallENV15, 384),
    (&["bge-base-en-v1.5", "bgebaseenv15"], fastembed::EmbeddingModel::BGEBaseENV15, 768),
    (
        &["paraphrase-multilingual-minilm-l12-v2"],
        fastembed::EmbeddingModel::ParaphraseMLMiniLML12V2,
        384,
    ),
];

/// Something that turns text into fixed-size vectors.
pub trait Embedder: Send + Sync {
    fn name(&self) -> &str;

    fn dimensions(&self) -> usize;

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }

    /// SHA256 of the model name, stored with cached vectors.
    fn model_id_hash(&self) -> [u8; 32] {
        use sha2::{Digest, Sha256};
        Sha256::digest(self.name().as_bytes()).into()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EmbeddingError {
    #[error("model initialization failed: {0}")]
    InitFailed(String),

    #[error("embedding failed: {0}")]
    EmbeddingFailed(String),

    #[error("unknown model '{0}', expected hash, all-MiniLM-L6-v2, all-MiniLM-L6-v2-q, bge-small-en-v1.5, bge-base-en-v1.5 or paraphrase-multilingual-MiniLM-L12-v2")]
    InvalidModel(String),
}

/// A fastembed sentence model.
///
/// fastembed needs `&mut` to embed, hence the lock.
pub struct EmbeddingModel {
    session: Mutex<TextEmbedding>,
    name: String,
    dimensions: usize,
}

impl EmbeddingModel {
    pub fn new(name: &str, base_path: &Path) -> Result<Self, EmbeddingError> {
        let (model, dimensions) = lookup_model(name)?;

        let models_dir = base_path.join("models");
        std::fs::create_dir_all(&models_dir).map_err(|e| {
            EmbeddingError::InitFailed(format!("cannot create {}: {e}", models_dir.display()))
        })?;

        log::info!("loading embedding model '{name}' from {}", models_dir.display());

        let options = InitOptions::new(model)
            .with_cache_dir(models_dir)
            .with_show_download_progress(true);
        let session =
            TextEmbedding::try_new(options).map_err(|e| EmbeddingError::InitFailed(e.to_string()))?;

        Ok(Self {
            session: Mutex::new(session),
            name: name.to_string(),
            dimensions,
        })
    }

    fn session(&self) -> Result<MutexGuard<'_, TextEmbedding>, EmbeddingError> {
        self.session
            .lock()
            .map_err(|_| EmbeddingError::EmbeddingFailed("model lock poisoned".to_string()))
    }
}

fn lookup_model(name: &str) -> Result<(fastembed::EmbeddingModel, usize), EmbeddingError> {
    let wanted = name.to_lowercase();
    KNOWN_MODELS
        .iter()
        .find(|(aliases, _, _)| aliases.contains(&wanted.as_str()))
        .map(|(_, model, dimensions)| (model.clone(), *dimensions))
        .ok_or_else(|| EmbeddingError::InvalidModel(name.to_string()))
}

impl Embedder for EmbeddingModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.embed_batch(&[text.to_string()])?
            .pop()
            .ok_or_else(|| EmbeddingError::EmbeddingFailed("model returned no vector".to_string()))
    }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(vec![]);
        }

        let vectors = self
            .session()?
            .embed(texts.to_vec(), Some(BATCH_SIZE))
            .map_err(|e| EmbeddingError::EmbeddingFailed(e.to_string()))?;

        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dimensions) {
            return Err(EmbeddingError::EmbeddingFailed(format!(
                "expected {} dimensions from {}, got {}",
                self.dimensions,
                self.name,
                bad.len()
            )));
        }
        Ok(vectors)
    }
}
