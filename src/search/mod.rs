//! Ranking messages against a free-text query.
//!
//! Three modes share one entry point:
//! - `keyword`: token occurrence counts (see [`keyword`])
//! - `semantic`: cosine similarity of embeddings (see [`crate::semantic`])
//! - `hybrid`: weighted RRF of the two (see [`hybrid`])

pub mod hybrid;
pub mod keyword;

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

use crate::answer::Answer;
use crate::config::SemanticSearchConfig;
use crate::mail::{Corpus, Email};
use crate::semantic::{self, Embedder, EmbeddingError, SemanticSearchError, SemanticSearcher};

/// Candidates taken from each ranking before hybrid fusion, per result.
const HYBRID_CANDIDATE_FACTOR: usize = 3;

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("query is empty")]
    EmptyQuery,

    #[error("semantic search failed: {0}")]
    Semantic(#[from] SemanticSearchError),

    #[error("could not load embedding model: {0}")]
    Embedding(#[from] EmbeddingError),
}

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum SearchMode {
    #[default]
    Keyword,
    Semantic,
    Hybrid,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SearchMode::Keyword => "keyword",
            SearchMode::Semantic => "semantic",
            SearchMode::Hybrid => "hybrid",
        };
        f.write_str(name)
    }
}

/// How well a message matched, in the unit of the mode that ranked it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Score {
    Hits(u64),
    Similarity(f32),
    Fused(f32),
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Score::Hits(hits) => write!(f, "{hits}"),
            Score::Similarity(sim) => write!(f, "{sim:.3}"),
            Score::Fused(score) => write!(f, "{score:.4}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScoredEmail {
    /// Corpus position
    pub index: usize,
    pub score: Score,
}

/// A ranked message, flattened for printing and JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    pub source: String,
    pub folder: String,
    pub filename: String,
    pub subject: String,
    pub from: String,
    pub to: String,
    pub date: String,
    pub score: Score,
}

impl SearchHit {
    pub fn new(email: &Email, score: Score) -> Self {
        Self {
            source: email.source(),
            folder: email.folder.clone(),
            filename: email.filename.clone(),
            subject: email.subject.clone(),
            from: email.from.clone(),
            to: email.to.clone(),
            date: email.date.clone(),
            score,
        }
    }
}

/// Owns the corpus and a lazily built semantic index.
pub struct SearchEngine {
    corpus: Corpus,
    semantic_config: SemanticSearchConfig,
    base_path: PathBuf,
    embedder: Option<Arc<dyn Embedder>>,
    semantic: OnceCell<SemanticSearcher>,
}

impl SearchEngine {
    /// `base_path` holds downloaded models and, when caching is on, vectors.bin.
    pub fn new(corpus: Corpus, semantic_config: SemanticSearchConfig, base_path: PathBuf) -> Self {
        Self {
            corpus,
            semantic_config,
            base_path,
            embedder: None,
            semantic: OnceCell::new(),
        }
    }

    /// Use `embedder` instead of the one named in the config.
    pub fn with_embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    fn cache_dir(&self) -> Option<&std::path::Path> {
        self.semantic_config.cache.then_some(self.base_path.as_path())
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    pub fn email(&self, hit: &ScoredEmail) -> Option<&Email> {
        self.corpus.get(hit.index)
    }

    pub fn hits(&self, scored: &[ScoredEmail]) -> Vec<SearchHit> {
        scored
            .iter()
            .filter_map(|hit| self.email(hit).map(|email| SearchHit::new(email, hit.score)))
            .collect()
    }

    /// Build the semantic index now instead of on the first semantic query.
    pub fn semantic_searcher(&self) -> Result<&SemanticSearcher, SearchError> {
        self.semantic.get_or_try_init(|| {
            let embedder = match &self.embedder {
                Some(embedder) => embedder.clone(),
                None => semantic::create_embedder(&self.semantic_config, &self.base_path)?,
            };

            let searcher = SemanticSearcher::build(
                &self.corpus,
                embedder,
                self.cache_dir(),
                self.semantic_config.min_similarity,
            )?;
            log::info!(
                "semantic index ready: {} emails with '{}'",
                searcher.len(),
                searcher.model_name()
            );
            Ok::<_, SearchError>(searcher)
        })
    }

    pub fn search(
        &self,
        query: &str,
        mode: SearchMode,
        top_k: usize,
    ) -> Result<Vec<ScoredEmail>, SearchError> {
        if query.trim().is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        log::debug!("search mode={mode} top_k={top_k} query={query:?}");

        let results = match mode {
            SearchMode::Keyword => self.keyword(query, top_k),
            SearchMode::Semantic => self.semantic(query, top_k)?,
            SearchMode::Hybrid => {
                let candidates = top_k.saturating_mul(HYBRID_CANDIDATE_FACTOR);
                let semantic: Vec<usize> = self
                    .semantic(query, candidates)?
                    .into_iter()
                    .map(|hit| hit.index)
                    .collect();
                let keyword: Vec<usize> = self
                    .keyword(query, candidates)
                    .into_iter()
                    .map(|hit| hit.index)
                    .collect();

                hybrid::rrf_fusion(&semantic, &keyword, self.semantic_config.hybrid_weight)
                    .into_iter()
                    .take(top_k)
                    .map(|hit| ScoredEmail {
                        index: hit.index,
                        score: Score::Fused(hit.score),
                    })
                    .collect()
            }
        };

        Ok(results)
    }

    /// Search, then run the answer templates over the ranked messages.
    pub fn ask(&self, query: &str, mode: SearchMode, top_k: usize) -> Result<Answer, SearchError> {
        let scored = self.search(query, mode, top_k)?;
        let matched = scored
            .iter()
            .filter_map(|hit| self.email(hit).map(|email| (email, hit.score)));
        Ok(Answer::build(query, matched))
    }

    fn keyword(&self, query: &str, top_k: usize) -> Vec<ScoredEmail> {
        keyword::score_keyword(query, self.corpus.emails(), top_k)
            .into_iter()
            .map(|hit| ScoredEmail {
                index: hit.index,
                score: Score::Hits(hit.hits),
            })
            .collect()
    }

    fn semantic(&self, query: &str, top_k: usize) -> Result<Vec<ScoredEmail>, SearchError> {
        let results = self.semantic_searcher()?.search(query, top_k)?;
        Ok(results
            .into_iter()
            .map(|hit| ScoredEmail {
                index: hit.index,
                score: Score::Similarity(hit.score),
            })
            .collect())
    }
}
