use std::path::{Path, PathBuf};

use homedir::my_home;
use serde::{Deserialize, Serialize};

use crate::{search::SearchMode, semantic, storage::BackendLocal};

const CONFIG_FILE: &str = "config.yaml";

const DEFAULT_TOP_K: usize = 3;
pub const MAX_TOP_K: usize = 100;
const DEFAULT_EXTENSION: &str = "msg";
/// Default semantic weight for hybrid ranking
const DEFAULT_HYBRID_WEIGHT: f32 = 0.6;
const DEFAULT_DAEMON_ADDR: &str = "127.0.0.1:8080";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not determine home directory, set MAILGREP_BASE_PATH")]
    NoHomeDir,

    #[error("config io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("config file is not valid utf8")]
    NotUtf8,

    #[error("config is malformed: {0}")]
    Malformed(#[from] serde_yml::Error),

    #[error("invalid config value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Configuration for embedding-based ranking
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SemanticSearchConfig {
    /// Model name for embeddings (e.g., "all-MiniLM-L6-v2", or "hash")
    #[serde(default = "default_semantic_model")]
    pub model: String,

    /// Drop semantic hits below this cosine similarity
    #[serde(default)]
    pub min_similarity: Option<f32>,

    /// Semantic share of the hybrid ranking [0.0, 1.0]
    #[serde(default = "default_hybrid_weight")]
    pub hybrid_weight: f32,

    /// Keep embeddings in vectors.bin between runs
    #[serde(default = "default_true")]
    pub cache: bool,
}

impl Default for SemanticSearchConfig {
    fn default() -> Self {
        Self {
            model: default_semantic_model(),
            min_similarity: None,
            hybrid_weight: DEFAULT_HYBRID_WEIGHT,
            cache: true,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct DaemonConfig {
    #[serde(default = "default_daemon_addr")]
    pub addr: String,
}

impl Default for DaemonConfig {
    fn default() -> Self {
        Self {
            addr: default_daemon_addr(),
        }
    }
}

fn default_semantic_model() -> String {
    semantic::DEFAULT_MODEL.to_string()
}

fn default_hybrid_weight() -> f32 {
    DEFAULT_HYBRID_WEIGHT
}

fn default_true() -> bool {
    true
}

fn default_daemon_addr() -> String {
    DEFAULT_DAEMON_ADDR.to_string()
}

fn default_emails_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

fn default_top_k() -> usize {
    DEFAULT_TOP_K
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Config {
    /// Root directory holding the message folders
    #[serde(default = "default_emails_dir")]
    pub emails_dir: PathBuf,
    /// Message file extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default)]
    pub default_mode: SearchMode,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default)]
    pub semantic_search: SemanticSearchConfig,
    #[serde(default)]
    pub daemon: DaemonConfig,

    #[serde(skip_serializing, skip_deserializing)]
    base_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            emails_dir: default_emails_dir(),
            extension: default_extension(),
            default_mode: SearchMode::default(),
            top_k: DEFAULT_TOP_K,
            semantic_search: SemanticSearchConfig::default(),
            daemon: DaemonConfig::default(),
            base_path: PathBuf::new(),
        }
    }
}

impl Config {
    /// `MAILGREP_BASE_PATH`, or `~/.local/share/mailgrep`.
    pub fn base_path_from_env() -> Result<PathBuf, ConfigError> {
        if let Ok(path) = std::env::var("MAILGREP_BASE_PATH") {
            return Ok(PathBuf::from(path));
        }

        let home = my_home()
            .ok()
            .flatten()
            .ok_or(ConfigError::NoHomeDir)?;
        Ok(home.join(".local/share/mailgrep"))
    }

    pub fn load() -> Result<Self, ConfigError> {
        let mut config = Self::load_with(&Self::base_path_from_env()?)?;
        if let Ok(dir) = std::env::var("MAILGREP_EMAILS_DIR") {
            config.emails_dir = PathBuf::from(dir);
        }
        Ok(config)
    }

    pub fn load_with(base_path: &Path) -> Result<Self, ConfigError> {
        let store = BackendLocal::new(base_path)?;

        // create new if does not exist
        if !store.exists(CONFIG_FILE) {
            store.write(CONFIG_FILE, serde_yml::to_string(&Self::default())?.as_bytes())?;
        }

        let config_str = String::from_utf8(store.read(CONFIG_FILE)?).map_err(|_| ConfigError::NotUtf8)?;
        let mut config: Self = serde_yml::from_str(&config_str)?;

        config.base_path = base_path.to_path_buf();
        config.validate()?;

        // resave in case config version needs an upgrade
        if config_str != serde_yml::to_string(&config)? {
            config.save()?;
        }

        Ok(config)
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let store = BackendLocal::new(&self.base_path)?;
        store.write(CONFIG_FILE, serde_yml::to_string(&self)?.as_bytes())?;
        Ok(())
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.top_k == 0 || self.top_k > MAX_TOP_K {
            return Err(ConfigError::Invalid {
                field: "top_k",
                message: format!("must be between 1 and {MAX_TOP_K}, got {}", self.top_k),
            });
        }

        if self.extension.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "extension",
                message: "must not be empty".to_string(),
            });
        }

        let sem = &self.semantic_search;
        if !(0.0..=1.0).contains(&sem.hybrid_weight) {
            return Err(ConfigError::Invalid {
                field: "semantic_search.hybrid_weight",
                message: format!("must be between 0.0 and 1.0, got {}", sem.hybrid_weight),
            });
        }

        if let Some(min) = sem.min_similarity {
            if !(-1.0..=1.0).contains(&min) {
                return Err(ConfigError::Invalid {
                    field: "semantic_search.min_similarity",
                    message: format!("must be between -1.0 and 1.0, got {min}"),
                });
            }
        }

        if sem.model.trim().is_empty() {
            return Err(ConfigError::Invalid {
                field: "semantic_search.model",
                message: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
