//! Layered configuration.
//!
//! Values are merged with `figment`, later layers overriding earlier ones:
//! built-in defaults, then a TOML file (`lab-matcher.toml` in the working
//! directory, or an explicit path), then `LAB_MATCHER_*` environment variables
//! with `__` separating nested keys (e.g. `LAB_MATCHER_MATCHING__MIN_SCORE`).
//!
//! ```toml
//! [matching]
//! min_score = 0.02
//! group_cap = 3
//!
//! [matching.weights]
//! vector = 0.5
//! lexical = 0.35
//!
//! [corpus]
//! source = "data/labs.ts"
//!
//! [server]
//! port = 9000
//! ```

use std::path::{Path, PathBuf};

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::corpus::loader::CorpusLoader;
use crate::matching::engine::MatchingConfig;

/// Config file read from the working directory when no path is given
pub const DEFAULT_CONFIG_FILE: &str = "lab-matcher.toml";

/// Prefix of configuration environment variables
pub const ENV_PREFIX: &str = "LAB_MATCHER_";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] figment::Error),
}

/// Where the corpus comes from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CorpusConfig {
    /// Primary source: JSON corpus, embedded-literal file, or block file
    pub source: Option<PathBuf>,
    /// Directory of per-department block files
    pub text_dir: Option<PathBuf>,
    /// Start marker of the embedded literal
    pub literal_marker: Option<String>,
    /// University assigned to block-file labs
    pub university: Option<String>,
    /// Prefix for synthetic ids of block-file labs
    pub id_prefix: Option<String>,
    /// Fall back to the built-in sample corpus
    pub sample_fallback: bool,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            source: None,
            text_dir: None,
            literal_marker: None,
            university: None,
            id_prefix: None,
            sample_fallback: true,
        }
    }
}

impl CorpusConfig {
    /// Build a loader for these settings
    #[must_use]
    pub fn loader(&self) -> CorpusLoader {
        let mut loader = CorpusLoader::new().with_sample_fallback(self.sample_fallback);
        if let Some(source) = &self.source {
            loader = loader.with_source(source);
        }
        if let Some(dir) = &self.text_dir {
            loader = loader.with_text_dir(dir);
        }
        if let Some(marker) = &self.literal_marker {
            loader = loader.with_literal_marker(marker);
        }
        if let Some(university) = &self.university {
            loader = loader.with_university(university);
        }
        if let Some(prefix) = &self.id_prefix {
            loader = loader.with_id_prefix(prefix);
        }
        loader
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub address: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: "127.0.0.1".to_string(),
            port: 8000,
        }
    }
}

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub matching: MatchingConfig,
    pub corpus: CorpusConfig,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Load defaults, the config file, and the environment.
    ///
    /// Without `path`, `lab-matcher.toml` is used if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if an explicit `path` does not exist,
    /// or `ConfigError::Invalid` if any layer has the wrong shape.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) if !path.exists() => return Err(ConfigError::NotFound(path.to_path_buf())),
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(DEFAULT_CONFIG_FILE),
        };
        tracing::debug!("Loading configuration from {}", file.display());

        Self::from_figment(
            Self::defaults()
                .merge(Toml::file(file))
                .merge(Env::prefixed(ENV_PREFIX).split("__")),
        )
    }

    /// Figment seeded with built-in defaults
    #[must_use]
    pub fn defaults() -> Figment {
        Figment::from(Serialized::defaults(Self::default()))
    }

    /// Extract a configuration from an arbitrary figment
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if the merged values do not deserialize.
    pub fn from_figment(figment: Figment) -> Result<Self, ConfigError> {
        Ok(figment.extract()?)
    }
}
