//! TOML configuration.
//!
//! Read from `config.toml` in the platform config directory unless a path is
//! given on the command line. A missing file means defaults.
//!
//! ```toml
//! [search]
//! default_sort = "alpha-asc"
//! default_limit = 50
//!
//! [extensions]
//! usage_insights = true
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::search::sorting::SORT_ALPHA_ASC;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub extensions: ExtensionsConfig,
    /// Overrides the default database location.
    pub db_path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Sort option used when a search names none.
    pub default_sort: String,
    pub default_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_sort: SORT_ALPHA_ASC.to_string(),
            default_limit: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExtensionsConfig {
    pub usage_insights: bool,
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            usage_insights: true,
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults if the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load from the given path or the platform default.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::load(p),
            None => Self::load(&default_config_path()),
        }
    }

    /// Database path: explicit override, then config, then platform default.
    pub fn resolve_db_path(&self, db_override: Option<PathBuf>) -> PathBuf {
        db_override
            .or_else(|| self.db_path.clone())
            .unwrap_or_else(crate::default_db_path)
    }
}

pub fn default_config_path() -> PathBuf {
    crate::project_dirs()
        .map(|d| d.config_dir().join("config.toml"))
        .unwrap_or_else(|| PathBuf::from("config.toml"))
}
