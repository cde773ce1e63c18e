//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File looked up by [`Config::discover`]
pub const CONFIG_FILE: &str = ".pipelyne.yml";

/// Errors raised while loading a configuration file
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read config {}: {reason}", path.display())]
    Read {
        /// Config path.
        path: PathBuf,
        /// OS error message.
        reason: String,
    },

    /// The file is not a valid configuration
    #[error("Invalid config {}: {reason}", path.display())]
    Parse {
        /// Config path.
        path: PathBuf,
        /// Parser error message.
        reason: String,
    },
}

/// Application configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Working directory for pipeline runs, the current directory if unset
    pub base_dir: Option<PathBuf>,
    /// Log level
    pub log_level: String,
    /// CI provider used by `export` when none is given
    pub default_provider: String,
    /// Pipeline definition used when no file is given
    pub definition: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_dir: None,
            log_level: "info".to_string(),
            default_provider: "travis".to_string(),
            definition: PathBuf::from("pipelyne.yml"),
        }
    }
}

impl Config {
    /// Loads a YAML configuration file; missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not valid.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Loads `.pipelyne.yml` from `dir` if present, defaults otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be loaded.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let path = dir.join(CONFIG_FILE);
        if path.is_file() {
            tracing::debug!(path = %path.display(), "Using config file");
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }
}
