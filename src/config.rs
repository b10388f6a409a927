use std::fs;
use std::path::{Path, PathBuf};

use deepshear::ArtifactPaths;
use serde::Deserialize;
use thiserror::Error;

/// Configuration file picked up from the working directory when present.
pub const DEFAULT_CONFIG_FILE: &str = "deepshear.toml";

/// Settings loaded from `deepshear.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub model: ModelConfig,
    pub logging: LoggingConfig,
}

/// Where to find the model artifacts.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    pub model_path: PathBuf,
    pub columns_path: PathBuf,
}

impl Default for ModelConfig {
    fn default() -> Self {
        let paths = ArtifactPaths::default();
        Self {
            model_path: paths.model,
            columns_path: paths.columns,
        }
    }
}

/// Log filter used when `RUST_LOG` is not set.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "deepshear=info".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read configuration {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid configuration {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl Config {
    /// Load the configuration.
    ///
    /// An explicit `path` must exist. Without one, `deepshear.toml` in the
    /// working directory is used if present, and the defaults otherwise.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let fallback = Path::new(DEFAULT_CONFIG_FILE);
                if fallback.is_file() {
                    Self::from_file(fallback)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Resolve artifact locations, letting command-line paths win.
    pub fn artifact_paths(&self, model: Option<PathBuf>, columns: Option<PathBuf>) -> ArtifactPaths {
        ArtifactPaths {
            model: model.unwrap_or_else(|| self.model.model_path.clone()),
            columns: columns.unwrap_or_else(|| self.model.columns_path.clone()),
        }
    }
}
