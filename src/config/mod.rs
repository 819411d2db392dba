//! Client configuration.
//!
//! Three layers, later wins: built-in defaults, an optional TOML file
//! (`--config` path or `~/.config/msgen/config.toml`), then CLI flag
//! overrides applied by the caller.

use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{env, fs};

use serde::Deserialize;

/// Effective client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Generation service root URL.
    pub base_url: String,
    pub poll_interval: Duration,
    pub overall_timeout: Duration,
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8787".to_string(),
            poll_interval: Duration::from_secs(3),
            overall_timeout: Duration::from_secs(420),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// File-level settings; every field optional so partial files merge.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FileConfig {
    pub base_url: Option<String>,
    pub poll_interval_seconds: Option<u64>,
    pub overall_timeout_seconds: Option<u64>,
    pub request_timeout_seconds: Option<u64>,
}

/// Errors loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

impl ClientConfig {
    /// Apply a file layer on top of this config.
    pub fn merge_file(mut self, file: FileConfig) -> Self {
        if let Some(url) = file.base_url {
            self.base_url = url;
        }
        if let Some(seconds) = file.poll_interval_seconds {
            self.poll_interval = Duration::from_secs(seconds);
        }
        if let Some(seconds) = file.overall_timeout_seconds {
            self.overall_timeout = Duration::from_secs(seconds);
        }
        if let Some(seconds) = file.request_timeout_seconds {
            self.request_timeout = Duration::from_secs(seconds);
        }
        self
    }

    /// Load defaults plus the given file. With no explicit path, the user
    /// config is used when it exists; a missing explicit path is an
    /// error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let config = Self::default();
        let path = match path {
            Some(explicit) => Some(explicit.to_path_buf()),
            None => default_config_path().filter(|p| p.exists()),
        };

        match path {
            Some(path) => {
                let text = fs::read_to_string(&path).map_err(|source| ConfigError::Io {
                    path: path.clone(),
                    source,
                })?;
                let file: FileConfig =
                    toml::from_str(&text).map_err(|source| ConfigError::Parse {
                        path: path.clone(),
                        source,
                    })?;
                Ok(config.merge_file(file))
            }
            None => Ok(config),
        }
    }
}

/// `~/.config/msgen/config.toml`
fn default_config_path() -> Option<PathBuf> {
    env::var_os("HOME").map(|home| {
        PathBuf::from(home)
            .join(".config")
            .join("msgen")
            .join("config.toml")
    })
}
