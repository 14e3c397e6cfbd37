//! Configuration management for retint.
//!
//! Configuration is loaded from the platform config directory (or an explicit
//! path) with sensible defaults. Every section implements `Default`, so a
//! partial TOML file only needs the keys it overrides.

mod types;
mod validate;

pub use types::*;

use crate::correction::CorrectionParameters;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for retint.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Remote store location and credentials
    pub remote: RemoteConfig,

    /// Local directories, file prefixes and public URLs
    pub storage: StorageConfig,

    /// Fetcher pool settings
    pub fetch: FetchConfig,

    /// Color correction settings
    pub correction: CorrectionConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// HTTP server settings
    pub server: ServerConfig,

    /// Logging settings
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/dev.retint.retint/config.toml
    /// - Linux: ~/.config/retint/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\retint\config\config.toml
    ///
    /// Falls back to ~/.retint/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("dev", "retint", "retint")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".retint").join("config.toml")
            })
    }

    /// Directory fetched files are written to (with ~ expansion).
    pub fn download_dir(&self) -> PathBuf {
        expand_path(&self.storage.download_dir)
    }

    /// Directory corrected files are written to (with ~ expansion).
    pub fn corrected_dir(&self) -> PathBuf {
        expand_path(&self.storage.corrected_dir)
    }

    /// Root directory of the `local` remote backend (with ~ expansion).
    pub fn remote_root(&self) -> PathBuf {
        expand_path(Path::new(&self.remote.root))
    }

    /// Correction parameters for one pipeline invocation.
    pub fn correction_params(&self) -> CorrectionParameters {
        CorrectionParameters {
            white_balance_scale_percent: self.correction.white_balance_scale_percent,
        }
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::ValidationError(e.to_string()))
    }
}

fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();
    let expanded = shellexpand::tilde(&path_str);
    PathBuf::from(expanded.into_owned())
}
