//! Sub-configuration structs with their defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Remote store settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Store backend: "local" (directory, e.g. a mounted share) or "http"
    pub backend: String,

    /// Root directory for the `local` backend
    pub root: String,

    /// Base URL for the `http` backend
    pub base_url: String,

    /// Bearer token for the `http` backend (supports ${ENV_VAR} syntax)
    pub token: String,

    /// Directory inside the store whose files make up a batch
    pub remote_dir: String,

    /// Connection setup timeout in milliseconds
    pub connect_timeout_ms: u64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            backend: "local".to_string(),
            root: "~/.retint/remote".to_string(),
            base_url: "http://localhost:2121".to_string(),
            token: "${RETINT_REMOTE_TOKEN}".to_string(),
            remote_dir: "incoming".to_string(),
            connect_timeout_ms: 10_000,
        }
    }
}

/// Local storage and naming settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Where fetched originals are written
    pub download_dir: PathBuf,

    /// Where corrected images are written
    pub corrected_dir: PathBuf,

    /// Prefix prepended to a remote name to form its local file name
    pub download_prefix: String,

    /// Prefix prepended to an input's base name to form the corrected name
    pub corrected_prefix: String,

    /// Base URL the two directories are published under
    pub public_base_url: String,

    /// Route segment serving `download_dir`
    pub download_route: String,

    /// Route segment serving `corrected_dir`
    pub corrected_route: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            download_dir: PathBuf::from("~/.retint/normal-images"),
            corrected_dir: PathBuf::from("~/.retint/corrected-images"),
            download_prefix: "n_".to_string(),
            corrected_prefix: "c_".to_string(),
            public_base_url: "http://localhost:8000".to_string(),
            download_route: "normal-images".to_string(),
            corrected_route: "corrected-images".to_string(),
        }
    }
}

/// Fetcher pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Maximum concurrent transfers (admission gate capacity)
    pub parallel: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { parallel: 5 }
    }
}

/// Color correction settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CorrectionConfig {
    /// White-balance target offset, as a percentage of the brightest channel mean
    pub white_balance_scale_percent: f64,

    /// JPEG quality for corrected output (1-100)
    pub jpeg_quality: u8,

    /// Maximum files decoded, corrected and encoded at once
    pub parallel: usize,
}

impl Default for CorrectionConfig {
    fn default() -> Self {
        Self {
            white_balance_scale_percent: -30.0,
            jpeg_quality: 75,
            parallel: 5,
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,

    /// Decode timeout in milliseconds
    pub decode_timeout_ms: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 10000,
            decode_timeout_ms: 5000,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address
    pub bind: String,

    /// Value for Access-Control-Allow-Origin; empty disables CORS headers
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            cors_origin: "http://localhost:5174".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
