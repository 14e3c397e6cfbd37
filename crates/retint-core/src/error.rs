//! Error types for the retint fetch-and-correct pipeline.
//!
//! Errors are split by blast radius. Setup errors (`ConfigError`,
//! `StoreError`, directory creation) abort a whole batch; `PipelineError`
//! values stay attached to the single file that produced them.

use std::path::PathBuf;
use thiserror::Error;

use crate::correction::Channel;

/// Top-level error type for retint operations.
#[derive(Error, Debug)]
pub enum RetintError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Remote store setup or listing errors
    #[error("Remote store error: {0}")]
    Store(#[from] StoreError),

    /// Per-file processing errors surfaced to a single-file caller
    #[error("Pipeline error: {0}")]
    Pipeline(#[from] PipelineError),

    /// A required local directory could not be created
    #[error("Cannot create directory {path:?}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Errors raised by a [`RemoteFileStore`](crate::store::RemoteFileStore).
///
/// `Connect` and `List` are fatal to a batch. `Open` is attributed to the
/// single entry being fetched.
#[derive(Error, Debug)]
pub enum StoreError {
    /// The store could not be reached at all
    #[error("Cannot connect to {endpoint}: {message}")]
    Connect { endpoint: String, message: String },

    /// Listing a remote directory failed
    #[error("Cannot list {path}: {message}")]
    List { path: String, message: String },

    /// Opening a remote file for reading failed
    #[error("Cannot open {path}: {message}")]
    Open { path: String, message: String },

    /// Path escapes the store root or is otherwise malformed
    #[error("Invalid remote path: {0}")]
    InvalidPath(String),

    /// `remote.backend` names a store this build does not know
    #[error("Unknown remote store backend: {0}")]
    UnknownBackend(String),
}

/// Errors from the color-correction passes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CorrectionError {
    /// A channel's mean is exactly zero, so its scale factor is undefined
    #[error("{channel} channel has zero mean intensity")]
    ZeroChannelMean { channel: Channel },
}

/// Per-file pipeline errors, organized by stage.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Remote open, local create or the streamed copy failed
    #[error("Fetch failed for {name}: {message}")]
    Fetch { name: String, message: String },

    /// Image decoding failed
    #[error("Decode error for {path:?}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Color correction rejected the decoded raster
    #[error("Correction failed for {path:?}: {source}")]
    Correct {
        path: PathBuf,
        #[source]
        source: CorrectionError,
    },

    /// JPEG encoding of the corrected raster failed
    #[error("Encode error for {path:?}: {message}")]
    Encode { path: PathBuf, message: String },

    /// Writing the encoded bytes to disk failed
    #[error("Cannot write {path:?}: {message}")]
    Persist { path: PathBuf, message: String },

    /// Operation timed out
    #[error("Timeout in {stage} stage for {path:?} after {timeout_ms}ms")]
    Timeout {
        path: PathBuf,
        stage: String,
        timeout_ms: u64,
    },

    /// File exceeds size limit
    #[error("File too large: {path:?} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path:?} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// A blocking worker task died before returning
    #[error("Worker failed in {stage} stage for {path:?}: {message}")]
    Worker {
        path: PathBuf,
        stage: String,
        message: String,
    },

    /// Input is not a JPEG
    #[error("Unsupported format for {path:?}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// File not found
    #[error("File not found: {0:?}")]
    FileNotFound(PathBuf),

    /// Input name is not a plain file name
    #[error("Invalid input name: {0:?}")]
    InvalidName(String),
}

/// Convenience type alias for retint results.
pub type Result<T> = std::result::Result<T, RetintError>;
