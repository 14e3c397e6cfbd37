//! Retint Core - bounded-concurrency image fetching and color correction.
//!
//! Retint lists a remote directory, downloads its files with a fixed cap on
//! concurrent transfers, and runs each download through a two-pass color
//! correction before writing the result locally.
//!
//! # Architecture
//!
//! ```text
//! list → bounded fetch → (per file) decode → white balance → equalize → encode → persist
//! ```
//!
//! Files run concurrently; the stages of one file run strictly in order. A
//! failing file never stops the batch.
//!
//! # Usage
//!
//! ```rust,ignore
//! use retint_core::{BatchMode, Config, Coordinator};
//!
//! #[tokio::main]
//! async fn main() -> retint_core::Result<()> {
//!     let config = Config::load()?;
//!     let coordinator = Coordinator::connect(config).await?;
//!
//!     let result = coordinator.run_batch(BatchMode::Correct).await?;
//!     println!("{} of {} corrected", result.succeeded(), result.total());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod correction;
pub mod error;
pub mod fetch;
pub mod naming;
pub mod pipeline;
pub mod store;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use correction::{correct, CorrectionParameters};
pub use error::{ConfigError, PipelineError, Result, RetintError, StoreError};
pub use naming::OutputKind;
pub use pipeline::{BatchMode, Coordinator};
pub use store::{RemoteFileStore, StoreFactory};
pub use types::{CorrectedFile, FileReport, FileState, PipelineResult, RemoteEntry};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
