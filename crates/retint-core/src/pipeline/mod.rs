//! Fetch-and-correct pipeline components.
//!
//! This module contains the per-file stages and the batch coordinator:
//! - **validate**: Pre-decode checks (existence, size, JPEG signature)
//! - **decode**: JPEG decode to a 16-bit raster, with timeout
//! - **encode**: JPEG encode of corrected output
//! - **processor**: Walks one fetched file to a terminal state
//! - **coordinator**: Lists, fetches with bounded concurrency, corrects, joins

pub mod coordinator;
pub mod decode;
pub mod encode;
pub mod processor;
pub mod validate;

// Re-exports for convenient access
pub use coordinator::{BatchMode, Coordinator};
pub use decode::{DecodedImage, ImageDecoder};
pub use encode::JpegWriter;
pub use processor::ImageProcessor;
pub use validate::Validator;
