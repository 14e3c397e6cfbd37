//! Bounded-concurrency download of a remote listing.

pub mod pool;

pub use pool::{FetchOptions, FetcherPool};
