//! Fetcher pool: one task per remote file, bounded by two semaphores.
//!
//! The dispatch loop acquires a fetch permit before spawning each task, so at
//! most `parallel` remote handles are open at any time. A task releases that
//! permit as soon as the download finishes, then waits for one of
//! `process_parallel` processing permits before running the per-file
//! continuation. Slow downstream work never holds a network slot, and the
//! number of rasters in memory stays bounded.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tokio::io::AsyncWriteExt;
use tokio::sync::Semaphore;

use crate::config::Config;
use crate::error::PipelineError;
use crate::naming;
use crate::store::{join_remote, RemoteFileStore};
use crate::types::{FetchOutcome, RemoteEntry};

/// Configuration for the fetcher pool.
#[derive(Debug, Clone)]
pub struct FetchOptions {
    /// Maximum concurrent transfers
    pub parallel: usize,
    /// Remote directory the entries were listed from
    pub remote_dir: String,
    /// Local directory downloads are written to
    pub download_dir: PathBuf,
    /// Prefix prepended to each remote name locally
    pub download_prefix: String,
    /// Maximum continuations running at once
    pub process_parallel: usize,
}

impl FetchOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            parallel: config.fetch.parallel,
            remote_dir: config.remote.remote_dir.clone(),
            download_dir: config.download_dir(),
            download_prefix: config.storage.download_prefix.clone(),
            process_parallel: config.correction.parallel,
        }
    }
}

/// Concurrent downloader over a shared store handle.
pub struct FetcherPool {
    store: Arc<dyn RemoteFileStore>,
    options: FetchOptions,
}

impl FetcherPool {
    pub fn new(store: Arc<dyn RemoteFileStore>, options: FetchOptions) -> Self {
        Self { store, options }
    }

    /// Local destination for a remote entry name.
    pub fn local_path(&self, name: &str) -> PathBuf {
        self.options
            .download_dir
            .join(naming::local_name(&self.options.download_prefix, name))
    }

    /// Download every non-directory entry.
    ///
    /// Returns one outcome per file entry, in listing order.
    pub async fn fetch_all(&self, entries: &[RemoteEntry]) -> Vec<FetchOutcome> {
        self.fetch_each(entries, |outcome| async move { outcome })
            .await
    }

    /// Download every non-directory entry and feed each outcome to
    /// `on_fetched` inside the same task, after its fetch permit is released
    /// and a processing permit is held.
    ///
    /// Waits for every task. Results come back in listing order, one per
    /// file entry; a task that panics yields a failed outcome for its entry.
    pub async fn fetch_each<F, Fut, T>(&self, entries: &[RemoteEntry], on_fetched: F) -> Vec<T>
    where
        F: Fn(FetchOutcome) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = T> + Send + 'static,
        T: From<FetchOutcome> + Send + 'static,
    {
        let semaphore = Arc::new(Semaphore::new(self.options.parallel.max(1)));
        let processing = Arc::new(Semaphore::new(self.options.process_parallel.max(1)));
        let on_fetched = Arc::new(on_fetched);
        let mut handles = Vec::with_capacity(entries.len());

        for entry in entries.iter().filter(|e| !e.is_dir) {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                tracing::warn!("Fetch semaphore closed unexpectedly, stopping dispatch");
                break;
            };

            let store = self.store.clone();
            let processing = processing.clone();
            let on_fetched = on_fetched.clone();
            let name = entry.name.clone();
            let remote_path = join_remote(&self.options.remote_dir, &name);
            let local_path = self.local_path(&name);
            let task_local_path = local_path.clone();

            let handle = tokio::spawn(async move {
                let outcome =
                    fetch_one(store.as_ref(), name, &remote_path, task_local_path).await;
                drop(permit); // Release the network slot before downstream work
                let _slot = processing.acquire_owned().await.ok();
                on_fetched(outcome).await
            });

            handles.push((entry.name.clone(), local_path, handle));
        }

        let mut results = Vec::with_capacity(handles.len());
        for (name, local_path, handle) in handles {
            match handle.await {
                Ok(result) => results.push(result),
                Err(e) => {
                    tracing::error!("Fetch task for {name} panicked: {e}");
                    results.push(T::from(FetchOutcome {
                        source_name: name,
                        local_path,
                        bytes: 0,
                        error: Some(format!("Task panicked: {e}")),
                    }));
                }
            }
        }
        results
    }
}

async fn fetch_one(
    store: &dyn RemoteFileStore,
    name: String,
    remote_path: &str,
    local_path: PathBuf,
) -> FetchOutcome {
    let start = Instant::now();
    let result = match naming::validate_input_name(&name) {
        Ok(()) => download(store, &name, remote_path, &local_path).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(bytes) => {
            tracing::debug!("Fetched {name} ({bytes} bytes) in {:?}", start.elapsed());
            FetchOutcome {
                source_name: name,
                local_path,
                bytes,
                error: None,
            }
        }
        Err(e) => {
            tracing::error!("{e}");
            FetchOutcome {
                source_name: name,
                local_path,
                bytes: 0,
                error: Some(e.to_string()),
            }
        }
    }
}

/// Stream one remote file into a newly created local file.
async fn download(
    store: &dyn RemoteFileStore,
    name: &str,
    remote_path: &str,
    local_path: &Path,
) -> Result<u64, PipelineError> {
    let fetch_err = |message: String| PipelineError::Fetch {
        name: name.to_string(),
        message,
    };

    let mut reader = store
        .open_read(remote_path)
        .await
        .map_err(|e| fetch_err(e.to_string()))?;

    let mut file = tokio::fs::File::create(local_path)
        .await
        .map_err(|e| fetch_err(format!("Cannot create {}: {e}", local_path.display())))?;

    let copied = match tokio::io::copy(&mut reader, &mut file).await {
        Ok(bytes) => file
            .flush()
            .await
            .map(|()| bytes)
            .map_err(|e| fetch_err(format!("Flush failed: {e}"))),
        Err(e) => Err(fetch_err(format!("Copy failed: {e}"))),
    };

    if copied.is_err() {
        drop(file);
        // A truncated download must not stay visible in the download dir.
        if let Err(e) = tokio::fs::remove_file(local_path).await {
            tracing::warn!("Cannot remove partial download {}: {e}", local_path.display());
        }
    }
    copied
}
