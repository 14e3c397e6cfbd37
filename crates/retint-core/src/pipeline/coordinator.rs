//! Batch coordinator: list, fetch under the concurrency cap, correct each
//! file in its own task, join, then freeze the result.

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::{Result, RetintError, StoreError};
use crate::fetch::{FetchOptions, FetcherPool};
use crate::naming::{self, OutputKind};
use crate::store::{RemoteFileStore, StoreFactory};
use crate::types::{CorrectedFile, FileReport, PipelineResult};

use super::processor::ImageProcessor;

/// What a batch does with each downloaded file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchMode {
    /// Decode, correct, encode and persist every fetched file
    Correct,
    /// Stop at `Fetched`
    FetchOnly,
}

/// Runs batches against a connected store and corrects local files.
pub struct Coordinator {
    config: Config,
    store: Option<Arc<dyn RemoteFileStore>>,
    processor: Arc<ImageProcessor>,
}

impl Coordinator {
    pub fn new(config: Config, store: Arc<dyn RemoteFileStore>) -> Self {
        let processor = Arc::new(ImageProcessor::new(&config));
        Self {
            config,
            store: Some(store),
            processor,
        }
    }

    /// A coordinator without a store. It can only correct local files.
    pub fn offline(config: Config) -> Self {
        let processor = Arc::new(ImageProcessor::new(&config));
        Self {
            config,
            store: None,
            processor,
        }
    }

    /// Connect the configured store and build a coordinator over it.
    pub async fn connect(config: Config) -> Result<Self> {
        let store = StoreFactory::connect(&config).await?;
        Ok(Self::new(config, store))
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run one batch over the configured remote directory.
    ///
    /// Local directory creation and the listing are fatal; everything after
    /// that is recorded per file and the batch still succeeds.
    pub async fn run_batch(&self, mode: BatchMode) -> Result<PipelineResult> {
        self.run_batch_with(mode, |_| {}).await
    }

    /// Like [`run_batch`](Self::run_batch), calling `on_report` from each
    /// task as soon as its file reaches a terminal state.
    pub async fn run_batch_with<F>(&self, mode: BatchMode, on_report: F) -> Result<PipelineResult>
    where
        F: Fn(&FileReport) + Send + Sync + 'static,
    {
        let start = Instant::now();
        let store = self.store.as_ref().ok_or_else(|| StoreError::Connect {
            endpoint: self.config.remote.backend.clone(),
            message: "no remote store attached".to_string(),
        })?;

        ensure_dir(&self.config.download_dir()).await?;
        if mode == BatchMode::Correct {
            ensure_dir(&self.config.corrected_dir()).await?;
        }

        let remote_dir = &self.config.remote.remote_dir;
        let entries = store.list_entries(remote_dir).await?;
        tracing::info!(
            "Listed {} entries in {}:{} ({} files)",
            entries.len(),
            store.name(),
            remote_dir,
            entries.iter().filter(|e| !e.is_dir).count()
        );

        let pool = FetcherPool::new(store.clone(), FetchOptions::from_config(&self.config));
        let processor = self.processor.clone();
        let on_report = Arc::new(on_report);

        let reports = pool
            .fetch_each(&entries, move |outcome| {
                let processor = processor.clone();
                let on_report = on_report.clone();
                async move {
                    let report = match mode {
                        BatchMode::FetchOnly => FileReport::from_fetch(outcome),
                        BatchMode::Correct => processor.process_fetched(outcome).await,
                    };
                    on_report(&report);
                    report
                }
            })
            .await;

        let result = PipelineResult::from_reports(reports);
        tracing::info!(
            "Batch finished in {:?}: {} succeeded, {} failed",
            start.elapsed(),
            result.succeeded(),
            result.failed()
        );
        Ok(result)
    }

    /// Correct one file that is already in the download directory.
    ///
    /// Unlike a batch, any failure is returned to the caller.
    pub async fn correct_file(&self, name: &str) -> Result<CorrectedFile> {
        naming::validate_input_name(name)?;
        ensure_dir(&self.config.corrected_dir()).await?;

        let input = self.config.download_dir().join(name);
        let mut report = FileReport::fetched(name, input);
        Ok(self.processor.process(&mut report).await?)
    }

    /// Public URL a file is served under.
    pub fn public_url(&self, kind: OutputKind, file_name: &str) -> String {
        naming::public_url(&self.config.storage, kind, file_name)
    }
}

async fn ensure_dir(path: &Path) -> Result<()> {
    tokio::fs::create_dir_all(path)
        .await
        .map_err(|source| RetintError::Directory {
            path: path.to_path_buf(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::pipeline::test_support::{jpeg_bytes, test_config};
    use crate::store::LocalStore;
    use crate::types::FileState;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Remote tree: a.jpg, b.jpg, notes.txt and a subdirectory.
    async fn setup(root: &Path) -> Coordinator {
        let config = test_config(root);
        let incoming = config.remote_root().join("incoming");
        std::fs::create_dir_all(incoming.join("thumbs")).unwrap();
        std::fs::write(incoming.join("a.jpg"), jpeg_bytes(16, 12)).unwrap();
        std::fs::write(incoming.join("b.jpg"), jpeg_bytes(8, 8)).unwrap();
        std::fs::write(incoming.join("notes.txt"), "not an image").unwrap();

        let store = LocalStore::connect(config.remote_root()).await.unwrap();
        Coordinator::new(config, Arc::new(store))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_batch_corrects_each_file_and_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = setup(dir.path()).await;

        let result = coordinator.run_batch(BatchMode::Correct).await.unwrap();

        let names: Vec<&str> = result.reports.iter().map(|r| r.source_name.as_str()).collect();
        assert_eq!(names, vec!["a.jpg", "b.jpg", "notes.txt"]);
        assert_eq!(result.reports[0].state, FileState::Persisted);
        assert_eq!(result.reports[1].state, FileState::Persisted);
        assert_eq!(result.reports[2].state, FileState::DecodeFailed);
        assert_eq!(result.succeeded(), 2);
        assert_eq!(result.failed(), 1);
        assert_eq!(result.representative.as_deref(), Some("n_a.jpg"));

        let corrected_dir = coordinator.config().corrected_dir();
        assert!(corrected_dir.join("c_n_a.jpg").is_file());
        assert!(corrected_dir.join("c_n_b.jpg").is_file());
        assert!(coordinator.config().download_dir().join("n_notes.txt").is_file());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_fetch_only_stops_at_fetched() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = setup(dir.path()).await;

        let result = coordinator.run_batch(BatchMode::FetchOnly).await.unwrap();

        assert_eq!(result.total(), 3);
        assert!(result.reports.iter().all(|r| r.state == FileState::Fetched));
        assert_eq!(result.failed(), 0);
        assert_eq!(result.representative.as_deref(), Some("n_a.jpg"));
        assert!(!coordinator.config().corrected_dir().exists());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_on_report_sees_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = setup(dir.path()).await;
        let seen = Arc::new(AtomicUsize::new(0));
        let seen_clone = seen.clone();

        coordinator
            .run_batch_with(BatchMode::Correct, move |report| {
                assert!(report.state.is_terminal());
                seen_clone.fetch_add(1, Ordering::SeqCst);
            })
            .await
            .unwrap();

        assert_eq!(seen.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_missing_remote_dir_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = test_config(dir.path());
        config.remote.remote_dir = "absent".to_string();
        std::fs::create_dir_all(config.remote_root()).unwrap();
        let store = LocalStore::connect(config.remote_root()).await.unwrap();
        let coordinator = Coordinator::new(config, Arc::new(store));

        let err = coordinator.run_batch(BatchMode::Correct).await.unwrap_err();
        assert!(matches!(err, RetintError::Store(StoreError::List { .. })));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_connect_uses_configured_backend() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        assert!(Coordinator::connect(config.clone()).await.is_err());

        std::fs::create_dir_all(config.remote_root()).unwrap();
        assert!(Coordinator::connect(config).await.is_ok());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_empty_remote_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(config.remote_root().join("incoming")).unwrap();
        let store = LocalStore::connect(config.remote_root()).await.unwrap();
        let coordinator = Coordinator::new(config, Arc::new(store));

        let result = coordinator.run_batch(BatchMode::Correct).await.unwrap();
        assert_eq!(result.total(), 0);
        assert!(result.representative.is_none());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_correct_file() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = setup(dir.path()).await;
        let download_dir = coordinator.config().download_dir();
        std::fs::create_dir_all(&download_dir).unwrap();
        std::fs::write(download_dir.join("n_x.jpg"), jpeg_bytes(6, 6)).unwrap();

        let corrected = coordinator.correct_file("n_x.jpg").await.unwrap();
        assert_eq!(corrected.file_name, "c_n_x.jpg");
        assert_eq!(
            coordinator.public_url(OutputKind::Corrected, &corrected.file_name),
            "http://localhost:8000/corrected-images/c_n_x.jpg"
        );
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_offline_coordinator_corrects_but_cannot_batch() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = Coordinator::offline(test_config(dir.path()));
        let download_dir = coordinator.config().download_dir();
        std::fs::create_dir_all(&download_dir).unwrap();
        std::fs::write(download_dir.join("n_y.jpg"), jpeg_bytes(5, 7)).unwrap();

        let corrected = coordinator.correct_file("n_y.jpg").await.unwrap();
        assert_eq!((corrected.width, corrected.height), (5, 7));

        let err = coordinator.run_batch(BatchMode::FetchOnly).await.unwrap_err();
        assert!(matches!(err, RetintError::Store(StoreError::Connect { .. })));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_correct_file_errors_reach_the_caller() {
        let dir = tempfile::tempdir().unwrap();
        let coordinator = setup(dir.path()).await;

        let err = coordinator.correct_file("../a.jpg").await.unwrap_err();
        assert!(matches!(err, RetintError::Pipeline(PipelineError::InvalidName(_))));

        let err = coordinator.correct_file("missing.jpg").await.unwrap_err();
        assert!(matches!(err, RetintError::Pipeline(PipelineError::FileNotFound(_))));
    }
}
