//! Remote file stores that a batch is fetched from.
//!
//! Defines the interface every backend implements, plus the factory that
//! connects the backend named in config. The returned handle is shared
//! read-only by every fetch task of a batch.

pub mod http;
pub mod local;

pub use http::HttpStore;
pub use local::LocalStore;

use crate::config::Config;
use crate::error::StoreError;
use crate::types::RemoteEntry;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::AsyncRead;

/// A remote file opened for streamed reading.
pub type RemoteReader = Box<dyn AsyncRead + Send + Unpin>;

/// Trait that all remote stores implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (the pool holds an `Arc<dyn RemoteFileStore>`).
#[async_trait]
pub trait RemoteFileStore: Send + Sync {
    /// Backend name for logging (e.g., "local", "http").
    fn name(&self) -> &str;

    /// List the entries of one remote directory.
    async fn list_entries(&self, dir: &str) -> Result<Vec<RemoteEntry>, StoreError>;

    /// Open one remote file for streamed reading.
    async fn open_read(&self, path: &str) -> Result<RemoteReader, StoreError>;
}

/// Join a remote directory and an entry name with `/`.
pub fn join_remote(dir: &str, name: &str) -> String {
    let dir = dir.trim_end_matches('/');
    if dir.is_empty() {
        name.to_string()
    } else {
        format!("{dir}/{name}")
    }
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok().filter(|v| !v.is_empty())
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Factory that connects the store named by `remote.backend`.
pub struct StoreFactory;

impl StoreFactory {
    /// Connect to the configured store.
    ///
    /// Connection setup is bounded by `remote.connect_timeout_ms`; anything
    /// that fails here is fatal to the batch.
    pub async fn connect(config: &Config) -> Result<Arc<dyn RemoteFileStore>, StoreError> {
        let timeout = Duration::from_millis(config.remote.connect_timeout_ms);

        let connecting = async {
            let store: Arc<dyn RemoteFileStore> = match config.remote.backend.as_str() {
                "local" => Arc::new(LocalStore::connect(config.remote_root()).await?),
                "http" => Arc::new(
                    HttpStore::connect(
                        &config.remote.base_url,
                        resolve_env_var(&config.remote.token),
                        timeout,
                    )
                    .await?,
                ),
                other => return Err(StoreError::UnknownBackend(other.to_string())),
            };
            Ok::<_, StoreError>(store)
        };

        match tokio::time::timeout(timeout, connecting).await {
            Ok(result) => {
                let store = result?;
                tracing::debug!("Connected to {} store", store.name());
                Ok(store)
            }
            Err(_) => Err(StoreError::Connect {
                endpoint: config.remote.backend.clone(),
                message: format!("timed out after {}ms", timeout.as_millis()),
            }),
        }
    }
}
