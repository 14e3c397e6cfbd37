//! Store backed by a local directory, e.g. a mounted network share.

use super::{RemoteFileStore, RemoteReader};
use crate::error::StoreError;
use crate::types::RemoteEntry;
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};

/// A directory on the local filesystem treated as the remote root.
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Open a store rooted at `root`, which must be an existing directory.
    pub async fn connect(root: PathBuf) -> Result<Self, StoreError> {
        let endpoint = root.display().to_string();
        let metadata = tokio::fs::metadata(&root)
            .await
            .map_err(|e| StoreError::Connect {
                endpoint: endpoint.clone(),
                message: e.to_string(),
            })?;

        if !metadata.is_dir() {
            return Err(StoreError::Connect {
                endpoint,
                message: "not a directory".to_string(),
            });
        }

        Ok(Self { root })
    }

    /// Map a store-relative path onto the filesystem, refusing anything that
    /// could leave the root.
    fn resolve(&self, path: &str) -> Result<PathBuf, StoreError> {
        let mut resolved = self.root.clone();
        for component in Path::new(path).components() {
            match component {
                Component::Normal(part) => resolved.push(part),
                Component::CurDir => {}
                _ => return Err(StoreError::InvalidPath(path.to_string())),
            }
        }
        Ok(resolved)
    }
}

#[async_trait]
impl RemoteFileStore for LocalStore {
    fn name(&self) -> &str {
        "local"
    }

    async fn list_entries(&self, dir: &str) -> Result<Vec<RemoteEntry>, StoreError> {
        let path = self.resolve(dir)?;
        let list_err = |e: std::io::Error| StoreError::List {
            path: dir.to_string(),
            message: e.to_string(),
        };

        let mut reader = tokio::fs::read_dir(&path).await.map_err(list_err)?;
        let mut entries = Vec::new();

        while let Some(entry) = reader.next_entry().await.map_err(list_err)? {
            let Ok(name) = entry.file_name().into_string() else {
                tracing::warn!("Skipping non-UTF-8 entry in {:?}", path);
                continue;
            };
            let is_dir = entry.file_type().await.map_err(list_err)?.is_dir();
            entries.push(RemoteEntry { name, is_dir });
        }

        // read_dir order is filesystem-dependent
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(entries)
    }

    async fn open_read(&self, path: &str) -> Result<RemoteReader, StoreError> {
        let full = self.resolve(path)?;
        let file = tokio::fs::File::open(&full)
            .await
            .map_err(|e| StoreError::Open {
                path: path.to_string(),
                message: e.to_string(),
            })?;
        Ok(Box::new(file))
    }
}
