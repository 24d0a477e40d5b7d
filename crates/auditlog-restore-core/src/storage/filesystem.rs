//! Filesystem storage backend implementation.

use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Component, Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use super::StorageBackend;
use crate::error::StorageError;
use crate::Result;

/// Snapshots stored under a local directory
#[derive(Debug, Clone)]
pub struct FilesystemBackend {
    base_path: PathBuf,
}

impl FilesystemBackend {
    /// Create a new filesystem backend with the given base path
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Convert a storage key to a filesystem path
    fn key_to_path(&self, key: &str) -> Result<PathBuf> {
        let normalized = Path::new(key.trim_start_matches('/'));
        if normalized
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
        {
            return Err(StorageError::InvalidPath(key.to_string()).into());
        }
        Ok(self.base_path.join(normalized))
    }

    /// Convert a filesystem path to a storage key
    fn path_to_key(&self, path: &Path) -> Option<String> {
        path.strip_prefix(&self.base_path).ok().map(|p| {
            p.components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/")
        })
    }
}

#[async_trait]
impl StorageBackend for FilesystemBackend {
    async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        let path = self.key_to_path(key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::Backend(format!("Failed to create directories: {}", e))
            })?;
        }

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::Backend(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::Backend(format!("Failed to write to file {}: {}", path.display(), e))
        })?;

        file.flush().await.map_err(|e| {
            StorageError::Backend(format!("Failed to flush file {}: {}", path.display(), e))
        })?;

        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let path = self.key_to_path(key)?;

        let data = fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::NotFound(key.to_string())
            } else {
                StorageError::Backend(format!("Failed to read file {}: {}", path.display(), e))
            }
        })?;

        Ok(Bytes::from(data))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let base = self.key_to_path(prefix)?;
        let mut results = Vec::new();

        if !fs::try_exists(&base).await.unwrap_or(false) {
            return Ok(results);
        }

        let mut stack = vec![base];
        while let Some(dir) = stack.pop() {
            if dir.is_file() {
                if let Some(key) = self.path_to_key(&dir) {
                    results.push(key);
                }
                continue;
            }

            let mut entries = fs::read_dir(&dir).await.map_err(|e| {
                StorageError::Backend(format!("Failed to read directory {}: {}", dir.display(), e))
            })?;

            while let Some(entry) = entries.next_entry().await.map_err(|e| {
                StorageError::Backend(format!("Failed to read directory entry: {}", e))
            })? {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else if let Some(key) = self.path_to_key(&path) {
                    results.push(key);
                }
            }
        }

        results.sort();
        Ok(results)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let path = self.key_to_path(key)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }
}
