//! In-memory storage backend for testing.

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;
use object_store::memory::InMemory;
use object_store::path::Path;
use object_store::{ObjectStore, PutPayload};
use std::sync::Arc;

use super::StorageBackend;
use crate::error::StorageError;
use crate::{Error, Result};

/// In-memory storage backend using object_store
///
/// Nothing is persisted between runs.
pub struct MemoryBackend {
    store: Arc<InMemory>,
}

impl MemoryBackend {
    /// Create a new in-memory storage backend
    pub fn new() -> Self {
        Self {
            store: Arc::new(InMemory::new()),
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        let path = Path::from(key);
        self.store
            .put(&path, PutPayload::from_bytes(data))
            .await
            .map_err(|e| Error::Storage(StorageError::Backend(format!("Memory PUT failed: {}", e))))?;
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Bytes> {
        let path = Path::from(key);
        let result = self.store.get(&path).await.map_err(|e| match e {
            object_store::Error::NotFound { .. } => {
                Error::Storage(StorageError::NotFound(key.to_string()))
            }
            _ => Error::Storage(StorageError::Backend(format!("Memory GET failed: {}", e))),
        })?;

        result
            .bytes()
            .await
            .map_err(|e| Error::Storage(StorageError::Backend(format!("Failed to read bytes: {}", e))))
    }

    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let prefix_path = Path::from(prefix);
        let mut keys = Vec::new();
        let mut stream = self.store.list(Some(&prefix_path));

        while let Some(result) = stream.next().await {
            let meta = result.map_err(|e| {
                Error::Storage(StorageError::Backend(format!("Memory LIST failed: {}", e)))
            })?;
            keys.push(meta.location.to_string());
        }

        keys.sort();
        Ok(keys)
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        let path = Path::from(key);
        match self.store.head(&path).await {
            Ok(_) => Ok(true),
            Err(object_store::Error::NotFound { .. }) => Ok(false),
            Err(e) => Err(Error::Storage(StorageError::Backend(format!(
                "Memory HEAD failed: {}",
                e
            )))),
        }
    }
}
