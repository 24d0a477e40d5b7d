//! Read-only access to a stored snapshot.
//!
//! Layout under the storage root:
//!
//! ```text
//! <snapshot_id>/schema.sql
//! <snapshot_id>/metadata/<subset>.meta   one or more metadata lines each
//! <snapshot_id>/data/<subset>.sql        import artifact per subset
//! ```
//!
//! Metadata files are concatenated in key order.

use bytes::Bytes;
use std::sync::Arc;
use tracing::debug;

use crate::error::StorageError;
use crate::storage::StorageBackend;
use crate::{Error, Result};

/// Schema dump key
pub fn schema_key(snapshot_id: &str) -> String {
    format!("{}/schema.sql", snapshot_id)
}

/// Prefix holding metadata files
pub fn metadata_prefix(snapshot_id: &str) -> String {
    format!("{}/metadata", snapshot_id)
}

/// Data artifact key for a subset
pub fn artifact_key(snapshot_id: &str, subset_id: &str) -> String {
    format!("{}/data/{}.sql", snapshot_id, subset_id)
}

/// A snapshot in a storage backend.
#[derive(Clone)]
pub struct Snapshot {
    storage: Arc<dyn StorageBackend>,
    id: String,
}

impl Snapshot {
    pub fn new(storage: Arc<dyn StorageBackend>, id: impl Into<String>) -> Self {
        Self {
            storage,
            id: id.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Concatenated metadata text, or `None` when the snapshot has no metadata files.
    ///
    /// Files must be valid UTF-8; records are compared byte for byte.
    pub async fn read_metadata(&self) -> Result<Option<String>> {
        let keys = self.metadata_keys().await?;
        if keys.is_empty() {
            return Ok(None);
        }

        let mut text = String::new();
        for key in &keys {
            let data = self.storage.get(key).await?;
            let chunk = std::str::from_utf8(&data).map_err(|e| {
                Error::Serialization(format!("Metadata file {} is not valid UTF-8: {}", key, e))
            })?;
            text.push_str(chunk);
            if !text.ends_with('\n') {
                text.push('\n');
            }
        }
        debug!(
            "Read {} metadata files for snapshot {}",
            keys.len(),
            self.id
        );
        Ok(Some(text))
    }

    /// The snapshot's schema dump.
    pub async fn read_schema(&self) -> Result<String> {
        let data = self
            .storage
            .get(&schema_key(&self.id))
            .await
            .map_err(|e| match e {
                Error::Storage(StorageError::NotFound(_)) => Error::SnapshotNotFound(format!(
                    "Snapshot '{}' has no schema dump",
                    self.id
                )),
                other => other,
            })?;
        Ok(String::from_utf8_lossy(&data).into_owned())
    }

    /// Data artifact for a subset, or `None` when the snapshot does not hold one.
    pub async fn read_artifact(&self, subset_id: &str) -> Result<Option<Bytes>> {
        if !is_safe_subset_id(subset_id) {
            return Ok(None);
        }
        match self.storage.get(&artifact_key(&self.id, subset_id)).await {
            Ok(data) => Ok(Some(data)),
            Err(Error::Storage(StorageError::NotFound(_))) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Whether a data artifact exists for a subset
    pub async fn has_artifact(&self, subset_id: &str) -> Result<bool> {
        if !is_safe_subset_id(subset_id) {
            return Ok(false);
        }
        self.storage
            .exists(&artifact_key(&self.id, subset_id))
            .await
    }

    async fn metadata_keys(&self) -> Result<Vec<String>> {
        let prefix = format!("{}/", metadata_prefix(&self.id));
        let mut keys: Vec<String> = self
            .storage
            .list(&metadata_prefix(&self.id))
            .await?
            .into_iter()
            .filter(|k| k.starts_with(&prefix) && k.ends_with(".meta"))
            .collect();
        keys.sort();
        Ok(keys)
    }
}

/// List snapshot ids (directories holding a schema dump).
pub async fn list_snapshots(storage: &dyn StorageBackend) -> Result<Vec<String>> {
    let mut ids: Vec<String> = storage
        .list("")
        .await?
        .iter()
        .filter_map(|key| key.strip_suffix("/schema.sql"))
        .filter(|id| !id.contains('/'))
        .map(str::to_string)
        .collect();
    ids.sort();
    ids.dedup();
    Ok(ids)
}

fn is_safe_subset_id(subset_id: &str) -> bool {
    !subset_id.is_empty() && !subset_id.contains('/') && !subset_id.contains("..")
}
