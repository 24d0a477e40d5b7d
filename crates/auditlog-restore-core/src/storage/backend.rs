//! Storage backend trait definition.

use async_trait::async_trait;
use bytes::Bytes;

use crate::Result;

/// Object store holding snapshots.
///
/// The restore path only reads; `put` exists so snapshots can be seeded by
/// tooling and tests.
#[async_trait]
pub trait StorageBackend: Send + Sync {
    /// Write data to a key
    async fn put(&self, key: &str, data: Bytes) -> Result<()>;

    /// Read data from a key
    async fn get(&self, key: &str) -> Result<Bytes>;

    /// List keys with a given prefix, sorted
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    /// Check if a key exists
    async fn exists(&self, key: &str) -> Result<bool>;
}
