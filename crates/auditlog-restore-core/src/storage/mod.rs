//! Snapshot storage backends.
//!
//! - **Filesystem**: snapshots kept in a local directory tree
//! - **Memory**: in-memory storage (for testing)

mod backend;
mod config;
mod filesystem;
mod memory;

pub use backend::StorageBackend;
pub use config::StorageBackendConfig;
pub use filesystem::FilesystemBackend;
pub use memory::MemoryBackend;

use crate::Result;
use std::sync::Arc;

/// Create a storage backend from configuration.
pub fn create_backend(config: &StorageBackendConfig) -> Result<Arc<dyn StorageBackend>> {
    match config {
        StorageBackendConfig::Filesystem { path } => {
            if path.as_os_str().is_empty() {
                return Err(crate::Error::Config(
                    "Filesystem storage path must not be empty".to_string(),
                ));
            }
            Ok(Arc::new(FilesystemBackend::new(path.clone())))
        }
        StorageBackendConfig::Memory => Ok(Arc::new(MemoryBackend::new())),
    }
}
