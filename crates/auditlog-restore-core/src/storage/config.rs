//! Storage configuration types.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where snapshots are read from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "backend")]
pub enum StorageBackendConfig {
    /// Local filesystem storage
    #[serde(rename = "filesystem")]
    Filesystem {
        /// Base path for storage
        path: PathBuf,
    },

    /// In-memory storage (for testing)
    #[serde(rename = "memory")]
    Memory,
}

impl StorageBackendConfig {
    /// Parse configuration from a URL string
    ///
    /// Supported URL formats:
    /// - `file:///path/to/snapshots`
    /// - `memory://`
    ///
    /// A bare path is treated as a filesystem location.
    pub fn from_url(url: &str) -> crate::Result<Self> {
        if !url.contains("://") {
            return Ok(Self::Filesystem {
                path: PathBuf::from(url),
            });
        }

        let parsed = url::Url::parse(url)
            .map_err(|e| crate::Error::Config(format!("Invalid storage URL: {}", e)))?;

        match parsed.scheme() {
            "file" => Ok(Self::Filesystem {
                path: PathBuf::from(parsed.path()),
            }),
            "memory" => Ok(Self::Memory),
            scheme => Err(crate::Error::Config(format!(
                "Unknown storage scheme: {}",
                scheme
            ))),
        }
    }
}
