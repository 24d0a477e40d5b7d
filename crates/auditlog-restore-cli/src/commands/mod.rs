pub mod describe;
pub mod list;
pub mod plan;
pub mod restore;

use auditlog_restore_core::{create_backend, StorageBackend, StorageBackendConfig};
use std::sync::Arc;

/// Open a snapshot store from a `-p` argument: a bare path, `file:///…` or `memory://`
pub fn open_storage(location: &str) -> anyhow::Result<Arc<dyn StorageBackend>> {
    let config = StorageBackendConfig::from_url(location)?;
    Ok(create_backend(&config)?)
}

/// Output format shared by the reporting commands
pub enum OutputFormat {
    Text,
    Json,
    Yaml,
}

impl From<&str> for OutputFormat {
    fn from(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "json" => Self::Json,
            "yaml" => Self::Yaml,
            _ => Self::Text,
        }
    }
}

pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    if bytes >= GB {
        format!("{:.2} GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

pub fn format_timestamp(millis: i64) -> String {
    chrono::DateTime::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}
