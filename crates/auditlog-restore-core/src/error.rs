//! Error types for the audit-log restore core library.

use thiserror::Error;

/// Result type alias using the library's Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the restore library.
///
/// Only faults outside the restore taxonomy end up here. Expected per-run
/// conditions are reported as [`RestoreIssue`]s on the restore report.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Snapshot storage error
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Remote collaborator error
    #[error("Remote error: {0}")]
    Remote(#[from] RemoteError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot not found
    #[error("Snapshot not found: {0}")]
    SnapshotNotFound(String),
}

/// Storage-specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    /// Object not found
    #[error("Object not found: {0}")]
    NotFound(String),

    /// Storage backend error
    #[error("Backend error: {0}")]
    Backend(String),

    /// Invalid path
    #[error("Invalid path: {0}")]
    InvalidPath(String),
}

/// Failures reported by the remote collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum RemoteError {
    /// The export/import tool is not installed on the remote host
    #[error("Remote tool not available: {0}")]
    ToolUnavailable(String),

    /// The command channel itself failed (spawn error, connection refused, ...)
    #[error("Transport failure: {0}")]
    Transport(String),

    /// The remote command succeeded but its output could not be used
    #[error("Malformed remote output: {0}")]
    MalformedOutput(String),

    /// The remote command ran but exited unsuccessfully
    #[error("Remote command exited with {exit_code:?}: {stderr}")]
    CommandFailed {
        exit_code: Option<i32>,
        stderr: String,
    },
}

/// Expected conditions encountered while restoring.
///
/// Which of these stop the run and which only affect a single subset is
/// decided by the restore engine; see [`RestoreIssue::is_fatal`].
#[derive(Error, Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RestoreIssue {
    /// The snapshot holds no metadata files
    #[error("Snapshot {snapshot_id} has no metadata, nothing to restore")]
    NoSnapshotData { snapshot_id: String },

    /// The live metadata query failed
    #[error("Live metadata unavailable: {reason}")]
    LiveMetadataUnavailable { reason: String },

    /// The remote tool is not present on the target instance
    #[error("Remote tool unavailable: {reason}")]
    ToolUnavailable { reason: String },

    /// The live schema could not be fetched; schema treated as changed
    #[error("Live schema fetch failed: {reason}")]
    SchemaFetchFailed { reason: String },

    /// The schema dump could not be staged or imported
    #[error("Schema restore failed: {reason}")]
    SchemaRestoreFailed { reason: String },

    /// The snapshot has no data artifact for a subset
    #[error("No data artifact for subset {subset_id}")]
    ArtifactMissing { subset_id: String },

    /// Purging live rows for a subset failed; import went ahead anyway
    #[error("Purge of subset {subset_id} failed: {reason}")]
    PurgeFailed { subset_id: String, reason: String },

    /// Staging or importing a subset artifact failed
    #[error("Restore of subset {subset_id} failed: {reason}")]
    TransferOrImportFailed { subset_id: String, reason: String },
}

impl RestoreIssue {
    /// Whether this issue ends the run (as opposed to a single step).
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            RestoreIssue::NoSnapshotData { .. }
                | RestoreIssue::LiveMetadataUnavailable { .. }
                | RestoreIssue::ToolUnavailable { .. }
        )
    }

    /// Subset this issue is scoped to, if any.
    pub fn subset_id(&self) -> Option<&str> {
        match self {
            RestoreIssue::ArtifactMissing { subset_id }
            | RestoreIssue::PurgeFailed { subset_id, .. }
            | RestoreIssue::TransferOrImportFailed { subset_id, .. } => Some(subset_id),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}
