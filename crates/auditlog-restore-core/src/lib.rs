//! Audit-log Restore Core Library
//!
//! This crate restores a remote audit-log table from a snapshot, touching
//! only the subsets whose live metadata differs from what the snapshot
//! recorded.

pub mod config;
pub mod error;
pub mod metadata;
pub mod reconcile;
pub mod remote;
pub mod report;
pub mod restore;
pub mod schema;
pub mod snapshot;
pub mod storage;

pub use config::{Config, RestoreOptions, SshConfig, SubsetSelection, TargetConfig};
pub use error::{Error, RemoteError, RestoreIssue, Result, StorageError};
pub use metadata::{MetadataRecord, MetadataSet, SubsetStats};
pub use reconcile::{compute_out_of_sync, Reconciliation};
pub use remote::{MemoryRemote, RemoteCall, RemoteCollaborator, SshRemote};
pub use report::{RestorePhase, RestoreReport, SubsetRestoreReport, SubsetStatus, Termination};
pub use restore::{RestoreEngine, RestorePlan};
pub use snapshot::{list_snapshots, Snapshot};
pub use storage::{create_backend, StorageBackend, StorageBackendConfig};
