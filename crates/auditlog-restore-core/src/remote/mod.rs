//! Remote collaborator: the live instance behind a command channel.
//!
//! The restore engine only talks to the target through [`RemoteCollaborator`].
//! [`SshRemote`] drives the MySQL client tools over ssh/scp;
//! [`MemoryRemote`] is an in-process fake used by tests.

mod memory;
pub mod sql;
mod ssh;

pub use memory::{MemoryRemote, RemoteCall};
pub use ssh::SshRemote;

use async_trait::async_trait;
use std::path::Path;

use crate::error::RemoteError;
use crate::metadata::MetadataRecord;

/// Result of a single remote round-trip
pub type RemoteResult<T> = std::result::Result<T, RemoteError>;

/// Operations the restore engine needs from the live instance.
///
/// Every call is a blocking round-trip from the engine's point of view and is
/// attempted once.
#[async_trait]
pub trait RemoteCollaborator: Send + Sync {
    /// Per-subset metadata lines currently held by the live table
    async fn fetch_live_metadata(&self) -> RemoteResult<String>;

    /// Schema-only dump of the live table
    async fn fetch_live_schema(&self) -> RemoteResult<String>;

    /// Delete live rows belonging to a subset
    async fn purge_subset(&self, record: &MetadataRecord) -> RemoteResult<()>;

    /// Copy a local file to the remote staging location
    async fn transfer_artifact(&self, local_path: &Path) -> RemoteResult<()>;

    /// Import whatever is currently staged
    async fn import_staged_artifact(&self) -> RemoteResult<()>;

    /// Remove the staged file
    async fn release_staging(&self) -> RemoteResult<()>;
}

/// Decode command output. Metadata lines are compared byte for byte, so
/// output that is not valid UTF-8 is rejected rather than repaired.
pub(crate) fn decode_output(stdout: Vec<u8>) -> RemoteResult<String> {
    String::from_utf8(stdout).map_err(|e| {
        RemoteError::MalformedOutput(format!("output is not valid UTF-8: {}", e.utf8_error()))
    })
}
