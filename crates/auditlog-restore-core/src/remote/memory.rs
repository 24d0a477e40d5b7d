//! In-process remote collaborator for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::Path;

use super::{decode_output, RemoteCollaborator, RemoteResult};
use crate::error::RemoteError;
use crate::metadata::MetadataRecord;

/// A call received by [`MemoryRemote`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    FetchLiveMetadata,
    FetchLiveSchema,
    /// Purge with the full metadata line
    Purge(String),
    /// Transfer, by local file stem
    Transfer(String),
    /// Import of the currently staged file stem
    Import(String),
    ReleaseStaging,
}

#[derive(Debug)]
struct State {
    live_metadata: RemoteResult<String>,
    live_schema: RemoteResult<String>,
    failing_purges: HashSet<String>,
    failing_transfers: HashSet<String>,
    failing_imports: HashSet<String>,
    staged: Option<(String, Vec<u8>)>,
    imported: Vec<(String, Vec<u8>)>,
    calls: Vec<RemoteCall>,
}

/// Scriptable fake of the live instance.
///
/// Responses are configured up front; every call is recorded so tests can
/// assert on the exact sequence the engine issued.
pub struct MemoryRemote {
    state: Mutex<State>,
}

impl Default for MemoryRemote {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRemote {
    /// A live instance with an empty table and an empty schema
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                live_metadata: Ok(String::new()),
                live_schema: Ok(String::new()),
                failing_purges: HashSet::new(),
                failing_transfers: HashSet::new(),
                failing_imports: HashSet::new(),
                staged: None,
                imported: Vec::new(),
                calls: Vec::new(),
            }),
        }
    }

    pub fn with_live_metadata(self, metadata: impl Into<String>) -> Self {
        self.state.lock().live_metadata = Ok(metadata.into());
        self
    }

    /// Live metadata as raw bytes, decoded the way real command output is
    pub fn with_live_metadata_bytes(self, metadata: &[u8]) -> Self {
        self.state.lock().live_metadata = decode_output(metadata.to_vec());
        self
    }

    pub fn with_live_metadata_error(self, error: RemoteError) -> Self {
        self.state.lock().live_metadata = Err(error);
        self
    }

    pub fn with_live_schema(self, schema: impl Into<String>) -> Self {
        self.state.lock().live_schema = Ok(schema.into());
        self
    }

    pub fn with_live_schema_error(self, error: RemoteError) -> Self {
        self.state.lock().live_schema = Err(error);
        self
    }

    /// Make purging this subset fail
    pub fn fail_purge(self, subset_id: &str) -> Self {
        self.state.lock().failing_purges.insert(subset_id.to_string());
        self
    }

    /// Make transferring the file with this stem fail
    pub fn fail_transfer(self, stem: &str) -> Self {
        self.state.lock().failing_transfers.insert(stem.to_string());
        self
    }

    /// Make importing the file with this stem fail
    pub fn fail_import(self, stem: &str) -> Self {
        self.state.lock().failing_imports.insert(stem.to_string());
        self
    }

    /// Calls received so far
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state.lock().calls.clone()
    }

    /// Files imported so far, by stem, with their contents
    pub fn imported(&self) -> Vec<(String, Vec<u8>)> {
        self.state.lock().imported.clone()
    }

    /// Whether a file is still staged
    pub fn has_staged(&self) -> bool {
        self.state.lock().staged.is_some()
    }

    fn record(&self, call: RemoteCall) {
        self.state.lock().calls.push(call);
    }
}

#[async_trait]
impl RemoteCollaborator for MemoryRemote {
    async fn fetch_live_metadata(&self) -> RemoteResult<String> {
        self.record(RemoteCall::FetchLiveMetadata);
        self.state.lock().live_metadata.clone()
    }

    async fn fetch_live_schema(&self) -> RemoteResult<String> {
        self.record(RemoteCall::FetchLiveSchema);
        self.state.lock().live_schema.clone()
    }

    async fn purge_subset(&self, record: &MetadataRecord) -> RemoteResult<()> {
        self.record(RemoteCall::Purge(record.as_str().to_string()));
        if self.state.lock().failing_purges.contains(record.subset_id()) {
            return Err(RemoteError::CommandFailed {
                exit_code: Some(1),
                stderr: "ERROR 1205 (HY000): Lock wait timeout exceeded".to_string(),
            });
        }
        Ok(())
    }

    async fn transfer_artifact(&self, local_path: &Path) -> RemoteResult<()> {
        let stem = local_path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.record(RemoteCall::Transfer(stem.clone()));

        if self.state.lock().failing_transfers.contains(&stem) {
            return Err(RemoteError::Transport("scp: connection lost".to_string()));
        }

        let data = tokio::fs::read(local_path)
            .await
            .map_err(|e| RemoteError::Transport(e.to_string()))?;
        self.state.lock().staged = Some((stem, data));
        Ok(())
    }

    async fn import_staged_artifact(&self) -> RemoteResult<()> {
        let mut state = self.state.lock();
        let staged = state.staged.clone();
        let stem = staged.as_ref().map(|(s, _)| s.clone()).unwrap_or_default();
        state.calls.push(RemoteCall::Import(stem.clone()));

        let Some(staged) = staged else {
            return Err(RemoteError::CommandFailed {
                exit_code: Some(1),
                stderr: "No such file or directory".to_string(),
            });
        };
        if state.failing_imports.contains(&stem) {
            return Err(RemoteError::CommandFailed {
                exit_code: Some(1),
                stderr: "ERROR 1062 (23000): Duplicate entry".to_string(),
            });
        }
        state.imported.push(staged);
        Ok(())
    }

    async fn release_staging(&self) -> RemoteResult<()> {
        let mut state = self.state.lock();
        state.calls.push(RemoteCall::ReleaseStaging);
        state.staged = None;
        Ok(())
    }
}
