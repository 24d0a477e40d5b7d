//! Restore session: local scratch space plus the remote staging file.

use std::path::PathBuf;
use tempfile::TempDir;
use tracing::{debug, warn};

use crate::error::RemoteError;
use crate::remote::{RemoteCollaborator, RemoteResult};
use crate::Result;

/// Owns the resources a restore run holds on both ends.
///
/// Artifacts are written to a private scratch directory, copied to the remote
/// staging path and imported from there. [`RestoreSession::finish`] removes the
/// remote file if anything was staged; the engine calls it on every exit path.
/// The scratch directory is deleted on drop.
pub struct RestoreSession<'a> {
    remote: &'a dyn RemoteCollaborator,
    scratch: TempDir,
    staged: bool,
}

impl<'a> RestoreSession<'a> {
    /// Open a session against a remote collaborator
    pub fn open(remote: &'a dyn RemoteCollaborator) -> Result<Self> {
        let scratch = tempfile::Builder::new()
            .prefix("auditlog-restore-")
            .tempdir()?;
        debug!("Opened restore session in {}", scratch.path().display());
        Ok(Self {
            remote,
            scratch,
            staged: false,
        })
    }

    /// Whether the remote staging file may exist
    pub fn has_staged(&self) -> bool {
        self.staged
    }

    /// Write `data` locally, transfer it to the remote staging path and import it.
    pub async fn stage_and_import(&mut self, name: &str, data: &[u8]) -> RemoteResult<()> {
        let path = self.local_path(name);
        tokio::fs::write(&path, data).await.map_err(|e| {
            RemoteError::Transport(format!(
                "failed to write local artifact {}: {}",
                path.display(),
                e
            ))
        })?;

        // a failed transfer can still leave a partial file behind
        self.staged = true;
        self.remote.transfer_artifact(&path).await?;
        self.remote.import_staged_artifact().await
    }

    /// Release the remote staging file. Failures are logged, not returned.
    pub async fn finish(mut self) {
        if self.staged {
            match self.remote.release_staging().await {
                Ok(()) => debug!("Released remote staging file"),
                Err(e) => warn!("Failed to release remote staging file: {}", e),
            }
            self.staged = false;
        }
    }

    fn local_path(&self, name: &str) -> PathBuf {
        let file_name: String = name
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();
        self.scratch.path().join(format!("{}.sql", file_name))
    }
}

impl Drop for RestoreSession<'_> {
    fn drop(&mut self) {
        if self.staged {
            warn!("Restore session dropped without releasing the remote staging file");
        }
    }
}
