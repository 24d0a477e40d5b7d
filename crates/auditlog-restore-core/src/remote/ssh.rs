//! ssh/scp command channel driving the MySQL client tools on the target host.

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, trace};

use super::sql::{metadata_query, purge_statement, shell_quote};
use super::{decode_output, RemoteCollaborator, RemoteResult};
use crate::config::TargetConfig;
use crate::error::RemoteError;
use crate::metadata::MetadataRecord;

/// Exit status a POSIX shell reports for an unknown command.
const COMMAND_NOT_FOUND: i32 = 127;

/// Exit status ssh reports for its own failures (connection, auth, ...).
const SSH_ERROR: i32 = 255;

/// Remote collaborator reached over ssh.
#[derive(Debug, Clone)]
pub struct SshRemote {
    target: TargetConfig,
}

impl SshRemote {
    pub fn new(target: TargetConfig) -> Self {
        Self { target }
    }

    pub fn target(&self) -> &TargetConfig {
        &self.target
    }

    fn destination(&self) -> String {
        match &self.target.ssh.user {
            Some(user) => format!("{}@{}", user, self.target.host),
            None => self.target.host.clone(),
        }
    }

    fn ssh_command(&self, remote_command: &str) -> Command {
        let mut cmd = Command::new(&self.target.ssh.binary);
        if let Some(port) = self.target.ssh.port {
            cmd.arg("-p").arg(port.to_string());
        }
        for option in &self.target.ssh.options {
            cmd.arg("-o").arg(option);
        }
        cmd.arg(self.destination()).arg("--").arg(remote_command);
        cmd
    }

    fn client_invocation(&self) -> String {
        format!(
            "{} -N -B {}",
            self.target.client_command,
            shell_quote(&self.target.database)
        )
    }

    /// Run a command on the remote host, feeding `stdin` when given.
    async fn exec(&self, remote_command: &str, stdin: Option<&str>) -> RemoteResult<String> {
        debug!("ssh {}: {}", self.target.host, remote_command);

        let mut cmd = self.ssh_command(remote_command);
        cmd.stdin(if stdin.is_some() {
            Stdio::piped()
        } else {
            Stdio::null()
        })
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

        let mut child = cmd.spawn().map_err(|e| {
            RemoteError::Transport(format!(
                "failed to spawn {}: {}",
                self.target.ssh.binary, e
            ))
        })?;

        if let Some(input) = stdin {
            if let Some(mut pipe) = child.stdin.take() {
                pipe.write_all(input.as_bytes())
                    .await
                    .map_err(|e| RemoteError::Transport(format!("failed to write stdin: {}", e)))?;
                pipe.shutdown()
                    .await
                    .map_err(|e| RemoteError::Transport(format!("failed to close stdin: {}", e)))?;
            }
        }

        let output = child
            .wait_with_output()
            .await
            .map_err(|e| RemoteError::Transport(format!("ssh did not complete: {}", e)))?;

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        trace!(
            "ssh exit={:?} stdout={}B",
            output.status.code(),
            output.stdout.len()
        );

        classify_exit(output.status.code(), stderr)?;
        decode_output(output.stdout)
    }
}

/// Map an exit status to the collaborator error taxonomy.
pub(crate) fn classify_exit(code: Option<i32>, stderr: String) -> RemoteResult<()> {
    match code {
        Some(0) => Ok(()),
        Some(COMMAND_NOT_FOUND) => Err(RemoteError::ToolUnavailable(stderr)),
        Some(SSH_ERROR) => Err(RemoteError::Transport(stderr)),
        None => Err(RemoteError::Transport(format!(
            "terminated by signal: {}",
            stderr
        ))),
        exit_code => Err(RemoteError::CommandFailed { exit_code, stderr }),
    }
}

#[async_trait]
impl RemoteCollaborator for SshRemote {
    async fn fetch_live_metadata(&self) -> RemoteResult<String> {
        let query = metadata_query(&self.target);
        self.exec(&self.client_invocation(), Some(&query)).await
    }

    async fn fetch_live_schema(&self) -> RemoteResult<String> {
        let command = format!(
            "{} --no-data --skip-dump-date {} {}",
            self.target.dump_command,
            shell_quote(&self.target.database),
            shell_quote(&self.target.table)
        );
        self.exec(&command, None).await
    }

    async fn purge_subset(&self, record: &MetadataRecord) -> RemoteResult<()> {
        let statement = purge_statement(&self.target, record);
        self.exec(&self.client_invocation(), Some(&statement))
            .await
            .map(|_| ())
    }

    async fn transfer_artifact(&self, local_path: &Path) -> RemoteResult<()> {
        let mut cmd = Command::new(&self.target.ssh.scp_binary);
        cmd.arg("-q");
        if let Some(port) = self.target.ssh.port {
            cmd.arg("-P").arg(port.to_string());
        }
        for option in &self.target.ssh.options {
            cmd.arg("-o").arg(option);
        }
        cmd.arg(local_path)
            .arg(format!("{}:{}", self.destination(), self.target.staging_path))
            .stdin(Stdio::null())
            .kill_on_drop(true);

        debug!(
            "scp {} -> {}:{}",
            local_path.display(),
            self.target.host,
            self.target.staging_path
        );

        let output = cmd.output().await.map_err(|e| {
            RemoteError::Transport(format!(
                "failed to run {}: {}",
                self.target.ssh.scp_binary, e
            ))
        })?;

        match output.status.code() {
            Some(0) => Ok(()),
            code => Err(RemoteError::Transport(format!(
                "scp exited with {:?}: {}",
                code,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
        }
    }

    async fn import_staged_artifact(&self) -> RemoteResult<()> {
        let command = format!(
            "{} < {}",
            self.client_invocation(),
            shell_quote(&self.target.staging_path)
        );
        self.exec(&command, None).await.map(|_| ())
    }

    async fn release_staging(&self) -> RemoteResult<()> {
        let command = format!("rm -f {}", shell_quote(&self.target.staging_path));
        self.exec(&command, None).await.map(|_| ())
    }
}
