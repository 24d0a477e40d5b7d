//! Configuration structures for audit-log restore runs.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Snapshot to restore from
    pub snapshot_id: String,

    /// Where snapshots are stored
    pub storage: crate::storage::StorageBackendConfig,

    /// Instance being restored
    pub target: TargetConfig,

    /// Restore-specific options
    #[serde(default)]
    pub restore: Option<RestoreOptions>,
}

/// The live instance and how to reach it
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetConfig {
    /// Remote host name (as understood by ssh)
    pub host: String,

    /// Database holding the audit table
    pub database: String,

    /// Audit table name
    #[serde(default = "default_table")]
    pub table: String,

    /// SQL expression giving a row's subset id
    #[serde(default = "default_subset_expr")]
    pub subset_expr: String,

    /// Primary key column
    #[serde(default = "default_id_column")]
    pub id_column: String,

    /// Command channel settings
    #[serde(default)]
    pub ssh: SshConfig,

    /// Remote schema/data dump tool
    #[serde(default = "default_dump_command")]
    pub dump_command: String,

    /// Remote SQL client used for queries and imports
    #[serde(default = "default_client_command")]
    pub client_command: String,

    /// Remote path where artifacts are staged before import
    #[serde(default = "default_staging_path")]
    pub staging_path: String,
}

/// SSH/SCP invocation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SshConfig {
    /// ssh binary
    #[serde(default = "default_ssh_binary")]
    pub binary: String,

    /// scp binary
    #[serde(default = "default_scp_binary")]
    pub scp_binary: String,

    /// Remote user (defaults to ssh's own resolution)
    #[serde(default)]
    pub user: Option<String>,

    /// Remote port
    #[serde(default)]
    pub port: Option<u16>,

    /// Extra `-o` options passed to both ssh and scp
    #[serde(default = "default_ssh_options")]
    pub options: Vec<String>,
}

impl Default for SshConfig {
    fn default() -> Self {
        Self {
            binary: default_ssh_binary(),
            scp_binary: default_scp_binary(),
            user: None,
            port: None,
            options: default_ssh_options(),
        }
    }
}

fn default_table() -> String {
    "audit_log".to_string()
}

fn default_subset_expr() -> String {
    "DATE_FORMAT(created_at, '%Y-%m')".to_string()
}

fn default_id_column() -> String {
    "id".to_string()
}

fn default_dump_command() -> String {
    "mysqldump".to_string()
}

fn default_client_command() -> String {
    "mysql".to_string()
}

fn default_staging_path() -> String {
    "/tmp/auditlog-restore.sql".to_string()
}

fn default_ssh_binary() -> String {
    "ssh".to_string()
}

fn default_scp_binary() -> String {
    "scp".to_string()
}

fn default_ssh_options() -> Vec<String> {
    vec!["BatchMode=yes".to_string()]
}

/// Subset selection (include/exclude patterns)
///
/// Patterns are globs (`2024-*`) or regexes when prefixed with `~`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SubsetSelection {
    /// Subsets to include (empty means all)
    #[serde(default)]
    pub include: Vec<String>,

    /// Subsets to exclude
    #[serde(default)]
    pub exclude: Vec<String>,
}

/// Restore-specific options
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RestoreOptions {
    /// Compute the plan without touching the remote table
    #[serde(default)]
    pub dry_run: bool,

    /// Limit which out-of-sync subsets are restored
    #[serde(default)]
    pub subsets: SubsetSelection,

    /// Output file for the JSON restore report
    #[serde(default)]
    pub report_path: Option<PathBuf>,
}

impl Config {
    /// Load a YAML configuration file
    pub fn from_yaml_file(path: &std::path::Path) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Restore options, defaulted when absent
    pub fn restore_options(&self) -> RestoreOptions {
        self.restore.clone().unwrap_or_default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> crate::Result<()> {
        if self.snapshot_id.trim().is_empty() {
            return Err(crate::Error::Config(
                "snapshot_id must not be empty".to_string(),
            ));
        }

        if self.snapshot_id.contains('/') || self.snapshot_id.contains("..") {
            return Err(crate::Error::Config(format!(
                "Invalid snapshot_id: {}",
                self.snapshot_id
            )));
        }

        self.target.validate()?;

        if let Some(restore) = &self.restore {
            restore.validate()?;
        }

        Ok(())
    }
}

impl TargetConfig {
    /// Validate target settings
    pub fn validate(&self) -> crate::Result<()> {
        if self.host.trim().is_empty() {
            return Err(crate::Error::Config(
                "target.host must not be empty".to_string(),
            ));
        }

        for (name, value) in [
            ("target.database", &self.database),
            ("target.table", &self.table),
            ("target.id_column", &self.id_column),
        ] {
            if !is_identifier(value) {
                return Err(crate::Error::Config(format!(
                    "{} must be a plain identifier, got '{}'",
                    name, value
                )));
            }
        }

        if self.subset_expr.trim().is_empty() {
            return Err(crate::Error::Config(
                "target.subset_expr must not be empty".to_string(),
            ));
        }

        if self.staging_path.trim().is_empty() || self.staging_path.contains('\'') {
            return Err(crate::Error::Config(format!(
                "Invalid target.staging_path: {}",
                self.staging_path
            )));
        }

        Ok(())
    }
}

impl RestoreOptions {
    /// Validate restore options
    pub fn validate(&self) -> crate::Result<()> {
        for pattern in self
            .subsets
            .include
            .iter()
            .chain(self.subsets.exclude.iter())
        {
            if let Some(re) = pattern.strip_prefix('~') {
                regex::Regex::new(re).map_err(|e| {
                    crate::Error::Config(format!("Invalid subset pattern '{}': {}", pattern, e))
                })?;
            }
        }

        Ok(())
    }
}

fn is_identifier(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}
