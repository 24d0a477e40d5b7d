//! Restore reports.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::RestoreIssue;

/// Restore state machine phases
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestorePhase {
    Init,
    SchemaCheck,
    SchemaRestore,
    MetaReconcile,
    PerSubsetRestore,
    Done,
}

impl fmt::Display for RestorePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RestorePhase::Init => "init",
            RestorePhase::SchemaCheck => "schema-check",
            RestorePhase::SchemaRestore => "schema-restore",
            RestorePhase::MetaReconcile => "meta-reconcile",
            RestorePhase::PerSubsetRestore => "per-subset-restore",
            RestorePhase::Done => "done",
        };
        f.write_str(name)
    }
}

/// How far a run got before reaching `Done`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Termination {
    /// Every planned step was attempted
    Completed,
    /// The remote tool is missing; nothing was attempted
    ToolUnavailable,
    /// The snapshot holds no metadata
    NoSnapshotData,
    /// Live metadata could not be read; the data phase was skipped
    LiveMetadataUnavailable,
}

/// Outcome for a single subset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubsetStatus {
    /// Would be restored (dry run)
    Planned,
    /// Artifact staged and imported
    Restored,
    /// The snapshot holds no artifact for this subset
    ArtifactMissing,
    /// Staging or import failed
    Failed,
}

/// Per-subset restore report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubsetRestoreReport {
    /// Subset identifier
    pub subset_id: String,

    /// Snapshot metadata line
    pub metadata: String,

    /// Whether a purge was issued
    pub purge_attempted: bool,

    /// Whether the purge succeeded
    pub purged: bool,

    /// Final status
    pub status: SubsetStatus,

    /// Artifact size in bytes (0 when missing)
    pub bytes: u64,
}

/// Report for a complete restore run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreReport {
    /// Snapshot that was restored
    pub snapshot_id: String,

    /// Target host
    pub host: String,

    /// Planning only; nothing was changed on the live instance
    #[serde(default)]
    pub dry_run: bool,

    /// Start time of restore (epoch milliseconds)
    pub start_time: i64,

    /// End time of restore (epoch milliseconds)
    pub end_time: i64,

    /// Duration in milliseconds
    pub duration_ms: u64,

    /// Why the run ended
    pub termination: Termination,

    /// Phases entered, in order
    #[serde(default)]
    pub phases: Vec<RestorePhase>,

    /// Whether the live schema differed from the snapshot
    pub schema_replace_needed: bool,

    /// Whether the schema dump was imported successfully
    pub schema_replaced: bool,

    /// The live table was empty, so no purges were issued
    pub skip_purge: bool,

    /// Subsets already in sync
    pub subsets_in_sync: usize,

    /// Out-of-sync subsets left out by the subset selection
    pub subsets_excluded: Vec<String>,

    /// Subsets processed, in restore order
    pub subsets: Vec<SubsetRestoreReport>,

    /// Total artifact bytes imported
    pub bytes_restored: u64,

    /// Issues encountered (if any)
    pub issues: Vec<RestoreIssue>,
}

impl RestoreReport {
    pub(crate) fn new(snapshot_id: &str, host: &str) -> Self {
        Self {
            snapshot_id: snapshot_id.to_string(),
            host: host.to_string(),
            dry_run: false,
            start_time: 0,
            end_time: 0,
            duration_ms: 0,
            termination: Termination::Completed,
            phases: Vec::new(),
            schema_replace_needed: false,
            schema_replaced: false,
            skip_purge: false,
            subsets_in_sync: 0,
            subsets_excluded: Vec::new(),
            subsets: Vec::new(),
            bytes_restored: 0,
            issues: Vec::new(),
        }
    }

    /// Number of subsets restored
    pub fn restored_count(&self) -> usize {
        self.subsets
            .iter()
            .filter(|s| s.status == SubsetStatus::Restored)
            .count()
    }

    /// Number of subsets that were attempted but not restored
    pub fn failed_count(&self) -> usize {
        self.subsets
            .iter()
            .filter(|s| matches!(s.status, SubsetStatus::ArtifactMissing | SubsetStatus::Failed))
            .count()
    }

    /// The run left work undone that a rerun is expected to pick up.
    ///
    /// Ending early because the remote tool is missing or the snapshot is
    /// empty is a skip, not a failure.
    pub fn is_failure(&self) -> bool {
        self.termination == Termination::LiveMetadataUnavailable || self.failed_count() > 0
    }

    /// Every planned step succeeded
    pub fn is_clean(&self) -> bool {
        self.termination == Termination::Completed && self.issues.is_empty()
    }
}
