//! Restore engine orchestration.

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use super::plan::RestorePlan;
use super::session::RestoreSession;
use crate::config::{Config, RestoreOptions};
use crate::error::{RemoteError, RestoreIssue};
use crate::metadata::{MetadataRecord, MetadataSet};
use crate::reconcile::compute_out_of_sync;
use crate::remote::{RemoteCollaborator, SshRemote};
use crate::report::{RestorePhase, RestoreReport, SubsetRestoreReport, SubsetStatus, Termination};
use crate::schema::{inject_drop_table, schema_changed};
use crate::snapshot::Snapshot;
use crate::storage::{create_backend, StorageBackend};
use crate::Result;

/// Name of the staged schema artifact
const SCHEMA_ARTIFACT: &str = "schema";

/// Outcome of the schema check.
struct SchemaCheck {
    snapshot_metadata: MetadataSet,
    snapshot_schema: String,
    changed: bool,
}

/// Restores one audit table from one snapshot.
pub struct RestoreEngine {
    config: Config,
    snapshot: Snapshot,
    remote: Arc<dyn RemoteCollaborator>,
}

impl RestoreEngine {
    /// Create an engine using the configured storage and an ssh remote
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let storage = create_backend(&config.storage)?;
        let remote = Arc::new(SshRemote::new(config.target.clone()));
        Self::with_parts(config, storage, remote)
    }

    /// Create an engine from explicit collaborators
    pub fn with_parts(
        config: Config,
        storage: Arc<dyn StorageBackend>,
        remote: Arc<dyn RemoteCollaborator>,
    ) -> Result<Self> {
        config.validate()?;
        let snapshot = Snapshot::new(storage, config.snapshot_id.clone());
        Ok(Self {
            config,
            snapshot,
            remote,
        })
    }

    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    fn options(&self) -> RestoreOptions {
        self.config.restore_options()
    }

    /// Run the restore process
    ///
    /// With `restore.dry_run` set this only plans; see [`RestoreEngine::dry_run`].
    pub async fn run(&self) -> Result<RestoreReport> {
        let options = self.options();
        if options.dry_run {
            return self.dry_run().await;
        }

        let start_time = Instant::now();
        let start_timestamp = chrono::Utc::now().timestamp_millis();
        info!(
            "Starting restore of snapshot {} onto {}",
            self.config.snapshot_id, self.config.target.host
        );

        let mut report = RestoreReport::new(&self.config.snapshot_id, &self.config.target.host);
        self.enter(&mut report, RestorePhase::Init);
        let mut session = RestoreSession::open(self.remote.as_ref())?;
        let result = self.run_internal(&mut session, &options, &mut report).await;
        session.finish().await;

        report.start_time = start_timestamp;
        report.end_time = chrono::Utc::now().timestamp_millis();
        report.duration_ms = start_time.elapsed().as_millis() as u64;

        if let Err(e) = result {
            error!("Restore aborted: {}", e);
            return Err(e);
        }

        info!(
            "Restore finished ({:?}): {} restored, {} not restored, {} in sync, {} issues",
            report.termination,
            report.restored_count(),
            report.failed_count(),
            report.subsets_in_sync,
            report.issues.len()
        );

        if let Some(path) = &options.report_path {
            if let Err(e) = write_report(path, &report).await {
                warn!("Failed to write restore report: {}", e);
            }
        }

        Ok(report)
    }

    /// Compute what a restore would do without changing the live instance.
    ///
    /// Issues only read-only collaborator calls. When the schema differs the
    /// table would be dropped, so the live metadata is not consulted and every
    /// snapshot subset is planned.
    pub async fn dry_run(&self) -> Result<RestoreReport> {
        let start_time = Instant::now();
        let start_timestamp = chrono::Utc::now().timestamp_millis();
        let options = self.options();
        info!(
            "Running dry-run for snapshot {} onto {}",
            self.config.snapshot_id, self.config.target.host
        );

        let mut report = RestoreReport::new(&self.config.snapshot_id, &self.config.target.host);
        report.dry_run = true;
        self.enter(&mut report, RestorePhase::Init);

        if let Some(check) = self.check_schema(&mut report).await? {
            let plan = if check.changed {
                Some(RestorePlan::full_restore(
                    &check.snapshot_metadata,
                    &options.subsets,
                ))
            } else {
                self.reconcile(&check.snapshot_metadata, false, &options, &mut report)
                    .await
            };

            if let Some(plan) = plan {
                report.skip_purge = plan.skip_purge;
                report.subsets_in_sync = plan.in_sync;
                report.subsets_excluded = plan.excluded.clone();

                for record in &plan.subsets {
                    let status = match self.snapshot.has_artifact(record.subset_id()).await {
                        Ok(true) => SubsetStatus::Planned,
                        Ok(false) => {
                            report.issues.push(RestoreIssue::ArtifactMissing {
                                subset_id: record.subset_id().to_string(),
                            });
                            SubsetStatus::ArtifactMissing
                        }
                        Err(e) => {
                            report.issues.push(RestoreIssue::TransferOrImportFailed {
                                subset_id: record.subset_id().to_string(),
                                reason: e.to_string(),
                            });
                            SubsetStatus::Failed
                        }
                    };
                    report.subsets.push(SubsetRestoreReport {
                        subset_id: record.subset_id().to_string(),
                        metadata: record.as_str().to_string(),
                        purge_attempted: false,
                        purged: false,
                        status,
                        bytes: 0,
                    });
                }
            }
        }
        if report.phases.last() != Some(&RestorePhase::Done) {
            self.enter(&mut report, RestorePhase::Done);
        }

        report.start_time = start_timestamp;
        report.end_time = chrono::Utc::now().timestamp_millis();
        report.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Dry-run complete: schema replace={}, {} subsets to restore, {} in sync",
            report.schema_replace_needed,
            report.subsets.len(),
            report.subsets_in_sync
        );

        Ok(report)
    }

    async fn run_internal(
        &self,
        session: &mut RestoreSession<'_>,
        options: &RestoreOptions,
        report: &mut RestoreReport,
    ) -> Result<()> {
        let Some(check) = self.check_schema(report).await? else {
            return Ok(());
        };

        if check.changed {
            self.enter(report, RestorePhase::SchemaRestore);
            let dump = inject_drop_table(&check.snapshot_schema, &self.config.target.table);
            match session.stage_and_import(SCHEMA_ARTIFACT, dump.as_bytes()).await {
                Ok(()) => {
                    info!("Replaced schema of {}", self.config.target.table);
                    report.schema_replaced = true;
                }
                Err(e) => {
                    error!("Schema restore failed: {}", e);
                    report.issues.push(RestoreIssue::SchemaRestoreFailed {
                        reason: e.to_string(),
                    });
                }
            }
        }

        let Some(plan) = self
            .reconcile(&check.snapshot_metadata, check.changed, options, report)
            .await
        else {
            return Ok(());
        };

        report.skip_purge = plan.skip_purge;
        report.subsets_in_sync = plan.in_sync;
        report.subsets_excluded = plan.excluded.clone();

        self.enter(report, RestorePhase::PerSubsetRestore);
        let total = plan.subsets.len();
        for (i, record) in plan.subsets.iter().enumerate() {
            info!(
                "[{}/{}] Restoring subset {}",
                i + 1,
                total,
                record.subset_id()
            );
            let subset_report = self
                .restore_subset(session, record, plan.skip_purge, &mut report.issues)
                .await;
            report.bytes_restored += subset_report.bytes;
            report.subsets.push(subset_report);
        }

        self.enter(report, RestorePhase::Done);
        Ok(())
    }

    /// `Init -> SchemaCheck`: probe the live schema and load the snapshot side.
    ///
    /// Returns `None` when the run ends here.
    async fn check_schema(&self, report: &mut RestoreReport) -> Result<Option<SchemaCheck>> {
        self.enter(report, RestorePhase::SchemaCheck);

        let live_schema = self.remote.fetch_live_schema().await;
        match &live_schema {
            Err(RemoteError::ToolUnavailable(reason)) => {
                warn!(
                    "Remote tool unavailable on {}, skipping restore: {}",
                    self.config.target.host, reason
                );
                report.termination = Termination::ToolUnavailable;
                report.issues.push(RestoreIssue::ToolUnavailable {
                    reason: reason.clone(),
                });
                self.enter(report, RestorePhase::Done);
                return Ok(None);
            }
            Err(e) => {
                warn!("Could not fetch live schema, forcing full restore: {}", e);
                report.issues.push(RestoreIssue::SchemaFetchFailed {
                    reason: e.to_string(),
                });
            }
            Ok(_) => {}
        }

        let snapshot_metadata = match self.snapshot.read_metadata().await? {
            Some(text) => MetadataSet::parse(&text),
            None => MetadataSet::new(),
        };
        if snapshot_metadata.is_empty() {
            info!(
                "Snapshot {} has no metadata, nothing to restore",
                self.snapshot.id()
            );
            report.termination = Termination::NoSnapshotData;
            report.issues.push(RestoreIssue::NoSnapshotData {
                snapshot_id: self.snapshot.id().to_string(),
            });
            self.enter(report, RestorePhase::Done);
            return Ok(None);
        }

        let snapshot_schema = self.snapshot.read_schema().await?;
        let changed = schema_changed(live_schema.as_deref(), &snapshot_schema);
        report.schema_replace_needed = changed;
        if changed {
            info!("Live schema differs from snapshot, schema will be replaced");
        } else {
            debug!("Live schema matches snapshot");
        }

        Ok(Some(SchemaCheck {
            snapshot_metadata,
            snapshot_schema,
            changed,
        }))
    }

    /// `-> MetaReconcile`: compare snapshot metadata with the live instance.
    ///
    /// Returns `None` when live metadata is unavailable.
    async fn reconcile(
        &self,
        snapshot_metadata: &MetadataSet,
        schema_replace_needed: bool,
        options: &RestoreOptions,
        report: &mut RestoreReport,
    ) -> Option<RestorePlan> {
        self.enter(report, RestorePhase::MetaReconcile);

        let live = self
            .remote
            .fetch_live_metadata()
            .await
            .map(|text| MetadataSet::parse(&text));

        match compute_out_of_sync(snapshot_metadata, live.as_ref()) {
            Ok(reconciliation) => Some(RestorePlan::build(
                schema_replace_needed,
                snapshot_metadata,
                reconciliation,
                &options.subsets,
            )),
            Err(issue) => {
                error!("{}; skipping data restore", issue);
                report.termination = Termination::LiveMetadataUnavailable;
                report.issues.push(issue);
                self.enter(report, RestorePhase::Done);
                None
            }
        }
    }

    /// Purge (unless skipped), then stage and import one subset.
    async fn restore_subset(
        &self,
        session: &mut RestoreSession<'_>,
        record: &MetadataRecord,
        skip_purge: bool,
        issues: &mut Vec<RestoreIssue>,
    ) -> SubsetRestoreReport {
        let subset_id = record.subset_id().to_string();
        let mut subset_report = SubsetRestoreReport {
            subset_id: subset_id.clone(),
            metadata: record.as_str().to_string(),
            purge_attempted: !skip_purge,
            purged: false,
            status: SubsetStatus::Failed,
            bytes: 0,
        };

        if !skip_purge {
            match self.remote.purge_subset(record).await {
                Ok(()) => {
                    debug!("Purged live rows of subset {}", subset_id);
                    subset_report.purged = true;
                }
                Err(e) => {
                    warn!(
                        "Purge of subset {} failed, importing anyway: {}",
                        subset_id, e
                    );
                    issues.push(RestoreIssue::PurgeFailed {
                        subset_id: subset_id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        let data = match self.snapshot.read_artifact(&subset_id).await {
            Ok(Some(data)) => data,
            Ok(None) => {
                warn!("Snapshot has no data artifact for subset {}", subset_id);
                issues.push(RestoreIssue::ArtifactMissing { subset_id });
                subset_report.status = SubsetStatus::ArtifactMissing;
                return subset_report;
            }
            Err(e) => {
                error!("Failed to read artifact for subset {}: {}", subset_id, e);
                issues.push(RestoreIssue::TransferOrImportFailed {
                    subset_id,
                    reason: e.to_string(),
                });
                return subset_report;
            }
        };

        match session.stage_and_import(&subset_id, &data).await {
            Ok(()) => {
                info!("Restored subset {} ({} bytes)", subset_id, data.len());
                subset_report.status = SubsetStatus::Restored;
                subset_report.bytes = data.len() as u64;
            }
            Err(e) => {
                error!("Restore of subset {} failed: {}", subset_id, e);
                issues.push(RestoreIssue::TransferOrImportFailed {
                    subset_id,
                    reason: e.to_string(),
                });
            }
        }

        subset_report
    }

    fn enter(&self, report: &mut RestoreReport, phase: RestorePhase) {
        debug!("Restore phase: {}", phase);
        report.phases.push(phase);
    }
}

async fn write_report(path: &std::path::Path, report: &RestoreReport) -> Result<()> {
    let json = serde_json::to_vec_pretty(report)?;
    tokio::fs::write(path, json).await?;
    info!("Wrote restore report to {}", path.display());
    Ok(())
}
