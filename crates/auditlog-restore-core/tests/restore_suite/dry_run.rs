//! Dry-run planning and run options.

use std::sync::Arc;

use auditlog_restore_core::{
    MemoryRemote, RemoteCall, RestoreOptions, RestorePhase, RestoreReport, SubsetSelection,
    SubsetStatus,
};

use super::common::*;

fn dry_run_config() -> auditlog_restore_core::Config {
    let mut config = test_config();
    config.restore = Some(RestoreOptions {
        dry_run: true,
        ..Default::default()
    });
    config
}

#[tokio::test]
async fn dry_run_only_reads() {
    let storage = SnapshotFixture::with_subsets(&[JAN, FEB, MAR]).seed().await;
    let remote = Arc::new(
        MemoryRemote::new()
            .with_live_schema(live_schema_unchanged())
            .with_live_metadata(format!("{}\n", JAN)),
    );

    let report = engine_with(dry_run_config(), &storage, &remote)
        .run()
        .await
        .unwrap();

    assert_eq!(
        remote.calls(),
        vec![RemoteCall::FetchLiveSchema, RemoteCall::FetchLiveMetadata]
    );
    assert!(report.dry_run);
    assert_eq!(report.subsets_in_sync, 1);
    assert_eq!(
        report
            .subsets
            .iter()
            .map(|s| (s.subset_id.as_str(), s.status))
            .collect::<Vec<_>>(),
        vec![
            ("2024-02", SubsetStatus::Planned),
            ("2024-03", SubsetStatus::Planned)
        ]
    );
    assert!(!report.subsets.iter().any(|s| s.purge_attempted));
}

#[tokio::test]
async fn dry_run_with_schema_change_plans_full_restore() {
    let storage = SnapshotFixture::with_subsets(&[JAN, FEB]).seed().await;
    let remote = Arc::new(
        MemoryRemote::new()
            .with_live_schema(live_schema_changed())
            .with_live_metadata(format!("{}\n{}\n", JAN, FEB)),
    );

    let report = engine(&storage, &remote).dry_run().await.unwrap();

    assert_eq!(remote.calls(), vec![RemoteCall::FetchLiveSchema]);
    assert_eq!(
        report.phases,
        vec![RestorePhase::Init, RestorePhase::SchemaCheck, RestorePhase::Done]
    );
    assert!(report.schema_replace_needed);
    assert!(!report.schema_replaced);
    assert!(report.skip_purge);
    assert_eq!(report.subsets.len(), 2);
}

#[tokio::test]
async fn dry_run_flags_missing_artifacts() {
    let storage = SnapshotFixture::with_subsets(&[JAN, FEB])
        .without_artifact("2024-01")
        .seed()
        .await;
    let remote = Arc::new(
        MemoryRemote::new()
            .with_live_schema(live_schema_unchanged())
            .with_live_metadata(""),
    );

    let report = engine(&storage, &remote).dry_run().await.unwrap();

    assert_eq!(report.subsets[0].status, SubsetStatus::ArtifactMissing);
    assert_eq!(report.subsets[1].status, SubsetStatus::Planned);
    assert_eq!(report.issues.len(), 1);
}

#[tokio::test]
async fn selection_limits_restored_subsets() {
    let storage = SnapshotFixture::with_subsets(&[JAN, FEB, MAR]).seed().await;
    let remote = Arc::new(
        MemoryRemote::new()
            .with_live_schema(live_schema_unchanged())
            .with_live_metadata("2023-12 10 1 10\n"),
    );
    let mut config = test_config();
    config.restore = Some(RestoreOptions {
        subsets: SubsetSelection {
            include: vec!["~^2024-0[12]$".to_string()],
            exclude: vec![],
        },
        ..Default::default()
    });

    let report = engine_with(config, &storage, &remote).run().await.unwrap();

    assert_eq!(imported_stems(&remote), vec!["2024-01", "2024-02"]);
    assert_eq!(report.subsets_excluded, vec!["2024-03"]);
    assert!(!remote
        .calls()
        .contains(&RemoteCall::Purge(MAR.to_string())));
}

#[tokio::test]
async fn report_is_written_to_report_path() {
    let dir = tempfile::TempDir::new().unwrap();
    let report_path = dir.path().join("restore-report.json");

    let storage = SnapshotFixture::with_subsets(&[JAN]).seed().await;
    let remote = Arc::new(
        MemoryRemote::new()
            .with_live_schema(live_schema_unchanged())
            .with_live_metadata(""),
    );
    let mut config = test_config();
    config.restore = Some(RestoreOptions {
        report_path: Some(report_path.clone()),
        ..Default::default()
    });

    let report = engine_with(config, &storage, &remote).run().await.unwrap();

    let written: RestoreReport =
        serde_json::from_slice(&std::fs::read(&report_path).unwrap()).unwrap();
    assert_eq!(written.snapshot_id, SNAPSHOT_ID);
    assert_eq!(written.restored_count(), report.restored_count());
    assert!(!written.dry_run);
}
