//! Failure handling: which faults stop the run and which only skip a subset.

use bytes::Bytes;
use std::sync::Arc;

use auditlog_restore_core::snapshot::metadata_prefix;
use auditlog_restore_core::{
    Error, MemoryRemote, RemoteCall, RemoteError, RestoreIssue, StorageBackend, SubsetStatus,
    Termination,
};

use super::common::*;

#[tokio::test]
async fn missing_remote_tool_stops_before_anything_else() {
    let storage = SnapshotFixture::with_subsets(&[JAN, FEB]).seed().await;
    let remote = Arc::new(MemoryRemote::new().with_live_schema_error(
        RemoteError::ToolUnavailable("bash: mysqldump: command not found".to_string()),
    ));

    let report = engine(&storage, &remote).run().await.unwrap();

    assert_eq!(remote.calls(), vec![RemoteCall::FetchLiveSchema]);
    assert_eq!(report.termination, Termination::ToolUnavailable);
    assert!(report.issues[0].is_fatal());
    assert!(report.subsets.is_empty());
    // a skip, not a failure
    assert!(!report.is_failure());
}

#[tokio::test]
async fn live_metadata_failure_after_schema_restore() {
    let storage = SnapshotFixture::with_subsets(&[JAN, FEB]).seed().await;
    let remote = Arc::new(
        MemoryRemote::new()
            .with_live_schema(live_schema_changed())
            .with_live_metadata_error(RemoteError::CommandFailed {
                exit_code: Some(1),
                stderr: "ERROR 2013 (HY000): Lost connection to MySQL server during query"
                    .to_string(),
            }),
    );

    let report = engine(&storage, &remote).run().await.unwrap();

    assert_eq!(report.termination, Termination::LiveMetadataUnavailable);
    assert!(report.is_failure());
    assert!(report.schema_replaced);
    assert_eq!(imported_stems(&remote), vec!["schema"]);
    assert!(report.subsets.is_empty());
    // the schema dump was staged, so it is released
    assert_eq!(remote.calls().last(), Some(&RemoteCall::ReleaseStaging));
    assert!(!remote.has_staged());
}

#[tokio::test]
async fn purge_failure_still_imports() {
    let storage = SnapshotFixture::with_subsets(&[JAN, FEB]).seed().await;
    let remote = Arc::new(
        MemoryRemote::new()
            .with_live_schema(live_schema_unchanged())
            .with_live_metadata("2024-01 99 1 100\n")
            .fail_purge("2024-01"),
    );

    let report = engine(&storage, &remote).run().await.unwrap();

    assert_eq!(imported_stems(&remote), vec!["2024-01", "2024-02"]);
    let jan = &report.subsets[0];
    assert!(jan.purge_attempted);
    assert!(!jan.purged);
    assert_eq!(jan.status, SubsetStatus::Restored);
    assert!(report.subsets[1].purged);
    assert_eq!(
        report.issues.iter().filter_map(|i| i.subset_id()).collect::<Vec<_>>(),
        vec!["2024-01"]
    );
    assert!(matches!(report.issues[0], RestoreIssue::PurgeFailed { .. }));
    assert_eq!(report.termination, Termination::Completed);
}

#[tokio::test]
async fn missing_artifact_skips_only_that_subset() {
    let storage = SnapshotFixture::with_subsets(&[JAN, FEB, MAR])
        .without_artifact("2024-02")
        .seed()
        .await;
    let remote = Arc::new(
        MemoryRemote::new()
            .with_live_schema(live_schema_unchanged())
            .with_live_metadata("2023-12 10 1 10\n"),
    );

    let report = engine(&storage, &remote).run().await.unwrap();

    assert_eq!(imported_stems(&remote), vec!["2024-01", "2024-03"]);
    assert_eq!(report.subsets[1].status, SubsetStatus::ArtifactMissing);
    assert_eq!(
        report.issues,
        vec![RestoreIssue::ArtifactMissing {
            subset_id: "2024-02".to_string()
        }]
    );
    // the purge is issued before the artifact is looked up
    assert!(remote
        .calls()
        .contains(&RemoteCall::Purge(FEB.to_string())));
    assert!(!remote
        .calls()
        .contains(&RemoteCall::Transfer("2024-02".to_string())));
}

#[tokio::test]
async fn failed_import_continues_with_next_subset() {
    let storage = SnapshotFixture::with_subsets(&[JAN, FEB]).seed().await;
    let remote = Arc::new(
        MemoryRemote::new()
            .with_live_schema(live_schema_unchanged())
            .with_live_metadata("")
            .fail_import("2024-01"),
    );

    let report = engine(&storage, &remote).run().await.unwrap();

    assert_eq!(report.subsets[0].status, SubsetStatus::Failed);
    assert_eq!(report.subsets[1].status, SubsetStatus::Restored);
    assert_eq!(report.failed_count(), 1);
    assert!(matches!(
        &report.issues[0],
        RestoreIssue::TransferOrImportFailed { subset_id, .. } if subset_id == "2024-01"
    ));
    assert_eq!(imported_stems(&remote), vec!["2024-02"]);
}

#[tokio::test]
async fn failed_transfer_still_releases_staging() {
    let storage = SnapshotFixture::with_subsets(&[JAN]).seed().await;
    let remote = Arc::new(
        MemoryRemote::new()
            .with_live_schema(live_schema_unchanged())
            .with_live_metadata("")
            .fail_transfer("2024-01"),
    );

    let report = engine(&storage, &remote).run().await.unwrap();

    assert_eq!(report.subsets[0].status, SubsetStatus::Failed);
    assert_eq!(
        remote.calls()[2..],
        [
            RemoteCall::Transfer("2024-01".to_string()),
            RemoteCall::ReleaseStaging,
        ]
    );
}

#[tokio::test]
async fn failed_schema_import_is_recorded_and_data_phase_runs() {
    let storage = SnapshotFixture::with_subsets(&[JAN]).seed().await;
    let remote = Arc::new(
        MemoryRemote::new()
            .with_live_schema(live_schema_changed())
            .with_live_metadata("")
            .fail_import("schema"),
    );

    let report = engine(&storage, &remote).run().await.unwrap();

    assert!(report.schema_replace_needed);
    assert!(!report.schema_replaced);
    assert!(matches!(
        report.issues[0],
        RestoreIssue::SchemaRestoreFailed { .. }
    ));
    assert_eq!(imported_stems(&remote), vec!["2024-01"]);
    assert_eq!(report.termination, Termination::Completed);
}

#[tokio::test]
async fn snapshot_without_schema_dump_is_an_error() {
    let storage = SnapshotFixture::with_subsets(&[JAN])
        .without_schema()
        .seed()
        .await;
    let remote = Arc::new(MemoryRemote::new().with_live_schema(live_schema_unchanged()));

    let result = engine(&storage, &remote).run().await;

    assert!(matches!(result, Err(Error::SnapshotNotFound(_))));
    assert_eq!(remote.calls(), vec![RemoteCall::FetchLiveSchema]);
}

#[tokio::test]
async fn undecodable_live_metadata_is_unavailable() {
    let storage = SnapshotFixture::with_subsets(&[JAN]).seed().await;
    let remote = Arc::new(
        MemoryRemote::new()
            .with_live_schema(live_schema_unchanged())
            .with_live_metadata_bytes(b"2024-01 10 1 \xfe\n"),
    );

    let report = engine(&storage, &remote).run().await.unwrap();

    assert_eq!(report.termination, Termination::LiveMetadataUnavailable);
    assert!(matches!(
        report.issues[0],
        RestoreIssue::LiveMetadataUnavailable { .. }
    ));
    assert!(remote.imported().is_empty());
}

#[tokio::test]
async fn undecodable_snapshot_metadata_is_an_error() {
    let storage = SnapshotFixture::with_subsets(&[]).seed().await;
    storage
        .put(
            &format!("{}/audit_log.meta", metadata_prefix(SNAPSHOT_ID)),
            Bytes::from_static(b"2024-01 10 1 \xff\n"),
        )
        .await
        .unwrap();
    let remote = Arc::new(
        MemoryRemote::new()
            .with_live_schema(live_schema_unchanged())
            .with_live_metadata_bytes(b"2024-01 10 1 \xfe\n"),
    );

    let result = engine(&storage, &remote).run().await;

    assert!(matches!(result, Err(Error::Serialization(_))));
    assert_eq!(remote.calls(), vec![RemoteCall::FetchLiveSchema]);
}
