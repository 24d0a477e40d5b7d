//! Metadata record parsing tests.

use auditlog_restore_core::metadata::NO_DATA_SENTINEL;
use auditlog_restore_core::{MetadataRecord, MetadataSet};

use super::helpers::{metadata_set, record};

#[test]
fn subset_id_is_first_token() {
    let r = record("2024-01 18231 1 18231");
    assert_eq!(r.subset_id(), "2024-01");
    assert_eq!(r.as_str(), "2024-01 18231 1 18231");
}

#[test]
fn tab_separated_lines_are_accepted() {
    let r = record("2024-01\t18231\t1\t18231");
    assert_eq!(r.subset_id(), "2024-01");
    let stats = r.stats().unwrap();
    assert_eq!(stats.count, 18231);
    assert_eq!(stats.max_id, 18231);
}

#[test]
fn blank_and_sentinel_lines_are_skipped() {
    assert!(MetadataRecord::parse("").is_none());
    assert!(MetadataRecord::parse("   ").is_none());
    assert!(MetadataRecord::parse(NO_DATA_SENTINEL).is_none());
    assert!(MetadataRecord::parse("NULL 0 NULL NULL").is_none());
}

#[test]
fn parse_blob_keeps_order() {
    let set = MetadataSet::parse("2024-02 5 6 10\n\n2024-01 5 1 5\nNULL\n");
    assert_eq!(set.subset_ids(), vec!["2024-02", "2024-01"]);
}

#[test]
fn carriage_returns_are_not_part_of_the_record() {
    let set = MetadataSet::parse("2024-01 5 1 5\r\n2024-02 5 6 10\r\n");
    assert!(set.contains_exact(&record("2024-01 5 1 5")));
    assert!(set.contains_exact(&record("2024-02 5 6 10")));
}

#[test]
fn duplicate_subset_keeps_first() {
    let set = metadata_set(&["2024-01 5 1 5", "2024-01 6 1 6"]);
    assert_eq!(set.len(), 1);
    assert_eq!(set.get("2024-01").unwrap().as_str(), "2024-01 5 1 5");
}

#[test]
fn stats_absent_for_non_numeric_fields() {
    assert!(record("2024-01").stats().is_none());
    assert!(record("2024-01 many 1 5").stats().is_none());
}

#[test]
fn records_compare_on_whole_line() {
    let a = record("2024-01 5 1 5");
    let b = record("2024-01  5 1 5");
    assert_eq!(a.subset_id(), b.subset_id());
    assert!(!a.in_sync_with(&b));
}
