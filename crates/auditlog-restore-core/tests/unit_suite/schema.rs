//! Schema normalization and rewrite tests.

use auditlog_restore_core::schema::{inject_drop_table, normalize, schema_changed};
use auditlog_restore_core::RemoteError;

use super::helpers::schema_dump;

// ============================================================================
// Normalization
// ============================================================================

#[test]
fn counter_and_dump_date_do_not_count_as_changes() {
    let live = schema_dump("audit_log", Some(35236), "2024-09-01 02:00:01");
    let snapshot = schema_dump("audit_log", Some(18232), "2024-03-01 02:00:01");
    assert_eq!(normalize(&live), normalize(&snapshot));
    assert!(!schema_changed(Ok(live.as_str()), &snapshot));
}

#[test]
fn empty_table_dump_matches_populated_one() {
    let live = schema_dump("audit_log", None, "2024-09-01 02:00:01");
    let snapshot = schema_dump("audit_log", Some(18232), "2024-03-01 02:00:01");
    assert!(!schema_changed(Ok(live.as_str()), &snapshot));
}

#[test]
fn normalize_is_idempotent() {
    let dump = schema_dump("audit_log", Some(7), "2024-03-01 02:00:01");
    let once = normalize(&dump);
    assert_eq!(normalize(&once), once);
}

#[test]
fn structural_change_is_detected() {
    let snapshot = schema_dump("audit_log", Some(10), "2024-03-01 02:00:01");
    let live = snapshot.replace("`actor` varchar(64)", "`actor` varchar(255)");
    assert!(schema_changed(Ok(live.as_str()), &snapshot));
}

#[test]
fn fetch_failure_forces_schema_restore() {
    let snapshot = schema_dump("audit_log", Some(10), "2024-03-01 02:00:01");
    let errors = [
        RemoteError::Transport("timed out".to_string()),
        RemoteError::CommandFailed {
            exit_code: Some(2),
            stderr: "mysqldump: Got error: 1045".to_string(),
        },
    ];
    for error in &errors {
        assert!(schema_changed(Err(error), &snapshot));
    }
}

// ============================================================================
// Drop statement injection
// ============================================================================

#[test]
fn drop_follows_charset_line() {
    let dump = schema_dump("audit_log", Some(10), "2024-03-01 02:00:01");
    let rewritten = inject_drop_table(&dump, "audit_log");
    let lines: Vec<&str> = rewritten.lines().collect();

    let drop = lines
        .iter()
        .position(|l| *l == "DROP TABLE IF EXISTS `audit_log`;")
        .unwrap();
    assert_eq!(lines[drop - 1], "/*!50503 SET character_set_client = utf8mb4 */;");
    assert!(lines[drop + 1].starts_with("CREATE TABLE `audit_log`"));
    assert_eq!(rewritten.matches("DROP TABLE").count(), 1);
}

#[test]
fn drop_without_charset_line_precedes_create() {
    let dump = "CREATE TABLE `audit_log` (\n  `id` bigint\n);\n";
    let rewritten = inject_drop_table(dump, "audit_log");
    assert!(rewritten.starts_with("DROP TABLE IF EXISTS `audit_log`;\nCREATE TABLE"));
}

#[test]
fn rewrite_leaves_rest_of_dump_intact() {
    let dump = schema_dump("audit_log", Some(10), "2024-03-01 02:00:01");
    let rewritten = inject_drop_table(&dump, "audit_log");
    let without_drop: String = rewritten
        .lines()
        .filter(|l| !l.starts_with("DROP TABLE"))
        .map(|l| format!("{}\n", l))
        .collect();
    assert_eq!(without_drop, dump);
}
