//! SQL statements sent to the live instance.

use crate::config::TargetConfig;
use crate::metadata::MetadataRecord;

/// Query producing one metadata line per subset.
///
/// Output columns: subset id, row count, min id, max id. The snapshot's
/// metadata files are produced by the same query at backup time, so the lines
/// compare byte for byte when nothing changed.
pub fn metadata_query(target: &TargetConfig) -> String {
    format!(
        "SELECT {expr} AS subset, COUNT(*), MIN(`{id}`), MAX(`{id}`) FROM `{table}` GROUP BY subset ORDER BY subset;\n",
        expr = target.subset_expr,
        id = target.id_column,
        table = target.table,
    )
}

/// Statement deleting live rows of a subset.
///
/// Rows are matched by subset id, and also by the snapshot's id range when the
/// record carries one, so that rows whose ids would collide on import are gone
/// even if they were filed under another subset.
pub fn purge_statement(target: &TargetConfig, record: &MetadataRecord) -> String {
    let mut predicate = format!(
        "{expr} = '{subset}'",
        expr = target.subset_expr,
        subset = escape_literal(record.subset_id())
    );
    if let Some(stats) = record.stats() {
        predicate.push_str(&format!(
            " OR `{id}` BETWEEN {min} AND {max}",
            id = target.id_column,
            min = stats.min_id,
            max = stats.max_id
        ));
    }
    format!("DELETE FROM `{}` WHERE {};\n", target.table, predicate)
}

/// Escape a value for use inside a single-quoted SQL literal
pub fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "''")
}

/// Quote a word for a POSIX shell
pub fn shell_quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}
