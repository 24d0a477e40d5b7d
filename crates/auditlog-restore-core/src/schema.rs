//! Schema dump normalization and rewriting.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::RemoteError;

static AUTO_INCREMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*AUTO_INCREMENT=\d+").expect("static regex"));

/// Strip content from a schema dump that does not affect table structure.
///
/// Removes comment lines (`--` and `/*`), blank lines and `AUTO_INCREMENT=<n>`
/// clauses. The leading whitespace of the clause goes with it so that a dump
/// of an empty table compares equal to one with rows.
pub fn normalize(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for line in raw.lines() {
        let trimmed = line.trim_start();
        if trimmed.is_empty() || trimmed.starts_with("--") || trimmed.starts_with("/*") {
            continue;
        }
        out.push_str(&AUTO_INCREMENT.replace_all(line.trim_end(), ""));
        out.push('\n');
    }
    out
}

/// Decide whether the live schema differs from the snapshot's.
///
/// A failed fetch counts as changed.
pub fn schema_changed(live: Result<&str, &RemoteError>, snapshot: &str) -> bool {
    match live {
        Ok(live) => normalize(live) != normalize(snapshot),
        Err(_) => true,
    }
}

/// Insert `DROP TABLE IF EXISTS` into a schema dump.
///
/// The statement goes right after the line that sets the client character set
/// for the table definition. Without that line it goes before the first
/// `CREATE TABLE`, and without either at the top of the dump.
pub fn inject_drop_table(dump: &str, table: &str) -> String {
    let drop = format!("DROP TABLE IF EXISTS `{}`;", table.replace('`', "``"));
    let lines: Vec<&str> = dump.lines().collect();

    let (index, after) = match lines.iter().position(|l| is_charset_anchor(l)) {
        Some(i) => (i + 1, true),
        None => match lines
            .iter()
            .position(|l| l.trim_start().to_ascii_uppercase().starts_with("CREATE TABLE"))
        {
            Some(i) => (i, false),
            None => (0, false),
        },
    };
    tracing::debug!(
        "Injecting drop statement at line {} ({})",
        index,
        if after { "after charset anchor" } else { "fallback" }
    );

    let mut out = String::with_capacity(dump.len() + drop.len() + 1);
    for (i, line) in lines.iter().enumerate() {
        if i == index {
            out.push_str(&drop);
            out.push('\n');
        }
        out.push_str(line);
        out.push('\n');
    }
    if index >= lines.len() {
        out.push_str(&drop);
        out.push('\n');
    }
    out
}

fn is_charset_anchor(line: &str) -> bool {
    let compact: String = line.split_whitespace().collect::<Vec<_>>().join(" ");
    compact.contains("SET character_set_client =") && !compact.contains("@saved_cs_client")
}
