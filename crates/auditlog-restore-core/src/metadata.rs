//! Subset metadata records.
//!
//! Both the snapshot and the live instance describe their contents as one text
//! line per subset ("month"):
//!
//! ```text
//! 2024-01 18231 1 18231
//! 2024-02 17004 18232 35235
//! ```
//!
//! The first whitespace-delimited token is the subset id. The remaining fields
//! (entry count, minimum id, maximum id) are informational: two records are
//! in sync only when their whole lines are identical, so any drift in the
//! counters forces a re-import of that subset.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

/// Marker emitted by the live query for a subset without rows.
pub const NO_DATA_SENTINEL: &str = "NULL";

/// One metadata line describing a stored subset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataRecord {
    raw: String,
}

/// Descriptive counters parsed from a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubsetStats {
    /// Number of entries in the subset
    pub count: u64,
    /// Smallest row id in the subset
    pub min_id: i64,
    /// Largest row id in the subset
    pub max_id: i64,
}

impl MetadataRecord {
    /// Build a record from a single line.
    ///
    /// Returns `None` for blank lines and the no-data sentinel.
    pub fn parse(line: &str) -> Option<Self> {
        let line = line.strip_suffix('\r').unwrap_or(line);
        let subset = line.split_whitespace().next()?;
        if subset == NO_DATA_SENTINEL {
            return None;
        }
        Some(Self {
            raw: line.to_string(),
        })
    }

    /// Subset identifier (first whitespace-delimited token).
    pub fn subset_id(&self) -> &str {
        self.raw.split_whitespace().next().unwrap_or_default()
    }

    /// The full line as stored.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Exact line comparison.
    pub fn in_sync_with(&self, other: &MetadataRecord) -> bool {
        self.raw == other.raw
    }

    /// Counters for this subset, when the line carries them.
    pub fn stats(&self) -> Option<SubsetStats> {
        let mut fields = self.raw.split_whitespace().skip(1);
        let count = fields.next()?.parse().ok()?;
        let min_id = fields.next()?.parse().ok()?;
        let max_id = fields.next()?.parse().ok()?;
        Some(SubsetStats {
            count,
            min_id,
            max_id,
        })
    }
}

impl fmt::Display for MetadataRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Ordered collection of records, at most one per subset id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataSet {
    records: Vec<MetadataRecord>,
}

impl MetadataSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a multi-line blob, dropping blank and sentinel lines.
    pub fn parse(text: &str) -> Self {
        text.lines().filter_map(MetadataRecord::parse).collect()
    }

    /// Append a record. A record whose subset id is already present is dropped.
    pub fn push(&mut self, record: MetadataRecord) -> bool {
        if self.get(record.subset_id()).is_some() {
            warn!(
                "Ignoring duplicate metadata record for subset {}: {}",
                record.subset_id(),
                record
            );
            return false;
        }
        self.records.push(record);
        true
    }

    /// Look up a record by subset id
    pub fn get(&self, subset_id: &str) -> Option<&MetadataRecord> {
        self.records.iter().find(|r| r.subset_id() == subset_id)
    }

    /// Whether an identical line is present.
    pub fn contains_exact(&self, record: &MetadataRecord) -> bool {
        self.records.iter().any(|r| r.in_sync_with(record))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MetadataRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Subset ids in set order
    pub fn subset_ids(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.subset_id()).collect()
    }

    /// Raw lines, for fast exact-match lookups.
    pub(crate) fn line_index(&self) -> HashSet<&str> {
        self.records.iter().map(|r| r.as_str()).collect()
    }
}

impl FromIterator<MetadataRecord> for MetadataSet {
    fn from_iter<I: IntoIterator<Item = MetadataRecord>>(iter: I) -> Self {
        let mut set = MetadataSet::new();
        for record in iter {
            set.push(record);
        }
        set
    }
}

impl<'a> IntoIterator for &'a MetadataSet {
    type Item = &'a MetadataRecord;
    type IntoIter = std::slice::Iter<'a, MetadataRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
