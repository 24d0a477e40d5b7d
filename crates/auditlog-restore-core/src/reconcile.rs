//! Snapshot vs. live metadata reconciliation.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{RemoteError, RestoreIssue};
use crate::metadata::{MetadataRecord, MetadataSet};

/// Subsets that need restoring, in snapshot order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reconciliation {
    /// Snapshot records without an identical live record
    pub out_of_sync: Vec<MetadataRecord>,
    /// The live table holds nothing, so nothing can collide on import
    pub skip_purge: bool,
}

impl Reconciliation {
    pub fn is_in_sync(&self) -> bool {
        self.out_of_sync.is_empty()
    }
}

/// Compare snapshot metadata with what the live instance reports.
///
/// A live set with no usable records means the whole snapshot is restored
/// and purging is skipped.
pub fn compute_out_of_sync(
    snapshot: &MetadataSet,
    live: Result<&MetadataSet, &RemoteError>,
) -> Result<Reconciliation, RestoreIssue> {
    let live = live.map_err(|e| RestoreIssue::LiveMetadataUnavailable {
        reason: e.to_string(),
    })?;

    if live.is_empty() {
        debug!(
            "Live instance reports no subsets, all {} snapshot subsets out of sync",
            snapshot.len()
        );
        return Ok(Reconciliation {
            out_of_sync: snapshot.iter().cloned().collect(),
            skip_purge: true,
        });
    }

    let live_lines = live.line_index();
    let out_of_sync: Vec<MetadataRecord> = snapshot
        .iter()
        .filter(|record| {
            let in_sync = live_lines.contains(record.as_str());
            if in_sync {
                debug!("Subset {} in sync", record.subset_id());
            }
            !in_sync
        })
        .cloned()
        .collect();

    Ok(Reconciliation {
        out_of_sync,
        skip_purge: false,
    })
}
