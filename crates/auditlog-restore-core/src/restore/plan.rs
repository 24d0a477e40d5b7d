//! Restore planning.

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::SubsetSelection;
use crate::metadata::{MetadataRecord, MetadataSet};
use crate::reconcile::Reconciliation;

/// What a restore run will do, derived fresh on every run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestorePlan {
    /// Drop and recreate the table before importing data
    pub schema_replace_needed: bool,

    /// The live table is empty; import without purging
    pub skip_purge: bool,

    /// Subsets to restore, in snapshot order
    pub subsets: Vec<MetadataRecord>,

    /// Subsets already in sync
    pub in_sync: usize,

    /// Out-of-sync subsets left out by the selection
    pub excluded: Vec<String>,
}

impl RestorePlan {
    /// Build a plan from a reconciliation result.
    pub fn build(
        schema_replace_needed: bool,
        snapshot: &MetadataSet,
        reconciliation: Reconciliation,
        selection: &SubsetSelection,
    ) -> Self {
        let out_of_sync = reconciliation.out_of_sync.len();
        let (subsets, excluded): (Vec<_>, Vec<_>) = reconciliation
            .out_of_sync
            .into_iter()
            .partition(|r| selection.matches(r.subset_id()));

        let plan = Self {
            schema_replace_needed,
            skip_purge: reconciliation.skip_purge,
            subsets,
            in_sync: snapshot.len().saturating_sub(out_of_sync),
            excluded: excluded
                .iter()
                .map(|r| r.subset_id().to_string())
                .collect(),
        };

        info!(
            "Restore plan: schema replace={}, skip purge={}, {} to restore, {} in sync, {} excluded",
            plan.schema_replace_needed,
            plan.skip_purge,
            plan.subsets.len(),
            plan.in_sync,
            plan.excluded.len()
        );

        plan
    }

    /// Plan used when the table is about to be dropped: the live side will be
    /// empty, so everything in the snapshot is restored without purging.
    pub fn full_restore(snapshot: &MetadataSet, selection: &SubsetSelection) -> Self {
        Self::build(
            true,
            snapshot,
            Reconciliation {
                out_of_sync: snapshot.iter().cloned().collect(),
                skip_purge: true,
            },
            selection,
        )
    }

    /// Whether subsets are purged before import
    pub fn purge_before_import(&self) -> bool {
        !self.skip_purge
    }

    /// Subset ids in restore order
    pub fn subset_ids(&self) -> Vec<&str> {
        self.subsets.iter().map(|r| r.subset_id()).collect()
    }

    /// Nothing to do
    pub fn is_noop(&self) -> bool {
        !self.schema_replace_needed && self.subsets.is_empty()
    }
}
