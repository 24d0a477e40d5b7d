use anyhow::Result;
use auditlog_restore_core::list_snapshots;
use tracing::info;

use super::open_storage;

pub async fn run(path: &str) -> Result<()> {
    let storage = open_storage(path)?;

    info!("Listing snapshots in: {}", path);
    let snapshot_ids = list_snapshots(storage.as_ref()).await?;

    if snapshot_ids.is_empty() {
        println!("No snapshots found in {}", path);
    } else {
        println!("Available snapshots:");
        for id in snapshot_ids {
            println!("  - {}", id);
        }
    }

    Ok(())
}
