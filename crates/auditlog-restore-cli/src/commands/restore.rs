use anyhow::Result;
use auditlog_restore_core::{Config, RestoreEngine, SubsetStatus, Termination};
use tracing::{info, warn};

use super::format_bytes;

pub async fn run(config_path: &str) -> Result<()> {
    info!("Loading configuration from: {}", config_path);

    let config = Config::from_yaml_file(config_path.as_ref())?;

    info!("Starting restore from snapshot: {}", config.snapshot_id);

    let engine = RestoreEngine::new(config)?;
    let report = engine.run().await?;

    println!("Snapshot:        {}", report.snapshot_id);
    println!("Host:            {}", report.host);
    println!("Outcome:         {:?}", report.termination);
    println!(
        "Schema:          {}",
        match (report.schema_replace_needed, report.schema_replaced) {
            (false, _) => "unchanged",
            (true, true) => "replaced",
            (true, false) => "replace FAILED",
        }
    );
    println!("In sync:         {}", report.subsets_in_sync);
    println!("Restored:        {}", report.restored_count());
    println!("Not restored:    {}", report.failed_count());
    println!("Bytes imported:  {}", format_bytes(report.bytes_restored));
    println!("Duration:        {} ms", report.duration_ms);

    for subset in &report.subsets {
        if subset.status != SubsetStatus::Restored {
            println!("  ✗ {} ({:?})", subset.subset_id, subset.status);
        }
    }
    for issue in &report.issues {
        warn!("{}", issue);
    }

    if report.is_failure() {
        std::process::exit(1);
    }

    if report.termination == Termination::Completed {
        info!("Restore completed successfully");
    } else {
        info!("Restore skipped: {:?}", report.termination);
    }
    Ok(())
}
