use anyhow::Result;
use auditlog_restore_core::{MetadataSet, Snapshot};
use serde::Serialize;
use tracing::info;

use super::{open_storage, OutputFormat};

#[derive(Serialize)]
struct SnapshotDescription {
    snapshot_id: String,
    subsets: Vec<SubsetDescription>,
}

#[derive(Serialize)]
struct SubsetDescription {
    subset_id: String,
    metadata: String,
    count: Option<u64>,
    min_id: Option<i64>,
    max_id: Option<i64>,
    has_artifact: bool,
}

pub async fn run(path: &str, snapshot_id: &str, format: &str) -> Result<()> {
    let storage = open_storage(path)?;
    let snapshot = Snapshot::new(storage, snapshot_id);

    info!("Loading snapshot metadata: {}", snapshot_id);
    let metadata = match snapshot.read_metadata().await? {
        Some(text) => MetadataSet::parse(&text),
        None => MetadataSet::new(),
    };

    let mut subsets = Vec::with_capacity(metadata.len());
    for record in &metadata {
        let stats = record.stats();
        subsets.push(SubsetDescription {
            subset_id: record.subset_id().to_string(),
            metadata: record.as_str().to_string(),
            count: stats.map(|s| s.count),
            min_id: stats.map(|s| s.min_id),
            max_id: stats.map(|s| s.max_id),
            has_artifact: snapshot.has_artifact(record.subset_id()).await?,
        });
    }

    let description = SnapshotDescription {
        snapshot_id: snapshot_id.to_string(),
        subsets,
    };

    match OutputFormat::from(format) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&description)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&description)?);
        }
        OutputFormat::Text => {
            print_description_text(&description);
        }
    }

    Ok(())
}

fn print_description_text(description: &SnapshotDescription) {
    println!("╔══════════════════════════════════════════════════════════════════════╗");
    println!("║                            SNAPSHOT                                  ║");
    println!("╠══════════════════════════════════════════════════════════════════════╣");
    println!("║ Snapshot ID:    {:55} ║", description.snapshot_id);
    println!("║ Subsets:        {:55} ║", description.subsets.len());

    let total_rows: u64 = description.subsets.iter().filter_map(|s| s.count).sum();
    println!("║ Total Rows:     {:55} ║", total_rows);

    let missing = description.subsets.iter().filter(|s| !s.has_artifact).count();
    if missing > 0 {
        println!("║ Missing data:   {:55} ║", missing);
    }

    if !description.subsets.is_empty() {
        println!("╠══════════════════════════════════════════════════════════════════════╣");
        println!("║                             SUBSETS                                  ║");
        println!("╠══════════════════════════════════════════════════════════════════════╣");
        for subset in &description.subsets {
            let marker = if subset.has_artifact { "✓" } else { "✗" };
            match (subset.count, subset.min_id, subset.max_id) {
                (Some(count), Some(min), Some(max)) => println!(
                    "║ {} {}: {} rows, ids {}-{} ║",
                    marker, subset.subset_id, count, min, max
                ),
                _ => println!("║ {} {:68} ║", marker, subset.metadata),
            }
        }
    }

    println!("╚══════════════════════════════════════════════════════════════════════╝");
}
