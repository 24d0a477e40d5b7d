use anyhow::Result;
use auditlog_restore_core::{Config, RestoreEngine, RestoreReport, SubsetStatus};
use tracing::info;

use super::{format_timestamp, OutputFormat};

pub async fn run(config_path: &str, format: &str) -> Result<()> {
    let mut config = Config::from_yaml_file(config_path.as_ref())?;

    // Force dry-run mode
    if let Some(ref mut restore) = config.restore {
        restore.dry_run = true;
    } else {
        config.restore = Some(auditlog_restore_core::RestoreOptions {
            dry_run: true,
            ..Default::default()
        });
    }

    info!("Planning restore from configuration: {}", config_path);

    let engine = RestoreEngine::new(config)?;
    let report = engine.dry_run().await?;

    match OutputFormat::from(format) {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(&report)?);
        }
        OutputFormat::Text => {
            print_plan(&report);
        }
    }

    if report.issues.iter().any(|i| i.is_fatal()) {
        std::process::exit(1);
    }

    Ok(())
}

fn print_plan(report: &RestoreReport) {
    println!("╔══════════════════════════════════════════════════════════════════════╗");
    println!("║                           RESTORE PLAN                               ║");
    println!("╠══════════════════════════════════════════════════════════════════════╣");
    println!("║ Snapshot:       {:55} ║", report.snapshot_id);
    println!("║ Host:           {:55} ║", report.host);
    println!("║ Planned at:     {:55} ║", format_timestamp(report.start_time));

    let schema = if report.schema_replace_needed {
        "drop and recreate"
    } else {
        "unchanged"
    };
    println!("║ Schema:         {:55} ║", schema);
    println!(
        "║ Purge first:    {:55} ║",
        if report.skip_purge { "no (live table empty)" } else { "yes" }
    );
    println!("║ In sync:        {:55} ║", report.subsets_in_sync);
    println!("║ To restore:     {:55} ║", report.subsets.len());

    if !report.subsets.is_empty() {
        println!("╠══════════════════════════════════════════════════════════════════════╣");
        println!("║                        SUBSETS TO RESTORE                            ║");
        println!("╠══════════════════════════════════════════════════════════════════════╣");
        for subset in &report.subsets {
            let marker = match subset.status {
                SubsetStatus::Planned => "•",
                _ => "✗",
            };
            println!("║ {} {:68} ║", marker, subset.metadata);
        }
    }

    if !report.subsets_excluded.is_empty() {
        println!("╠══════════════════════════════════════════════════════════════════════╣");
        println!("║                       EXCLUDED BY SELECTION                          ║");
        println!("╠══════════════════════════════════════════════════════════════════════╣");
        for id in &report.subsets_excluded {
            println!("║ - {:68} ║", id);
        }
    }

    if !report.issues.is_empty() {
        println!("╠══════════════════════════════════════════════════════════════════════╣");
        println!("║                             ISSUES                                   ║");
        println!("╠══════════════════════════════════════════════════════════════════════╣");
        for issue in &report.issues {
            println!("║ ⚠ {:68} ║", issue.to_string());
        }
    }

    println!("╚══════════════════════════════════════════════════════════════════════╝");
}
