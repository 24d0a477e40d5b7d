use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "auditlog-restore")]
#[command(about = "Incremental audit-log table restore tool", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a restore operation
    Restore {
        /// Path to the configuration file
        #[arg(short, long)]
        config: String,
    },

    /// Show what a restore would do (dry-run)
    Plan {
        /// Path to the restore configuration file
        #[arg(short, long)]
        config: String,

        /// Output format (text, json, yaml)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// List available snapshots
    List {
        /// Storage location (path, file:// or memory:// URL)
        #[arg(short, long)]
        path: String,
    },

    /// Show a snapshot's metadata and artifacts
    Describe {
        /// Storage location (path, file:// or memory:// URL)
        #[arg(short, long)]
        path: String,

        /// Snapshot ID to describe
        #[arg(short, long)]
        snapshot_id: String,

        /// Output format (text, json, yaml)
        #[arg(short, long, default_value = "text")]
        format: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Priority: RUST_LOG env var > verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match cli.verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();

    match cli.command {
        Commands::Restore { config } => {
            commands::restore::run(&config).await?;
        }
        Commands::Plan { config, format } => {
            commands::plan::run(&config, &format).await?;
        }
        Commands::List { path } => {
            commands::list::run(&path).await?;
        }
        Commands::Describe {
            path,
            snapshot_id,
            format,
        } => {
            commands::describe::run(&path, &snapshot_id, &format).await?;
        }
    }

    Ok(())
}
