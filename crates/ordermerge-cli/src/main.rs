mod output;
mod pipeline;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "ordermerge")]
#[command(about = "Merge order exports with a Shopify product-variant snapshot")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Export variants from Shopify, then merge the order exports against them
    Run {
        #[command(flatten)]
        merge: MergeArgs,

        /// Also write the variant snapshot as a `sku,id` CSV for inspection
        #[arg(long)]
        snapshot_csv: Option<PathBuf>,
    },
    /// Export variants from Shopify and stop after decoding the snapshot
    Snapshot {
        /// Also write the variant snapshot as a `sku,id` CSV for inspection
        #[arg(long)]
        snapshot_csv: Option<PathBuf>,
    },
    /// Merge the order exports against a snapshot already on disk
    Merge {
        #[command(flatten)]
        merge: MergeArgs,

        /// Snapshot file: a bulk-operation `.jsonl` artifact or a `sku,id` CSV
        #[arg(long)]
        snapshot: PathBuf,
    },
}

#[derive(Debug, Args)]
struct MergeArgs {
    /// Order-header CSV export
    #[arg(long)]
    orders: PathBuf,

    /// Order-item CSV export
    #[arg(long)]
    items: PathBuf,

    /// Destination of the merged JSON document
    #[arg(long)]
    output: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(ordermerge_core::log_level_from_env()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();
    let interrupted = Arc::new(AtomicBool::new(false));

    tokio::select! {
        biased;
        result = dispatch(cli.command, Arc::clone(&interrupted)) => result,
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for ctrl-c")?;
            interrupted.store(true, Ordering::SeqCst);
            tracing::warn!("interrupted; no output written");
            anyhow::bail!("interrupted before completion")
        }
    }
}

async fn dispatch(command: Commands, interrupted: Arc<AtomicBool>) -> anyhow::Result<()> {
    match command {
        Commands::Run {
            merge,
            snapshot_csv,
        } => {
            let config = load_config()?;
            let (_, table) = pipeline::fetch_snapshot(&config, snapshot_csv).await?;
            pipeline::merge_exports(merge, table, interrupted).await?;
        }
        Commands::Snapshot { snapshot_csv } => {
            let config = load_config()?;
            let (artifact, table) = pipeline::fetch_snapshot(&config, snapshot_csv).await?;
            println!("{} ({} SKUs)", artifact.display(), table.len());
        }
        Commands::Merge { merge, snapshot } => {
            let table = pipeline::run_blocking(move || {
                ordermerge_bulk::load_snapshot(&snapshot)
                    .with_context(|| format!("failed to load snapshot {}", snapshot.display()))
            })
            .await?;
            pipeline::merge_exports(merge, table, interrupted).await?;
        }
    }

    Ok(())
}

fn load_config() -> anyhow::Result<ordermerge_core::AppConfig> {
    let config = ordermerge_core::load_app_config().context("failed to load configuration")?;
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}
