//! review-etl - batch pipeline stages for the review dataset
//!
//! Subcommands map to the pipeline stages; run them in order:
//! `ingest`, `clean`, `aggregate` (or `all` for the three in sequence).

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use review_common::db::open_store;
use review_common::PipelineConfig;
use std::path::PathBuf;
use tracing::info;

/// Command-line arguments for review-etl
#[derive(Parser, Debug)]
#[command(name = "review-etl")]
#[command(about = "Ingest, clean and aggregate business review records")]
#[command(version)]
struct Args {
    /// Pipeline config file (TOML)
    #[arg(short, long, env = "REVIEW_PIPELINE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Load the tabular input file into the raw collection
    Ingest {
        /// Input file (overrides data_path from config)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
    /// Validate raw records into the clean collection
    Clean,
    /// Compute city and state aggregates from the clean collection
    Aggregate,
    /// Run ingest, clean and aggregate in order
    All {
        /// Input file (overrides data_path from config)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (config, origin) = PipelineConfig::load(args.config.as_deref())
        .context("Failed to load pipeline configuration")?;

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level)),
        )
        .init();

    // Config is loaded before the subscriber exists; report it now
    origin.log();

    info!(
        "Starting review-etl v{} (database: {})",
        env!("CARGO_PKG_VERSION"),
        config.database_path.display()
    );

    let pool = open_store(&config.database_path, &config.collections)
        .await
        .context("Failed to open record store")?;

    match args.command {
        Command::Ingest { file } => {
            let data_path = file.unwrap_or_else(|| config.data_path.clone());
            review_etl::ingest::run(&pool, &config, &data_path)
                .await
                .with_context(|| format!("Ingestion of {} failed", data_path.display()))?;
        }
        Command::Clean => {
            review_etl::normalize::run(&pool, &config)
                .await
                .context("Normalization failed")?;
        }
        Command::Aggregate => {
            review_etl::aggregate::run(&pool, &config)
                .await
                .context("Aggregation failed")?;
        }
        Command::All { file } => {
            let data_path = file.unwrap_or_else(|| config.data_path.clone());
            review_etl::ingest::run(&pool, &config, &data_path)
                .await
                .with_context(|| format!("Ingestion of {} failed", data_path.display()))?;
            review_etl::normalize::run(&pool, &config)
                .await
                .context("Normalization failed")?;
            review_etl::aggregate::run(&pool, &config)
                .await
                .context("Aggregation failed")?;
        }
    }

    pool.close().await;
    Ok(())
}
