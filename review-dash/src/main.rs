//! review-dash - read-only dashboard for the review pipeline aggregates
//!
//! Serves a page with summary tiles, filter controls, charts and previews
//! built from the city and state aggregate collections.

use anyhow::{Context, Result};
use clap::Parser;
use review_common::PipelineConfig;
use review_dash::{build_router, AppState};
use std::path::PathBuf;
use tokio::signal;
use tracing::{error, info};

/// Command-line arguments for review-dash
#[derive(Parser, Debug)]
#[command(name = "review-dash")]
#[command(about = "Dashboard for review pipeline aggregates")]
#[command(version)]
struct Args {
    /// Pipeline config file (TOML)
    #[arg(short, long, env = "REVIEW_PIPELINE_CONFIG")]
    config: Option<PathBuf>,

    /// Address to bind (overrides dashboard.host from config)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides dashboard.port from config)
    #[arg(short, long, env = "REVIEW_DASH_PORT")]
    port: Option<u16>,
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

    info!("Starting review-dash v{}", env!("CARGO_PKG_VERSION"));
    info!("Database path: {}", config.database_path.display());

    let pool = match review_dash::db::connect_readonly(&config.database_path).await {
        Ok(pool) => {
            info!("Connected to database (read-only)");
            pool
        }
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(e);
        }
    };

    let state = AppState::new(pool, config.collections.clone());
    let app = build_router(state);

    let host = args.host.unwrap_or(config.dashboard.host);
    let port = args.port.unwrap_or(config.dashboard.port);
    let addr = format!("{}:{}", host, port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("review-dash listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("Failed to install signal handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}
