//! Zettel users API - Main Entry Point

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;
use tracing::{info, warn};

use zettel_api::{build_router, AppState, UserRepository};
use zettel_common::init_logging;
use zettel_config::ConfigLoader;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log level, overriding the configuration file
    #[arg(short, long)]
    log_level: Option<String>,

    /// Address to listen on, overriding `api.bind_address`
    #[arg(short, long)]
    bind: Option<String>,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl-C");
    }
    info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ConfigLoader::load().context("Failed to load configuration")?,
    };
    if let Some(level) = &args.log_level {
        config.logging.level.clone_from(level);
    }
    let _guard = init_logging(&config.logging.to_logging_config())?;

    let users = UserRepository::connect(&config.api.database_path).await?;
    let app = build_router(AppState::new(users.clone()));

    let address = args.bind.unwrap_or_else(|| config.api.bind_address.clone());
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {address}"))?;
    info!(%address, database = users.database_path(), "Users API listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    users.close().await;
    Ok(())
}
