//! Zettel Telegram Bot - Main Entry Point

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use zettel_bot::{inspect, ZettelBot};
use zettel_common::init_logging;
use zettel_config::{Config, ConfigLoader};
use zettel_store::NoteStore;

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

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Run the bot (default)
    Run,
    /// Print the notes and links stored in the database
    Inspect,
}

fn load_config(args: &Args) -> Result<Config> {
    let mut config = match &args.config {
        Some(path) => ConfigLoader::load_from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => ConfigLoader::load().context("Failed to load configuration")?,
    };
    if let Some(level) = &args.log_level {
        config.logging.level.clone_from(level);
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    let config = load_config(&args)?;
    let _guard = init_logging(&config.logging.to_logging_config())?;

    match args.command.unwrap_or(Command::Run) {
        Command::Run => {
            info!(version = env!("CARGO_PKG_VERSION"), "Starting Zettel bot");

            let bot = ZettelBot::from_config(&config).await?;
            bot.run().await?;
        }
        Command::Inspect => {
            let store = NoteStore::connect(&config.database.path, 1).await?;
            inspect::write_report(&store, &mut std::io::stdout().lock()).await?;
            store.close().await;
        }
    }

    Ok(())
}
