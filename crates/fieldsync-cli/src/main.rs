//! fieldsync CLI - Command-line interface for the field data sync client
//!
//! Provides commands for:
//! - Pulling remote data points into the local store
//! - Listing stored data points with ordering and filtering
//! - Inspecting per-group sync state

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod listener;
mod output;

use commands::{list::ListCommand, status::StatusCommand, sync::SyncCommand};
use fieldsync_core::config::Config;
use output::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "fieldsync", version, about = "Offline-first field data sync client")]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output (can be repeated: -v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Use alternate config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Synchronize a survey group with the remote server
    Sync(SyncCommand),
    /// List stored data points
    List(ListCommand),
    /// Show sync status for a survey group
    Status(StatusCommand),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config_path = cli.config.clone().unwrap_or_else(Config::default_path);
    let config = Config::load_or_default(&config_path);

    // Setup tracing: -v flags win, then RUST_LOG, then the config level
    let filter = match cli.verbose {
        0 => config.logging.level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .init();

    let format = OutputFormat::from_json_flag(cli.json);

    match cli.command {
        Commands::Sync(cmd) => cmd.execute(&config, format).await,
        Commands::List(cmd) => cmd.execute(&config, format).await,
        Commands::Status(cmd) => cmd.execute(&config, format).await,
    }
}
