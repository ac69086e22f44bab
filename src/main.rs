mod create_command;
mod list_command;
mod squashed_command;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use zfs_volume_snapshots::{driver_config::DriverConfig, get_config::get_config};

use crate::{
    create_command::{create_command, CreateCommand},
    list_command::{list_command, ListCommand},
    squashed_command::{squashed_command, SquashedCommand},
};

/// Takes and lists point-in-time snapshots of ZFS volumes.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// Path to a JSON file with config
    #[arg(short, long, global = true)]
    config_path: Option<PathBuf>,
    /// The `zfs` binary to run, overriding the config
    #[arg(long, global = true)]
    zfs: Option<String>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    Create(CreateCommand),
    List(ListCommand),
    /// Run a zfs command, logging instead of failing if it doesn't work
    Squashed(SquashedCommand),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let Cli {
        config_path,
        zfs,
        command,
    } = Cli::parse();
    let mut config = match config_path {
        Some(config_path) => get_config(&config_path)
            .await
            .with_context(|| format!("Failed to load config from {config_path:?}"))?,
        None => DriverConfig::default(),
    };
    if let Some(zfs) = zfs {
        config.zfs_executable = zfs;
    }

    match command {
        Command::Create(command) => create_command(command, &config).await,
        Command::List(command) => list_command(command, &config).await,
        Command::Squashed(command) => squashed_command(command, &config).await,
    }
}
