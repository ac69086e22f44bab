use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use zfs_volume_snapshots::{
    driver_config::DriverConfig, Filesystem, SnapshotName, TokioProcessReactor, Zfs, ZfsSnapshots,
};

/// Snapshot a filesystem, naming the snapshot after the current time and this node
#[derive(Parser)]
pub struct CreateCommand {
    #[arg(short, long)]
    pool: String,
    /// Leave out to snapshot the root dataset of the pool
    #[arg(short, long)]
    dataset: Option<String>,
    /// Defaults to `node` from the config
    #[arg(short, long)]
    node: Option<String>,
}

fn resolve_node(node: Option<String>, config: &DriverConfig) -> anyhow::Result<String> {
    node.or_else(|| config.node.clone())
        .context("No node given. Pass --node or set `node` in the config.")
}

pub async fn create_command(
    CreateCommand {
        pool,
        dataset,
        node,
    }: CreateCommand,
    config: &DriverConfig,
) -> anyhow::Result<()> {
    let node = resolve_node(node, config)?;
    let snapshots = ZfsSnapshots::new(
        Zfs::with_executable(TokioProcessReactor, &config.zfs_executable),
        Filesystem::new(pool, dataset),
    );
    let name = SnapshotName::new(Utc::now(), node);
    snapshots
        .create(&name)
        .await
        .with_context(|| format!("Failed to snapshot {}", snapshots.filesystem()))?;
    tracing::info!(filesystem = %snapshots.filesystem(), snapshot = %name, "took snapshot");
    println!("{}@{name}", snapshots.filesystem());
    Ok(())
}
