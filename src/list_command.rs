use anyhow::Context;
use clap::Parser;
use tabled::{Table, Tabled};
use zfs_volume_snapshots::{
    driver_config::DriverConfig, Filesystem, TokioProcessReactor, Zfs, ZfsSnapshots,
};

/// List the snapshots this driver took of a pool
#[derive(Parser)]
pub struct ListCommand {
    #[arg(short, long)]
    pool: String,
    #[arg(short, long)]
    dataset: Option<String>,
}

pub async fn list_command(
    ListCommand { pool, dataset }: ListCommand,
    config: &DriverConfig,
) -> anyhow::Result<()> {
    let snapshots = ZfsSnapshots::new(
        Zfs::with_executable(TokioProcessReactor, &config.zfs_executable),
        Filesystem::new(pool, dataset),
    );
    let names = snapshots
        .list()
        .await
        .with_context(|| format!("Failed to list snapshots of {}", snapshots.filesystem()))?;

    #[derive(Tabled)]
    struct TableRow<'a> {
        timestamp: String,
        node: &'a str,
    }

    if names.is_empty() {
        println!("No snapshots of {}", snapshots.filesystem().pool());
        return Ok(());
    }
    let rows = names.iter().map(|name| TableRow {
        timestamp: name.timestamp().to_rfc3339(),
        node: name.node(),
    });
    println!("{}", Table::new(rows));
    Ok(())
}
