use clap::Parser;
use zfs_volume_snapshots::{driver_config::DriverConfig, TokioProcessReactor, TracingZfsLogger, Zfs};

#[derive(Parser)]
pub struct SquashedCommand {
    /// Arguments to pass to zfs
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

pub async fn squashed_command(
    SquashedCommand { args }: SquashedCommand,
    config: &DriverConfig,
) -> anyhow::Result<()> {
    Zfs::with_executable(TokioProcessReactor, &config.zfs_executable)
        .command_squashed(args, TracingZfsLogger)
        .await;
    Ok(())
}
