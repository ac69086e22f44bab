pub mod command_error;
pub mod driver_config;
#[cfg(test)]
mod fake_process_reactor;
pub mod filesystem;
pub mod filesystem_snapshots;
pub mod get_config;
pub mod process_reactor;
pub mod snapshot_name;
pub mod zfs;
pub mod zfs_logger;
pub mod zfs_snapshots;

pub use command_error::{CommandError, CommandFailure};
pub use filesystem::Filesystem;
pub use filesystem_snapshots::{FilesystemSnapshots, InMemoryFilesystemSnapshots};
pub use process_reactor::{ProcessReactor, ProcessTermination, TokioProcessReactor};
pub use snapshot_name::{SnapshotName, SnapshotNameError};
pub use zfs::Zfs;
pub use zfs_logger::{MemoryZfsLogger, TracingZfsLogger, ZfsErrorRecord, ZfsLogger};
pub use zfs_snapshots::ZfsSnapshots;
