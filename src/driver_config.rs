use serde::{Deserialize, Serialize};

use crate::zfs::ZFS_EXECUTABLE;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// The `zfs` binary. Looked up in `PATH` unless it is a path.
    /// Example: `/sbin/zfs`
    pub zfs_executable: String,
    /// Identifies this host in the names of snapshots it takes.
    pub node: Option<String>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            zfs_executable: ZFS_EXECUTABLE.to_owned(),
            node: None,
        }
    }
}
