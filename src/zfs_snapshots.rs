use std::future::Future;

use crate::{
    command_error::CommandError,
    filesystem::Filesystem,
    filesystem_snapshots::FilesystemSnapshots,
    process_reactor::ProcessReactor,
    snapshot_name::SnapshotName,
    zfs::Zfs,
};

/// Snapshots of one ZFS filesystem, taken and listed with the `zfs` tool.
#[derive(Debug, Clone)]
pub struct ZfsSnapshots<R> {
    zfs: Zfs<R>,
    filesystem: Filesystem,
}

impl<R: ProcessReactor> ZfsSnapshots<R> {
    pub fn new(zfs: Zfs<R>, filesystem: Filesystem) -> Self {
        Self { zfs, filesystem }
    }

    pub fn filesystem(&self) -> &Filesystem {
        &self.filesystem
    }

    /// Runs `zfs snapshot <filesystem>@<name>`. The command starts immediately.
    pub fn create(
        &self,
        name: &SnapshotName,
    ) -> impl Future<Output = Result<(), CommandError>> + Send + 'static {
        let snapshot = format!("{}@{name}", self.filesystem.name());
        let result = self.zfs.command(["snapshot".to_owned(), snapshot]);
        async move {
            result.await?;
            Ok(())
        }
    }

    /// Lists the snapshots of the pool, oldest name first.
    ///
    /// Snapshots of child datasets and snapshots whose names this driver didn't create are left
    /// out. The command starts immediately.
    pub fn list(
        &self,
    ) -> impl Future<Output = Result<Vec<SnapshotName>, CommandError>> + Send + 'static {
        let pool = self.filesystem.pool().to_owned();
        let result = self.zfs.command(
            [
                "list", "-H", "-r", "-t", "snapshot", "-o", "name", "-s", "name", pool.as_str(),
            ]
            .map(str::to_owned),
        );
        async move {
            let output = result.await?;
            Ok(parse_snapshot_list(&output, &pool))
        }
    }
}

/// Parses `zfs list -H -o name` output, keeping the decodable snapshots of `pool` itself.
pub fn parse_snapshot_list(output: &[u8], pool: &str) -> Vec<SnapshotName> {
    output
        .split(|byte| *byte == b'\n')
        .filter(|line| !line.is_empty())
        .filter_map(|line| {
            let Some(at) = line.iter().rposition(|byte| *byte == b'@') else {
                tracing::debug!(
                    line = %String::from_utf8_lossy(line),
                    "skipping line that is not a snapshot"
                );
                return None;
            };
            let (path, token) = (&line[..at], &line[at + 1..]);
            if path != pool.as_bytes() {
                tracing::debug!(
                    line = %String::from_utf8_lossy(line),
                    pool,
                    "skipping snapshot of another dataset"
                );
                return None;
            }
            SnapshotName::from_bytes(token)
                .inspect_err(|e| {
                    tracing::debug!(
                        line = %String::from_utf8_lossy(line),
                        error = %e,
                        "skipping unmanaged snapshot"
                    )
                })
                .ok()
        })
        .collect()
}

impl<R: ProcessReactor> FilesystemSnapshots for ZfsSnapshots<R> {
    type Error = CommandError;

    async fn create(&self, name: &SnapshotName) -> Result<(), Self::Error> {
        ZfsSnapshots::create(self, name).await
    }

    async fn list(&self) -> Result<Vec<SnapshotName>, Self::Error> {
        ZfsSnapshots::list(self).await
    }
}
