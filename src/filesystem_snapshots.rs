use std::{
    convert::Infallible,
    sync::{Arc, Mutex},
};

use crate::snapshot_name::SnapshotName;

/// The snapshots of a single filesystem.
pub trait FilesystemSnapshots {
    type Error;

    async fn create(&self, name: &SnapshotName) -> Result<(), Self::Error>;

    /// Snapshots in the order the backend sorts them.
    async fn list(&self) -> Result<Vec<SnapshotName>, Self::Error>;
}

/// Keeps snapshot names in memory, in creation order. Useful for testing code that decides when
/// to take snapshots.
#[derive(Debug, Default, Clone)]
pub struct InMemoryFilesystemSnapshots {
    snapshots: Arc<Mutex<Vec<SnapshotName>>>,
}

impl FilesystemSnapshots for InMemoryFilesystemSnapshots {
    type Error = Infallible;

    async fn create(&self, name: &SnapshotName) -> Result<(), Self::Error> {
        match self.snapshots.lock() {
            Ok(mut snapshots) => snapshots.push(name.clone()),
            Err(poisoned) => poisoned.into_inner().push(name.clone()),
        }
        Ok(())
    }

    async fn list(&self) -> Result<Vec<SnapshotName>, Self::Error> {
        Ok(match self.snapshots.lock() {
            Ok(snapshots) => snapshots.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        })
    }
}
