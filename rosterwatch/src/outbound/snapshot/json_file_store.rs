//! JSON file adapter for the roster snapshot port.
//!
//! The snapshot is a JSON array of user records. A file holding `null` is
//! accepted as an empty roster.

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;

use super::atomic_io::write_atomic;
use crate::domain::ports::{SnapshotLoad, SnapshotStore, SnapshotStoreError};
use crate::domain::{Roster, User};
use crate::file_path::open_parent;

/// Snapshot store backed by a single JSON file.
#[derive(Debug, Clone)]
pub struct JsonFileSnapshotStore {
    path: PathBuf,
}

impl JsonFileSnapshotStore {
    /// Bind the store to the snapshot file at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Location of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_contents(&self) -> io::Result<String> {
        let (dir, file_name) = open_parent(&self.path)?;
        dir.read_to_string(file_name)
    }

    fn write_error(&self, message: impl Into<String>) -> SnapshotStoreError {
        SnapshotStoreError::write(self.path.display().to_string(), message)
    }
}

#[async_trait]
impl SnapshotStore for JsonFileSnapshotStore {
    async fn read_snapshot(&self) -> SnapshotLoad {
        let contents = match self.read_contents() {
            Ok(contents) => contents,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return SnapshotLoad::Missing,
            Err(err) => {
                return SnapshotLoad::Invalid {
                    reason: err.to_string(),
                };
            }
        };

        decode_snapshot(&contents)
    }

    async fn save_snapshot(&self, roster: &Roster) -> Result<(), SnapshotStoreError> {
        let users: Vec<&User> = roster.iter().collect();
        let encoded = serde_json::to_vec_pretty(&users)
            .map_err(|err| SnapshotStoreError::encode(err.to_string()))?;

        let (dir, file_name) =
            open_parent(&self.path).map_err(|err| self.write_error(err.to_string()))?;
        write_atomic(&dir, &file_name, &encoded).map_err(|err| self.write_error(err.to_string()))?;

        debug!(path = %self.path.display(), users = users.len(), "snapshot saved");
        Ok(())
    }
}

fn decode_snapshot(contents: &str) -> SnapshotLoad {
    match serde_json::from_str::<Option<Vec<User>>>(contents) {
        Ok(users) => SnapshotLoad::Loaded(users.unwrap_or_default().into_iter().collect()),
        Err(err) => SnapshotLoad::Invalid {
            reason: err.to_string(),
        },
    }
}
