//! Durable activity snapshots.
//!
//! The snapshot is a JSON object `guild -> user -> {messages, voice, invites}`
//! written wholesale on every persistence tick. Writes go to a sibling
//! temporary file first and are renamed into place.

use crate::state::{ActivitySnapshot, ActivityStore};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed snapshot {path:?}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone)]
pub struct PersistenceManager {
    path: PathBuf,
}

impl PersistenceManager {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the snapshot file. `Ok(None)` when it does not exist yet.
    pub fn try_load(&self) -> Result<Option<ActivitySnapshot>, PersistError> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(PersistError::Io {
                    path: self.path.clone(),
                    source: e,
                });
            }
        };

        serde_json::from_str(&contents)
            .map(Some)
            .map_err(|e| PersistError::Malformed {
                path: self.path.clone(),
                source: e,
            })
    }

    /// Startup load. A missing or unreadable file yields an empty store.
    pub fn load(&self) -> ActivityStore {
        match self.try_load() {
            Ok(Some(snapshot)) => {
                let store = ActivityStore::from_snapshot(snapshot);
                tracing::info!(path = ?self.path, records = store.len(), "Loaded activity data");
                store
            }
            Ok(None) => {
                tracing::info!(path = ?self.path, "No activity data yet, starting empty");
                ActivityStore::new()
            }
            Err(e) => {
                tracing::warn!(error = %e, "Discarding unreadable activity data, starting empty");
                ActivityStore::new()
            }
        }
    }

    /// Replace the snapshot file. Returns the number of records written.
    pub async fn save(&self, snapshot: &ActivitySnapshot) -> Result<usize, PersistError> {
        let contents = serde_json::to_string_pretty(snapshot)?;
        let tmp = self.tmp_path();

        tokio::fs::write(&tmp, contents)
            .await
            .map_err(|e| PersistError::Io {
                path: tmp.clone(),
                source: e,
            })?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| PersistError::Io {
                path: self.path.clone(),
                source: e,
            })?;

        Ok(snapshot.values().map(|users| users.len()).sum())
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "activity.json".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}
