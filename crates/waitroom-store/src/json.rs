//! JSON file snapshot store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use waitroom_core::error::{AppError, ErrorKind};
use waitroom_core::result::AppResult;
use waitroom_core::traits::snapshot_store::SnapshotStore;
use waitroom_core::types::snapshot::RoomSnapshot;

/// Stores the room table as a single JSON object in a file.
///
/// A missing file on load means a first start and yields `None`. Saves
/// overwrite the whole file; there is no history.
#[derive(Debug, Clone)]
pub struct JsonSnapshotStore {
    /// Path of the snapshot file.
    path: PathBuf,
}

impl JsonSnapshotStore {
    /// Create a store writing to the given path. Nothing is touched on
    /// disk until the first save.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Ensure the parent directory of the snapshot file exists.
    async fn ensure_parent(&self) -> AppResult<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to create parent directory: {}", parent.display()),
                    e,
                )
            })?;
        }
        Ok(())
    }
}

#[async_trait]
impl SnapshotStore for JsonSnapshotStore {
    async fn load(&self) -> AppResult<Option<RoomSnapshot>> {
        let data = match fs::read(&self.path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Storage,
                    format!("Failed to read state file: {}", self.path.display()),
                    e,
                ));
            }
        };
        let snapshot = serde_json::from_slice(&data)?;
        Ok(Some(snapshot))
    }

    async fn save(&self, snapshot: &RoomSnapshot) -> AppResult<()> {
        self.ensure_parent().await?;
        let data = serde_json::to_vec(snapshot)?;
        fs::write(&self.path, &data).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Failed to write state file: {}", self.path.display()),
                e,
            )
        })?;
        debug!(path = %self.path.display(), rooms = snapshot.len(), "snapshot written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use waitroom_core::types::id::RoomId;

    fn snapshot(entries: &[(&str, u32)]) -> RoomSnapshot {
        entries
            .iter()
            .map(|(id, count)| (RoomId::from(*id), *count))
            .collect()
    }

    #[tokio::test]
    async fn test_missing_file_loads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::new(dir.path().join("rooms.json"));
        assert_eq!(store.load().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_save_then_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::new(dir.path().join("rooms.json"));

        let image = snapshot(&[("r1", 2), ("r2", 0)]);
        store.save(&image).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(image));
    }

    #[tokio::test]
    async fn test_save_overwrites_previous_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::new(dir.path().join("rooms.json"));

        store.save(&snapshot(&[("r1", 5)])).await.unwrap();
        store.save(&snapshot(&[("r1", 1)])).await.unwrap();
        assert_eq!(store.load().await.unwrap(), Some(snapshot(&[("r1", 1)])));
    }

    #[tokio::test]
    async fn test_save_creates_missing_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonSnapshotStore::new(dir.path().join("nested/data/rooms.json"));

        store.save(&snapshot(&[("r1", 1)])).await.unwrap();
        assert!(store.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_wire_format_is_a_plain_object() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rooms.json");
        let store = JsonSnapshotStore::new(&path);

        store.save(&snapshot(&[("r1", 2)])).await.unwrap();
        let raw = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(raw, r#"{"r1":2}"#);
    }
}
