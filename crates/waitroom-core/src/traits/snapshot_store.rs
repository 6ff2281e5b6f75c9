//! Snapshot store trait for room-table persistence.

use async_trait::async_trait;

use crate::result::AppResult;
use crate::types::snapshot::RoomSnapshot;

/// Durable storage for the room table.
///
/// Persistence is best-effort: the in-memory table stays authoritative for
/// the running process, and a failed save must never fail the operation
/// that triggered it. Waiting clients and reservations are never stored.
#[async_trait]
pub trait SnapshotStore: Send + Sync + 'static {
    /// Load the snapshot written by a previous run.
    ///
    /// Returns `Ok(None)` when no snapshot exists yet; that is a normal
    /// first start, not an error.
    async fn load(&self) -> AppResult<Option<RoomSnapshot>>;

    /// Durably overwrite the snapshot with the current room table.
    async fn save(&self, snapshot: &RoomSnapshot) -> AppResult<()>;
}
