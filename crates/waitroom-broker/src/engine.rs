//! Async allocation engine.
//!
//! Wraps [`BrokerState`] behind one `tokio::sync::Mutex`, making every
//! operation atomic with respect to every other, and drives the snapshot
//! store after mutating operations.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tracing::error;

use waitroom_core::config::broker::BrokerConfig;
use waitroom_core::result::AppResult;
use waitroom_core::traits::snapshot_store::SnapshotStore;
use waitroom_core::types::id::{ClientToken, RoomId};
use waitroom_core::types::snapshot::RoomSnapshot;

use crate::state::{BrokerState, PollOutcome};

/// Orchestrates the broker state under one global critical section.
///
/// Snapshot saves happen inside the critical section, so persisted images
/// stay causally ordered with the mutations that produced them. A failed
/// save is logged and swallowed: the in-memory table remains authoritative
/// for the running process.
#[derive(Clone)]
pub struct AllocationEngine {
    state: Arc<Mutex<BrokerState>>,
    store: Arc<dyn SnapshotStore>,
    client_timeout: Duration,
}

impl AllocationEngine {
    /// Build an engine, optionally seeded with a restored room table.
    pub fn new(
        snapshot: Option<RoomSnapshot>,
        store: Arc<dyn SnapshotStore>,
        config: &BrokerConfig,
    ) -> Self {
        let state = match snapshot {
            Some(snapshot) => BrokerState::restore(snapshot),
            None => BrokerState::new(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
            store,
            client_timeout: Duration::from_secs(config.client_timeout_seconds),
        }
    }

    /// Register a new room; fails on duplicates and zero counts.
    /// Returns the resulting room table.
    pub async fn register_room(&self, id: RoomId, count: u32) -> AppResult<RoomSnapshot> {
        let mut state = self.state.lock().await;
        state.register_room(id, count)?;
        let snapshot = state.snapshot();
        self.persist(&snapshot).await;
        Ok(snapshot)
    }

    /// Announce freed slots on a room, matching at most one waiting client.
    /// Returns the resulting room table.
    pub async fn free_slots(&self, id: RoomId, count: u32) -> AppResult<RoomSnapshot> {
        let mut state = self.state.lock().await;
        state.free_slots(id, count)?;
        let snapshot = state.snapshot();
        self.persist(&snapshot).await;
        Ok(snapshot)
    }

    /// Remove a room (absent rooms are a no-op) and return the resulting
    /// room table.
    pub async fn delete_room(&self, id: &RoomId) -> RoomSnapshot {
        let mut state = self.state.lock().await;
        state.delete_room(id);
        let snapshot = state.snapshot();
        self.persist(&snapshot).await;
        snapshot
    }

    /// Read-only image of the room table. No persistence trigger.
    pub async fn snapshot(&self) -> RoomSnapshot {
        self.state.lock().await.snapshot()
    }

    /// Admit a new waiting client and hand back its token.
    pub async fn register_client(&self) -> ClientToken {
        self.state.lock().await.register_client(Instant::now())
    }

    /// Resolve a client's assignment, expiring stale clients first. Every
    /// poll persists, because expiry may have returned slots to rooms.
    pub async fn poll(&self, token: &ClientToken) -> PollOutcome {
        let mut state = self.state.lock().await;
        let outcome = state.poll(token, Instant::now(), self.client_timeout);
        let snapshot = state.snapshot();
        self.persist(&snapshot).await;
        outcome
    }

    async fn persist(&self, snapshot: &RoomSnapshot) {
        if let Err(err) = self.store.save(snapshot).await {
            error!(error = %err, "failed to persist room snapshot");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    /// Store double that records every snapshot it is asked to save.
    #[derive(Default)]
    struct RecordingStore {
        saved: StdMutex<Vec<RoomSnapshot>>,
    }

    impl RecordingStore {
        fn saved(&self) -> Vec<RoomSnapshot> {
            self.saved.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SnapshotStore for RecordingStore {
        async fn load(&self) -> AppResult<Option<RoomSnapshot>> {
            Ok(None)
        }

        async fn save(&self, snapshot: &RoomSnapshot) -> AppResult<()> {
            self.saved.lock().unwrap().push(snapshot.clone());
            Ok(())
        }
    }

    /// Store double whose saves always fail.
    struct FailingStore;

    #[async_trait]
    impl SnapshotStore for FailingStore {
        async fn load(&self) -> AppResult<Option<RoomSnapshot>> {
            Ok(None)
        }

        async fn save(&self, _snapshot: &RoomSnapshot) -> AppResult<()> {
            Err(waitroom_core::AppError::storage("disk on fire"))
        }
    }

    fn engine_with(store: Arc<dyn SnapshotStore>) -> AllocationEngine {
        AllocationEngine::new(None, store, &BrokerConfig::default())
    }

    #[tokio::test]
    async fn test_mutations_persist_in_order() {
        let store = Arc::new(RecordingStore::default());
        let engine = engine_with(store.clone());

        engine.register_room(RoomId::from("r1"), 2).await.unwrap();
        let token = engine.register_client().await;
        engine.poll(&token).await;

        let saved = store.saved();
        assert_eq!(saved.len(), 2);
        assert_eq!(saved[0].get(&RoomId::from("r1")), Some(2));
        assert_eq!(saved[1].get(&RoomId::from("r1")), Some(1));
    }

    #[tokio::test]
    async fn test_read_paths_do_not_persist() {
        let store = Arc::new(RecordingStore::default());
        let engine = engine_with(store.clone());

        engine.snapshot().await;
        engine.register_client().await;
        assert!(store.saved().is_empty());
    }

    #[tokio::test]
    async fn test_save_failure_is_non_fatal() {
        let engine = engine_with(Arc::new(FailingStore));

        let table = engine.register_room(RoomId::from("r1"), 1).await.unwrap();
        assert_eq!(table.get(&RoomId::from("r1")), Some(1));

        let token = engine.register_client().await;
        assert_eq!(
            engine.poll(&token).await,
            PollOutcome::Assigned(RoomId::from("r1"))
        );
    }

    #[tokio::test]
    async fn test_restored_snapshot_seeds_the_table() {
        let snapshot: RoomSnapshot = [(RoomId::from("r1"), 4u32)].into_iter().collect();
        let engine = AllocationEngine::new(
            Some(snapshot),
            Arc::new(RecordingStore::default()),
            &BrokerConfig::default(),
        );
        assert_eq!(engine.snapshot().await.get(&RoomId::from("r1")), Some(4));
    }

    #[tokio::test]
    async fn test_delete_room_returns_table_and_persists() {
        let store = Arc::new(RecordingStore::default());
        let engine = engine_with(store.clone());

        engine.register_room(RoomId::from("r1"), 1).await.unwrap();
        let table = engine.delete_room(&RoomId::from("r1")).await;
        assert!(table.is_empty());
        assert!(store.saved().last().unwrap().is_empty());
    }
}
