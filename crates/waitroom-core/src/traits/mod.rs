//! Trait seams between the broker and its external collaborators.

pub mod snapshot_store;

pub use snapshot_store::SnapshotStore;
