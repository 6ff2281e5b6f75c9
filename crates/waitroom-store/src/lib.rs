//! # waitroom-store
//!
//! Snapshot persistence for the waitroom slot broker: a JSON file on the
//! local filesystem, loaded once at startup and overwritten after each
//! mutating operation.

pub mod json;

pub use json::JsonSnapshotStore;
