//! Shared domain types.

pub mod id;
pub mod snapshot;

pub use id::{ClientToken, RoomId};
pub use snapshot::RoomSnapshot;
