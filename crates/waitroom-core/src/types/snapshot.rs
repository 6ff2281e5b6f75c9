//! Serializable image of the room table.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::id::RoomId;

/// Room-to-free-slot-count mapping, as persisted and as returned by the
/// state endpoint. This is the only state that survives a restart; waiting
/// clients and reservations are always discarded.
///
/// Serializes as a plain JSON object `{"room": count}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoomSnapshot(pub BTreeMap<RoomId, u32>);

impl RoomSnapshot {
    /// Free-slot count for a room, if registered.
    pub fn get(&self, id: &RoomId) -> Option<u32> {
        self.0.get(id).copied()
    }

    /// Number of rooms in the table.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the table has no rooms at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(RoomId, u32)> for RoomSnapshot {
    fn from_iter<I: IntoIterator<Item = (RoomId, u32)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
