//! Snapshot persistence configuration.

use serde::{Deserialize, Serialize};

/// Snapshot persistence configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Path of the JSON file holding the room-table snapshot.
    #[serde(default = "default_state_file")]
    pub state_file: String,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            state_file: default_state_file(),
        }
    }
}

fn default_state_file() -> String {
    "data/rooms.json".to_string()
}
