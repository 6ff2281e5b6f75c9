//! Allocation engine configuration.

use serde::{Deserialize, Serialize};

/// Allocation engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerConfig {
    /// Seconds of client silence before the client is expired and any
    /// reserved slot is returned to its room.
    #[serde(default = "default_client_timeout")]
    pub client_timeout_seconds: u64,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            client_timeout_seconds: default_client_timeout(),
        }
    }
}

fn default_client_timeout() -> u64 {
    10
}
