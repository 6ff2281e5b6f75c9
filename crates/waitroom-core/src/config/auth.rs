//! Shared-secret configuration.

use serde::{Deserialize, Serialize};

/// Shared-secret configuration.
///
/// Room mutations (`register`, `free`, `delete`) require the caller to
/// present this secret as the `key` query parameter. There are no user
/// accounts; the secret is the whole authorization model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// The shared secret. No default: it must come from a config file or
    /// the `WAITROOM_AUTH__SECRET` environment variable.
    pub secret: String,
}
