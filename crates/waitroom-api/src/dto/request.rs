//! Query-parameter request shapes.
//!
//! `count` arrives as a raw string so that non-numeric values map to a
//! validation error instead of an extractor rejection.

use serde::Deserialize;

/// Parameters of the room mutation endpoints (`register`, `free`,
/// `delete`; the latter ignores `count`).
#[derive(Debug, Deserialize)]
pub struct RoomParams {
    /// Room identifier. In practice a meeting URL; treated as opaque.
    pub url: Option<String>,
    /// Slot count, decimal string, must be positive.
    pub count: Option<String>,
}

/// Parameters of the poll endpoint.
#[derive(Debug, Deserialize)]
pub struct PollParams {
    /// The client token obtained from `register_client`.
    pub uuid: Option<String>,
}
