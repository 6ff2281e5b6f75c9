//! Response body shapes.
//!
//! Success bodies are either the raw room table (a JSON object) or plain
//! text for the client endpoints, matching what the polling clients and
//! the management page expect. Only errors and health get typed shapes.

use serde::{Deserialize, Serialize};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

/// Liveness response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"` when the process is serving.
    pub status: String,
    /// Crate version.
    pub version: String,
}
