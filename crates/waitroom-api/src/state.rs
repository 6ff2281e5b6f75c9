//! Application state shared across all handlers.

use std::sync::Arc;

use waitroom_broker::AllocationEngine;
use waitroom_core::config::AppConfig;

/// Application state passed to every Axum handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// The allocation engine; internally synchronized, cheap to clone.
    pub engine: AllocationEngine,
}
