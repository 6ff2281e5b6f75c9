//! Route definitions for the waitroom HTTP API.
//!
//! API routes live under `/api`; everything else falls through to the
//! static asset directory, which carries the waiting-room page and the
//! management page.

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();

    let api_routes = Router::new()
        .route("/state", get(handlers::rooms::state))
        .route("/register", post(handlers::rooms::register_room))
        .route("/free", post(handlers::rooms::free_slots))
        .route("/delete", post(handlers::rooms::delete_room))
        .route("/register_client", post(handlers::clients::register_client))
        .route("/poll", post(handlers::clients::poll));

    Router::new()
        .nest("/api", api_routes)
        .route("/health", get(handlers::health::health))
        .fallback_service(ServeDir::new(static_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
