//! # waitroom-api
//!
//! HTTP layer for the waitroom slot broker, built on Axum.
//!
//! Provides the `/api` endpoints, the shared-secret extractor, error
//! mapping, and static asset serving. Handlers are thin: parse
//! parameters, call one engine operation, serialize the result.

pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
