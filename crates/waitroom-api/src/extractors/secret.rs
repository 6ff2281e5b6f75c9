//! `SharedSecret` extractor — validates the `key` query parameter against
//! the configured shared secret.

use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::Deserialize;

use waitroom_core::error::AppError;

use crate::error::ApiError;
use crate::state::AppState;

/// Marker extractor for endpoints gated by the shared secret.
///
/// Listing it as a handler argument rejects the request with 401 before
/// any parameter validation runs, mirroring the check order of the
/// management API.
#[derive(Debug, Clone, Copy)]
pub struct SharedSecret;

#[derive(Debug, Deserialize)]
struct KeyParam {
    key: Option<String>,
}

impl FromRequestParts<AppState> for SharedSecret {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Query(params) = Query::<KeyParam>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::from(AppError::validation("malformed query string")))?;

        let provided = params
            .key
            .ok_or_else(|| AppError::unauthorized("missing key parameter"))?;
        if provided != state.config.auth.secret {
            return Err(AppError::unauthorized("invalid key").into());
        }

        Ok(SharedSecret)
    }
}
