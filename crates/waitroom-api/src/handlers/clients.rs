//! Client handlers: registration and polling.
//!
//! These answer in plain text because the polling script treats the body
//! as an opaque token or room id; `"wait"` and `"nouuid"` are in-band
//! sentinels, not errors.

use axum::extract::{Query, State};

use waitroom_broker::PollOutcome;
use waitroom_core::error::AppError;
use waitroom_core::types::id::ClientToken;

use crate::dto::request::PollParams;
use crate::error::ApiResult;
use crate::state::AppState;

/// POST /api/register_client — admit a new waiting client, returning its
/// token. Unconditional; capacity is only checked when the client polls.
pub async fn register_client(State(state): State<AppState>) -> String {
    state.engine.register_client().await.to_string()
}

/// POST /api/poll — resolve the client's current assignment.
pub async fn poll(
    State(state): State<AppState>,
    Query(params): Query<PollParams>,
) -> ApiResult<String> {
    let raw = params
        .uuid
        .ok_or_else(|| AppError::validation("missing uuid parameter"))?;

    // a token that does not even parse cannot be in the ledger; same
    // answer as any other unknown token
    let Ok(token) = raw.parse::<ClientToken>() else {
        return Ok("nouuid".to_string());
    };

    let body = match state.engine.poll(&token).await {
        PollOutcome::Assigned(room) => room.to_string(),
        PollOutcome::Wait => "wait".to_string(),
        PollOutcome::UnknownClient => "nouuid".to_string(),
    };
    Ok(body)
}
