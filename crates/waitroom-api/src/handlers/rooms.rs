//! Room lifecycle handlers: register, free, delete, state.
//!
//! All three mutations require the shared secret and answer with the
//! resulting room table so callers can render it directly.

use axum::Json;
use axum::extract::{Query, State};

use waitroom_core::error::AppError;
use waitroom_core::types::id::RoomId;
use waitroom_core::types::snapshot::RoomSnapshot;

use crate::dto::request::RoomParams;
use crate::error::ApiResult;
use crate::extractors::SharedSecret;
use crate::state::AppState;

/// POST /api/register — register a new room with an initial slot count.
pub async fn register_room(
    _secret: SharedSecret,
    State(state): State<AppState>,
    Query(params): Query<RoomParams>,
) -> ApiResult<Json<RoomSnapshot>> {
    let room = require_room(&params)?;
    let count = require_count(&params)?;
    let table = state.engine.register_room(room, count).await?;
    Ok(Json(table))
}

/// POST /api/free — announce freed slots on a room.
pub async fn free_slots(
    _secret: SharedSecret,
    State(state): State<AppState>,
    Query(params): Query<RoomParams>,
) -> ApiResult<Json<RoomSnapshot>> {
    let room = require_room(&params)?;
    let count = require_count(&params)?;
    let table = state.engine.free_slots(room, count).await?;
    Ok(Json(table))
}

/// POST /api/delete — remove a room. Unknown rooms are a successful no-op.
pub async fn delete_room(
    _secret: SharedSecret,
    State(state): State<AppState>,
    Query(params): Query<RoomParams>,
) -> ApiResult<Json<RoomSnapshot>> {
    let room = require_room(&params)?;
    let table = state.engine.delete_room(&room).await;
    Ok(Json(table))
}

/// GET /api/state — read-only room table. Not gated by the secret.
pub async fn state(State(state): State<AppState>) -> Json<RoomSnapshot> {
    Json(state.engine.snapshot().await)
}

fn require_room(params: &RoomParams) -> Result<RoomId, AppError> {
    params
        .url
        .as_deref()
        .filter(|url| !url.is_empty())
        .map(RoomId::from)
        .ok_or_else(|| AppError::validation("missing url parameter"))
}

fn require_count(params: &RoomParams) -> Result<u32, AppError> {
    let raw = params
        .count
        .as_deref()
        .ok_or_else(|| AppError::validation("missing count parameter"))?;
    match raw.parse::<u32>() {
        Ok(count) if count > 0 => Ok(count),
        _ => Err(AppError::validation("count must be a positive integer")),
    }
}
