//! Session HTTP handlers.
//!
//! Endpoints:
//! - GET    /api/v1/sessions/{user_id} - Snapshot of a user's session
//! - DELETE /api/v1/sessions/{user_id} - Abort the session and drop its draft

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, State};
use serde_json::json;
use showroom_types::session::Session;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// GET /api/v1/sessions/{user_id}
pub async fn get_session(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<Session>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let session = state
        .conversation
        .session(&user_id)
        .ok_or_else(|| AppError::NotFound(format!("No active session for user {user_id}")))?;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(ApiResponse::success(session, request_id, elapsed)))
}

/// DELETE /api/v1/sessions/{user_id}
///
/// Idempotent: deleting a missing session succeeds with `aborted: false`.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let aborted = state.conversation.abort(&user_id).await;
    if aborted {
        tracing::info!(user_id = %user_id, "session aborted over HTTP");
    }
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(ApiResponse::success(
        json!({ "user_id": user_id, "aborted": aborted }),
        request_id,
        elapsed,
    )))
}
