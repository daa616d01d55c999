//! Health check handler.

use axum::Json;
use axum::extract::State;
use serde_json::json;

use crate::state::AppState;

/// GET /api/v1/health
pub async fn health_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "active_sessions": state.conversation.active_sessions(),
    }))
}
