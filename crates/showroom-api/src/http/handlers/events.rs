//! Inbound event HTTP handler.
//!
//! Endpoints:
//! - POST /api/v1/events - Deliver one user interaction, get the reply

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use showroom_types::event::InboundEvent;
use showroom_types::reply::Reply;

use crate::http::error::AppError;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// POST /api/v1/events - Run one event through the conversation.
///
/// Body: `{"user_id": "...", "kind": "text" | "media" | "action", "payload": "..."}`.
pub async fn handle_event(
    State(state): State<AppState>,
    Json(event): Json<InboundEvent>,
) -> Result<Json<ApiResponse<Reply>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    if event.user_id.trim().is_empty() {
        return Err(AppError::Validation("user_id must not be empty".to_string()));
    }

    let session_link = format!("/api/v1/sessions/{}", event.user_id);
    tracing::debug!(%request_id, user_id = %event.user_id, kind = event.kind_name(), "event received");
    let reply = state.conversation.handle(event).await;
    let elapsed = start.elapsed().as_millis() as u64;

    Ok(Json(
        ApiResponse::success(reply, request_id, elapsed).with_link("session", &session_link),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::{ADMIN, test_state};
    use showroom_core::navigation::codec::{ROOT_TOKEN, encode_action};
    use showroom_core::repository::catalog::CatalogRepository;
    use showroom_types::navigation::FlowAction;

    async fn post(state: &AppState, event: InboundEvent) -> Reply {
        let Json(resp) = handle_event(State(state.clone()), Json(event)).await.unwrap();
        resp.data.unwrap()
    }

    #[tokio::test]
    async fn test_browse_root_over_http() {
        let (state, _dir) = test_state().await;
        state.catalog.create_category("Beds").await.unwrap();

        let reply = post(&state, InboundEvent::action("7", ROOT_TOKEN)).await;
        assert_eq!(reply.options[0].label, "Beds");
    }

    #[tokio::test]
    async fn test_add_flow_persists_through_sqlite() {
        let (state, _dir) = test_state().await;
        let kitchens = state.catalog.create_category("Kitchens").await.unwrap();

        let steps = [
            InboundEvent::action(ADMIN, encode_action(FlowAction::StartAdd)),
            InboundEvent::text(ADMIN, "Milan kitchen"),
            InboundEvent::action(ADMIN, encode_action(FlowAction::PickCategory(kitchens.id))),
            InboundEvent::text(ADMIN, "Compact corner kitchen in oak"),
            InboundEvent::text(ADMIN, "none"),
            InboundEvent::media(ADMIN, "AgACAgIAAxkBAAIB"),
            InboundEvent::action(ADMIN, encode_action(FlowAction::ImagesDone)),
            InboundEvent::action(ADMIN, encode_action(FlowAction::ConfirmSave)),
        ];
        let mut last = Reply::default();
        for event in steps {
            last = post(&state, event).await;
        }
        assert!(last.text.starts_with("Product \"Milan kitchen\" saved."));

        let products = state
            .catalog
            .list_products_by_category_only(kitchens.id)
            .await
            .unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].images[0].reference, "AgACAgIAAxkBAAIB");
    }

    #[tokio::test]
    async fn test_empty_user_id_rejected() {
        let (state, _dir) = test_state().await;
        let result = handle_event(State(state), Json(InboundEvent::text(" ", "hi"))).await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
