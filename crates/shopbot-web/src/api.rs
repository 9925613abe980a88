//! REST API endpoint handlers.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::broadcast::WsEvent;
use crate::store::{ChatService, ConversationSnapshot, ConversationView, ServiceError, TurnReply};

/// Shared application state passed to all handlers via axum's `State` extractor.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ChatService>,
    pub broadcast_tx: broadcast::Sender<WsEvent>,
}

/// GET /api/health
pub async fn get_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// POST /api/conversations: open a conversation holding the greeting.
pub async fn post_conversation(
    State(app): State<AppState>,
) -> (StatusCode, Json<ConversationView>) {
    let view = app.service.create_conversation().await;
    (StatusCode::CREATED, Json(view))
}

/// GET /api/conversations/{id}: history and cart; 404 if unknown.
pub async fn get_conversation(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ConversationSnapshot>, ServiceError> {
    app.service.snapshot(&id).await.map(Json)
}

/// Request body for POST /api/chat.
#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub conversation_id: Option<String>,
    pub message: String,
}

/// POST /api/chat: run one turn.
///
/// Without a `conversation_id` a new conversation is opened. Returns the
/// turn's new messages; 400 on a blank message, 404 on an unknown id. Turn
/// events are also streamed to WebSocket clients.
pub async fn post_chat(
    State(app): State<AppState>,
    Json(body): Json<ChatRequest>,
) -> Result<Json<TurnReply>, ServiceError> {
    app.service
        .run_turn(
            body.conversation_id.as_deref(),
            &body.message,
            Some(app.broadcast_tx.clone()),
        )
        .await
        .map(Json)
}
