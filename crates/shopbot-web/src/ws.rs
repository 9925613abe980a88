//! WebSocket upgrade handler and message dispatch.
//!
//! Every connected client receives the [`WsEvent`] stream for all
//! conversations; events carry a `conversation_id` so clients filter for the
//! ones they display. Clients start turns by sending:
//!
//! ```json
//! {"type": "chat", "conversation_id": "...", "message": "show me headphones"}
//! ```

use std::sync::Arc;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures::{SinkExt, StreamExt, stream::SplitSink};
use serde::Deserialize;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::api::AppState;
use crate::broadcast::{WsEvent, WsMessage};
use crate::store::ChatService;

/// GET /ws: WebSocket upgrade handler.
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(app): State<AppState>) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_socket(socket, app))
}

async fn handle_socket(socket: WebSocket, app: AppState) {
    let (mut sink, mut stream) = socket.split();
    debug!("WebSocket client connected");

    let mut broadcast_rx = app.broadcast_tx.subscribe();

    // Forward broadcast events to this client.
    let forward_task = tokio::spawn(async move {
        loop {
            match broadcast_rx.recv().await {
                Ok(event) => {
                    if ws_send(&mut sink, &event).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    warn!("WebSocket client lagged by {n} messages");
                    let event = WsEvent::global(WsMessage::Lagged { skipped: n });
                    if ws_send(&mut sink, &event).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    while let Some(Ok(msg)) = stream.next().await {
        match msg {
            Message::Text(text) => handle_client_message(&text, &app),
            Message::Close(_) => break,
            _ => {}
        }
    }

    debug!("WebSocket client disconnected");
    forward_task.abort();
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ClientMessage {
    Chat {
        #[serde(default)]
        conversation_id: Option<String>,
        message: String,
    },
}

fn handle_client_message(text: &str, app: &AppState) {
    let Ok(msg) = serde_json::from_str::<ClientMessage>(text) else {
        debug!("Ignoring malformed WebSocket message");
        return;
    };

    match msg {
        ClientMessage::Chat {
            conversation_id,
            message,
        } => {
            let service = Arc::clone(&app.service);
            let tx = app.broadcast_tx.clone();
            tokio::spawn(run_chat(service, tx, conversation_id, message));
        }
    }
}

/// Run a turn requested over the socket. Progress and the final messages
/// arrive through the broadcast stream; failures to start are reported as
/// an `error` event.
async fn run_chat(
    service: Arc<ChatService>,
    tx: broadcast::Sender<WsEvent>,
    conversation_id: Option<String>,
    message: String,
) {
    let result = service
        .run_turn(conversation_id.as_deref(), &message, Some(tx.clone()))
        .await;
    if let Err(e) = result {
        let error = WsMessage::Error {
            message: e.to_string(),
        };
        let event = match conversation_id {
            Some(id) => WsEvent::new(&id, error),
            None => WsEvent::global(error),
        };
        let _ = tx.send(event);
    }
}

async fn ws_send(sink: &mut SplitSink<WebSocket, Message>, event: &WsEvent) -> Result<(), ()> {
    let json = serde_json::to_string(event).unwrap_or_default();
    sink.send(Message::Text(json.into())).await.map_err(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_chat_message() {
        let msg: ClientMessage = serde_json::from_str(
            r#"{"type":"chat","conversation_id":"conv-1","message":"hello"}"#,
        )
        .unwrap();
        let ClientMessage::Chat {
            conversation_id,
            message,
        } = msg;
        assert_eq!(conversation_id.as_deref(), Some("conv-1"));
        assert_eq!(message, "hello");
    }

    #[test]
    fn rejects_unknown_type() {
        assert!(serde_json::from_str::<ClientMessage>(r#"{"type":"quit"}"#).is_err());
    }
}
