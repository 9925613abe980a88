//! [`EventHandler`] that converts turn events into WebSocket messages.
//!
//! [`WebBroadcastHandler`] is created per turn, stamps every event with the
//! conversation it belongs to, and publishes it on a
//! `tokio::sync::broadcast` channel shared by all WebSocket clients.

use serde::Serialize;
use shopbot::agent::events::{EventHandler, TurnEvent};
use shopbot::message::Message;
use tokio::sync::broadcast;

/// A server-to-client message, discriminated on `type`.
#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsMessage {
    /// User text that started a turn.
    UserMessage { message: String },
    /// A model call is starting.
    Round { round: u32, max_rounds: u32 },
    /// Final model text.
    Text { text: String },
    /// The model requested tool calls.
    ToolCallsReceived { round: u32, count: usize },
    /// A tool is about to execute.
    ToolExecuting {
        name: String,
        args: serde_json::Value,
    },
    /// A tool finished.
    ToolResult {
        name: String,
        result: serde_json::Value,
        is_error: bool,
    },
    TokenUsage {
        prompt_tokens: u32,
        completion_tokens: u32,
    },
    /// The model replied empty and the call is being retried.
    EmptyResponse {
        round: u32,
        attempt: u32,
        max_retries: u32,
    },
    Finished,
    RoundLimitReached { max_rounds: u32 },
    TurnFailed { error: String },
    /// The turn's new messages, sent once it has been stored.
    TurnComplete {
        turn_id: String,
        status: String,
        messages: Vec<Message>,
    },
    /// The client missed `skipped` messages; refetch over REST.
    Lagged { skipped: u64 },
    /// A client request could not be served.
    Error { message: String },
}

/// A [`WsMessage`] addressed to one conversation.
///
/// Serializes flat: `{"conversation_id": ..., "type": ..., ...}`.
#[derive(Clone, Debug, Serialize)]
pub struct WsEvent {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
    #[serde(flatten)]
    pub message: WsMessage,
}

impl WsEvent {
    pub fn new(conversation_id: &str, message: WsMessage) -> Self {
        Self {
            conversation_id: Some(conversation_id.to_string()),
            message,
        }
    }

    /// A message not tied to any conversation.
    pub fn global(message: WsMessage) -> Self {
        Self {
            conversation_id: None,
            message,
        }
    }
}

/// Publishes one conversation's turn events to WebSocket clients.
pub struct WebBroadcastHandler {
    sender: broadcast::Sender<WsEvent>,
    conversation_id: String,
}

impl WebBroadcastHandler {
    pub fn new(sender: broadcast::Sender<WsEvent>, conversation_id: &str) -> Self {
        Self {
            sender,
            conversation_id: conversation_id.to_string(),
        }
    }

    fn send(&self, message: WsMessage) {
        // No subscribers is fine.
        let _ = self.sender.send(WsEvent::new(&self.conversation_id, message));
    }
}

impl EventHandler for WebBroadcastHandler {
    fn on_event(&self, event: &TurnEvent<'_>) {
        let message = match event {
            TurnEvent::RoundStart { round, max_rounds } => WsMessage::Round {
                round: *round,
                max_rounds: *max_rounds,
            },
            TurnEvent::Text(text) => WsMessage::Text {
                text: text.to_string(),
            },
            TurnEvent::ToolCallsReceived { round, count } => WsMessage::ToolCallsReceived {
                round: *round,
                count: *count,
            },
            TurnEvent::ToolExecuting { name, args } => WsMessage::ToolExecuting {
                name: name.to_string(),
                args: (*args).clone(),
            },
            TurnEvent::ToolResult {
                name,
                result,
                is_error,
            } => WsMessage::ToolResult {
                name: name.to_string(),
                result: (*result).clone(),
                is_error: *is_error,
            },
            TurnEvent::TokenUsage {
                prompt_tokens,
                completion_tokens,
            } => WsMessage::TokenUsage {
                prompt_tokens: *prompt_tokens,
                completion_tokens: *completion_tokens,
            },
            TurnEvent::EmptyResponse {
                round,
                attempt,
                max_retries,
            } => WsMessage::EmptyResponse {
                round: *round,
                attempt: *attempt,
                max_retries: *max_retries,
            },
            TurnEvent::Finished => WsMessage::Finished,
            TurnEvent::RoundLimitReached { max_rounds } => WsMessage::RoundLimitReached {
                max_rounds: *max_rounds,
            },
            TurnEvent::TurnFailed { error } => WsMessage::TurnFailed {
                error: error.to_string(),
            },
        };
        self.send(message);
    }
}
