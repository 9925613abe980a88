//! Conversation storage and the turn service behind the HTTP and WebSocket
//! endpoints.
//!
//! Each conversation sits behind its own async mutex: turns on one
//! conversation run one at a time, turns on different conversations run
//! concurrently. Storage is in memory only.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use shopbot::agent::{
    ChatConfig, ChatOrchestrator, CompositeEventHandler, Conversation, LoggingHandler, TurnStatus,
};
use shopbot::api::ModelClient;
use shopbot::message::Message;
use shopbot::tools::{Cart, ToolRegistry};
use tokio::sync::broadcast;
use tracing::info;

use crate::broadcast::{WebBroadcastHandler, WsEvent, WsMessage};

/// Customer every conversation is opened for.
pub const DEFAULT_CUSTOMER_ID: &str = "CUST_12345";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ServiceError {
    #[error("message must not be empty")]
    EmptyMessage,
    #[error("conversation '{0}' not found")]
    UnknownConversation(String),
}

impl IntoResponse for ServiceError {
    fn into_response(self) -> Response {
        let status = match self {
            ServiceError::EmptyMessage => StatusCode::BAD_REQUEST,
            ServiceError::UnknownConversation(_) => StatusCode::NOT_FOUND,
        };
        (status, Json(serde_json::json!({"error": self.to_string()}))).into_response()
    }
}

/// A conversation's id and full message history.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationView {
    pub id: String,
    pub messages: Vec<Message>,
}

/// [`ConversationView`] plus the current cart.
#[derive(Debug, Clone, Serialize)]
pub struct ConversationSnapshot {
    pub id: String,
    pub messages: Vec<Message>,
    pub cart: Cart,
}

/// Result of one turn as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct TurnReply {
    pub conversation_id: String,
    pub turn_id: String,
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub rounds_used: u32,
    /// Messages produced by this turn only.
    pub messages: Vec<Message>,
}

type SharedConversation = Arc<tokio::sync::Mutex<Conversation>>;

/// Runs turns against stored conversations.
pub struct ChatService {
    client: Arc<dyn ModelClient>,
    tools: ToolRegistry,
    config: ChatConfig,
    customer_id: String,
    conversations: Mutex<HashMap<String, SharedConversation>>,
}

impl ChatService {
    pub fn new(client: Arc<dyn ModelClient>, tools: ToolRegistry, config: ChatConfig) -> Self {
        let tool_names: Vec<&str> = tools.names().collect();
        info!(
            "Chat service ready: model={}, max_rounds={}, tools=[{}]",
            config.model,
            config.max_rounds,
            tool_names.join(", ")
        );
        Self {
            client,
            tools,
            config,
            customer_id: DEFAULT_CUSTOMER_ID.to_string(),
            conversations: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_customer_id(mut self, customer_id: impl Into<String>) -> Self {
        self.customer_id = customer_id.into();
        self
    }

    fn table(&self) -> std::sync::MutexGuard<'_, HashMap<String, SharedConversation>> {
        self.conversations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn insert_new(&self) -> (String, SharedConversation) {
        let conversation = Conversation::new(self.customer_id.clone());
        let id = conversation.id.clone();
        let shared = Arc::new(tokio::sync::Mutex::new(conversation));
        self.table().insert(id.clone(), shared.clone());
        info!("Conversation created: {id}");
        (id, shared)
    }

    fn find(&self, id: &str) -> Option<SharedConversation> {
        self.table().get(id).cloned()
    }

    /// Open a new conversation; its history holds only the greeting.
    pub async fn create_conversation(&self) -> ConversationView {
        let (id, shared) = self.insert_new();
        let conversation = shared.lock().await;
        ConversationView {
            id,
            messages: conversation.history.clone(),
        }
    }

    pub async fn snapshot(&self, id: &str) -> Result<ConversationSnapshot, ServiceError> {
        let shared = self
            .find(id)
            .ok_or_else(|| ServiceError::UnknownConversation(id.to_string()))?;
        let conversation = shared.lock().await;
        Ok(ConversationSnapshot {
            id: conversation.id.clone(),
            messages: conversation.history.clone(),
            cart: conversation.session.cart.clone(),
        })
    }

    pub fn conversation_count(&self) -> usize {
        self.table().len()
    }

    /// Run one turn on `conversation_id` (or a new conversation when `None`)
    /// and append its messages to the stored history.
    ///
    /// Turn events are published on `events` when given.
    pub async fn run_turn(
        &self,
        conversation_id: Option<&str>,
        text: &str,
        events: Option<broadcast::Sender<WsEvent>>,
    ) -> Result<TurnReply, ServiceError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ServiceError::EmptyMessage);
        }
        let (id, shared) = match conversation_id {
            Some(id) => {
                let shared = self
                    .find(id)
                    .ok_or_else(|| ServiceError::UnknownConversation(id.to_string()))?;
                (id.to_string(), shared)
            }
            None => self.insert_new(),
        };

        let handler = CompositeEventHandler::new()
            .with(LoggingHandler)
            .with_opt(events.clone().map(|tx| WebBroadcastHandler::new(tx, &id)));

        // Turns on one conversation are serialized; announce this one only
        // once it holds the conversation.
        let mut guard = shared.lock().await;
        if let Some(tx) = &events {
            let _ = tx.send(WsEvent::new(
                &id,
                WsMessage::UserMessage {
                    message: text.to_string(),
                },
            ));
        }
        let conversation = &mut *guard;
        let orchestrator = ChatOrchestrator::new(&*self.client, &self.tools, self.config.clone())
            .with_event_handler(&handler);
        let outcome = orchestrator
            .run_turn(&conversation.history, text, &mut conversation.session)
            .await;

        // A failed turn returns only the apology; keep the user's message in
        // the stored history so later turns see it.
        if matches!(outcome.status, TurnStatus::Failed(_)) {
            conversation.history.push(Message::user(text));
        }
        conversation.extend(outcome.messages.iter().cloned());

        let error = match &outcome.status {
            TurnStatus::Failed(reason) => Some(reason.clone()),
            _ => None,
        };
        let reply = TurnReply {
            conversation_id: id.clone(),
            turn_id: outcome.turn_id,
            status: outcome.status.as_str(),
            error,
            rounds_used: outcome.rounds_used,
            messages: outcome.messages,
        };

        if let Some(tx) = &events {
            let _ = tx.send(WsEvent::new(
                &id,
                WsMessage::TurnComplete {
                    turn_id: reply.turn_id.clone(),
                    status: reply.status.to_string(),
                    messages: reply.messages.clone(),
                },
            ));
        }
        drop(guard);

        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use shopbot::api::{ClientError, GenerateFuture, GenerateRequest, ModelReply};

    /// Answers every call with the same text after a delay.
    struct SlowModel(Duration);

    impl ModelClient for SlowModel {
        fn generate<'a>(&'a self, _request: &'a GenerateRequest) -> GenerateFuture<'a> {
            let delay = self.0;
            Box::pin(async move {
                tokio::time::sleep(delay).await;
                Ok::<_, ClientError>(ModelReply::text("ok"))
            })
        }
    }

    fn service(delay: Duration) -> Arc<ChatService> {
        Arc::new(ChatService::new(
            Arc::new(SlowModel(delay)),
            ToolRegistry::new(),
            ChatConfig::default(),
        ))
    }

    #[tokio::test]
    async fn queued_turn_announced_after_previous_completes() {
        let service = service(Duration::from_millis(50));
        let id = service.create_conversation().await.id;
        let (tx, mut rx) = broadcast::channel(64);

        let first = tokio::spawn({
            let (service, id, tx) = (service.clone(), id.clone(), tx.clone());
            async move { service.run_turn(Some(&id), "first", Some(tx)).await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        let second = tokio::spawn({
            let (service, id, tx) = (service.clone(), id.clone(), tx.clone());
            async move { service.run_turn(Some(&id), "second", Some(tx)).await }
        });
        first.await.unwrap().unwrap();
        second.await.unwrap().unwrap();

        let mut order = Vec::new();
        while let Ok(event) = rx.try_recv() {
            match event.message {
                WsMessage::UserMessage { message } => order.push(format!("user:{message}")),
                WsMessage::TurnComplete { .. } => order.push("complete".to_string()),
                _ => {}
            }
        }
        assert_eq!(order, ["user:first", "complete", "user:second", "complete"]);
    }

    #[tokio::test]
    async fn blank_and_unknown_are_rejected() {
        let service = service(Duration::ZERO);
        assert_eq!(
            service.run_turn(None, "  ", None).await.unwrap_err(),
            ServiceError::EmptyMessage
        );
        assert_eq!(
            service.run_turn(Some("conv-x"), "hi", None).await.unwrap_err(),
            ServiceError::UnknownConversation("conv-x".into())
        );
        assert_eq!(service.conversation_count(), 0);
    }
}
