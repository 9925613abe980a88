//! Per-conversation state.

use serde::Serialize;

use crate::ids::generate_conversation_id;
use crate::message::Message;
use crate::tools::cart::Cart;

/// Mutable shopping state of one conversation, threaded by `&mut` through
/// every tool invocation.
#[derive(Debug, Clone, Serialize)]
pub struct ShopSession {
    pub customer_id: String,
    pub cart: Cart,
}

impl ShopSession {
    pub fn new(customer_id: impl Into<String>) -> Self {
        let customer_id = customer_id.into();
        let cart = Cart::new(customer_id.clone());
        Self { customer_id, cart }
    }
}

/// A conversation: its history plus its session.
///
/// New conversations start with the ShopBot greeting.
#[derive(Debug, Clone)]
pub struct Conversation {
    pub id: String,
    pub history: Vec<Message>,
    pub session: ShopSession,
}

impl Conversation {
    pub fn new(customer_id: impl Into<String>) -> Self {
        Self {
            id: generate_conversation_id(),
            history: vec![Message::model_text(crate::GREETING)],
            session: ShopSession::new(customer_id),
        }
    }

    /// Append the messages produced by a turn.
    pub fn extend(&mut self, messages: impl IntoIterator<Item = Message>) {
        self.history.extend(messages);
    }
}
