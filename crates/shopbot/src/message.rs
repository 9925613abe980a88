//! Conversation messages exchanged between the user, the model, and tools.
//!
//! A [`Message`] carries exactly one kind of content: plain text, the tool
//! calls requested in one model reply, or the result of one tool call.
//! Messages are created once and never modified; a history is an append-only
//! `Vec<Message>`.

use serde::{Deserialize, Serialize};

use crate::ids::generate_message_id;

/// Who produced a message.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
    Tool,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::User => write!(f, "user"),
            Role::Model => write!(f, "model"),
            Role::Tool => write!(f, "tool"),
        }
    }
}

/// A tool invocation requested by the model.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ToolCall {
    /// Provider-assigned call ID, when the provider sends one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    /// Structured arguments (a JSON object).
    #[serde(default = "empty_args")]
    pub args: serde_json::Value,
}

fn empty_args() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl ToolCall {
    pub fn new(name: impl Into<String>, args: serde_json::Value) -> Self {
        Self {
            id: None,
            name: name.into(),
            args,
        }
    }
}

/// The structured output of one executed tool call.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct ToolResult {
    pub name: String,
    pub result: serde_json::Value,
}

impl ToolResult {
    pub fn new(name: impl Into<String>, result: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            result,
        }
    }

    /// Whether the payload reports a failure (`{"status": "error", ...}`).
    pub fn is_error(&self) -> bool {
        self.result.get("status").and_then(|s| s.as_str()) == Some("error")
    }
}

/// The single content kind carried by a message.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum MessageContent {
    Text(String),
    ToolCalls(Vec<ToolCall>),
    ToolResult(ToolResult),
}

/// A message in the conversation history.
///
/// Serializes as `{"id", "role", "text" | "tool_calls" | "tool_result"}`.
/// Build messages with the named constructors; they produce the only
/// role/content pairs the history codec round-trips.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    #[serde(flatten)]
    pub content: MessageContent,
}

impl Message {
    pub fn user(text: impl Into<String>) -> Self {
        Self::with_content(Role::User, MessageContent::Text(text.into()))
    }

    pub fn model_text(text: impl Into<String>) -> Self {
        Self::with_content(Role::Model, MessageContent::Text(text.into()))
    }

    pub fn model_tool_calls(calls: Vec<ToolCall>) -> Self {
        Self::with_content(Role::Model, MessageContent::ToolCalls(calls))
    }

    pub fn tool_result(result: ToolResult) -> Self {
        Self::with_content(Role::Tool, MessageContent::ToolResult(result))
    }

    /// Callers pair text with `User`/`Model`, calls with `Model`, and
    /// results with `Tool`; other pairs do not survive the history codec.
    pub(crate) fn with_content(role: Role, content: MessageContent) -> Self {
        Self {
            id: generate_message_id(),
            role,
            content,
        }
    }

    /// The plain text, if this is a text message.
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            MessageContent::Text(t) => Some(t),
            _ => None,
        }
    }

    /// The requested tool calls, if this is a tool-call message.
    pub fn tool_calls(&self) -> Option<&[ToolCall]> {
        match &self.content {
            MessageContent::ToolCalls(calls) => Some(calls),
            _ => None,
        }
    }

    /// The tool result, if this is a tool-result message.
    pub fn tool_result_content(&self) -> Option<&ToolResult> {
        match &self.content {
            MessageContent::ToolResult(r) => Some(r),
            _ => None,
        }
    }
}
