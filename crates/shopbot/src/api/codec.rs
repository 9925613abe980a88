//! History Codec: conversation messages ⇄ Gemini wire turns.
//!
//! Encoding is pure and total. Each message becomes at most one [`Content`]:
//!
//! | Message | Wire role | Parts |
//! |---------|-----------|-------|
//! | user text | `user` | one `text` part |
//! | model text | `model` | one `text` part |
//! | model tool calls | `model` | one `functionCall` per call |
//! | tool result | `user` | one `functionResponse` (`{name, content}`) |
//!
//! Messages that would produce no parts (empty text, empty call list) are
//! dropped. Gemini only accepts `user` and `model` roles, so function
//! responses travel in a user turn.

use serde_json::json;

use super::wire::{Content, FunctionCall, FunctionResponse, Part, WireRole};
use crate::message::{Message, MessageContent, Role, ToolCall, ToolResult};

/// Encode a message history into Gemini `contents`.
pub fn encode_history(messages: &[Message]) -> Vec<Content> {
    messages.iter().filter_map(encode_message).collect()
}

fn encode_message(msg: &Message) -> Option<Content> {
    let parts = match &msg.content {
        MessageContent::Text(text) if text.is_empty() => vec![],
        MessageContent::Text(text) => vec![Part::text(text.clone())],
        MessageContent::ToolCalls(calls) => calls
            .iter()
            .map(|c| {
                Part::function_call(FunctionCall {
                    id: c.id.clone(),
                    name: c.name.clone(),
                    args: c.args.clone(),
                })
            })
            .collect(),
        MessageContent::ToolResult(result) => vec![Part::function_response(FunctionResponse {
            id: None,
            name: result.name.clone(),
            response: json!({"name": result.name, "content": result.result}),
        })],
    };
    if parts.is_empty() {
        return None;
    }
    Some(Content::new(wire_role(msg.role), parts))
}

fn wire_role(role: Role) -> WireRole {
    match role {
        Role::Model => WireRole::Model,
        Role::User | Role::Tool => WireRole::User,
    }
}

/// Decode Gemini `contents` back into messages.
///
/// Function responses become tool messages, function calls one model
/// tool-call message, and text parts a text message with the content's role.
/// A content holding both text and calls yields the text message first.
/// Message ids are freshly generated.
pub fn decode_history(contents: &[Content]) -> Vec<Message> {
    let mut out = Vec::new();
    for content in contents {
        let role = match content.role {
            Some(WireRole::Model) => Role::Model,
            Some(WireRole::User) | None => Role::User,
        };

        let text: String = content.parts.iter().filter_map(|p| p.text.as_deref()).collect();
        if !text.is_empty() {
            out.push(Message::with_content(role, MessageContent::Text(text)));
        }

        let calls: Vec<ToolCall> = content
            .parts
            .iter()
            .filter_map(|p| p.function_call.as_ref())
            .map(|fc| ToolCall {
                id: fc.id.clone(),
                name: fc.name.clone(),
                args: fc.args.clone(),
            })
            .collect();
        if !calls.is_empty() {
            out.push(Message::model_tool_calls(calls));
        }

        for fr in content.parts.iter().filter_map(|p| p.function_response.as_ref()) {
            // Unwrap the `{name, content}` envelope written by the encoder;
            // foreign responses are kept whole.
            let payload = fr
                .response
                .get("content")
                .cloned()
                .unwrap_or_else(|| fr.response.clone());
            out.push(Message::tool_result(ToolResult::new(fr.name.clone(), payload)));
        }
    }
    out
}
