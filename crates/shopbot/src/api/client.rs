//! The model-call seam between the orchestrator and a provider.

use std::future::Future;
use std::pin::Pin;

use tracing::warn;

use super::error::ClientError;
use super::wire::{Content, FunctionDeclaration, GenerateContentResponse, UsageMetadata};
use crate::message::ToolCall;

/// One model call: the encoded history plus everything the provider needs to
/// answer it.
#[derive(Debug, Clone)]
pub struct GenerateRequest {
    pub model: String,
    pub contents: Vec<Content>,
    pub tools: Vec<FunctionDeclaration>,
    /// `None` leaves the system instruction out of this call.
    pub system_instruction: Option<String>,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
}

/// Token usage statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct UsageInfo {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
}

impl UsageInfo {
    pub fn total(&self) -> u32 {
        self.prompt_tokens + self.completion_tokens
    }

    pub fn add(&mut self, other: UsageInfo) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
    }
}

impl From<UsageMetadata> for UsageInfo {
    fn from(m: UsageMetadata) -> Self {
        Self {
            prompt_tokens: m.prompt_token_count.unwrap_or(0),
            completion_tokens: m.candidates_token_count.unwrap_or(0),
        }
    }
}

/// The part of a model reply the orchestrator acts on.
///
/// `tool_calls` is non-empty only when the reply's first part was a function
/// call; in that case `text` is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ModelReply {
    pub text: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Option<UsageInfo>,
    pub finish_reason: Option<String>,
}

impl ModelReply {
    /// Plain text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    /// Reply requesting the given tool calls.
    pub fn calls(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            ..Default::default()
        }
    }

    /// A reply with neither text nor tool calls.
    pub fn is_empty(&self) -> bool {
        self.tool_calls.is_empty() && self.text.as_deref().is_none_or(str::is_empty)
    }

    /// Interpret a decoded `generateContent` response.
    ///
    /// Only the first candidate is read. If its first part is a function call,
    /// every function-call part becomes a [`ToolCall`] and text parts are
    /// ignored. Otherwise the text parts are concatenated and any function
    /// calls after the leading text are dropped.
    pub fn from_response(response: GenerateContentResponse) -> Result<Self, ClientError> {
        if let Some(err) = response.error {
            return Err(ClientError::Api(err.message));
        }

        let usage = response.usage_metadata.map(UsageInfo::from);

        let Some(candidate) = response.candidates.into_iter().next() else {
            if let Some(reason) = response.prompt_feedback.and_then(|f| f.block_reason) {
                return Err(ClientError::Blocked(reason));
            }
            return Ok(Self {
                usage,
                ..Default::default()
            });
        };

        let finish_reason = candidate.finish_reason;
        let parts = candidate.content.map(|c| c.parts).unwrap_or_default();

        let leading_call = parts.first().is_some_and(|p| p.function_call.is_some());
        if leading_call {
            let tool_calls = parts
                .into_iter()
                .filter_map(|p| p.function_call)
                .map(|fc| ToolCall {
                    id: fc.id,
                    name: fc.name,
                    args: normalize_args(fc.args),
                })
                .collect();
            return Ok(Self {
                text: None,
                tool_calls,
                usage,
                finish_reason,
            });
        }

        let dropped = parts.iter().filter(|p| p.function_call.is_some()).count();
        if dropped > 0 {
            warn!("Ignoring {dropped} function call(s) that followed a text part");
        }

        let text: String = parts.into_iter().filter_map(|p| p.text).collect();
        Ok(Self {
            text: (!text.is_empty()).then_some(text),
            tool_calls: vec![],
            usage,
            finish_reason,
        })
    }
}

/// Gemini omits `args` for parameterless calls; treat that as `{}`.
fn normalize_args(args: serde_json::Value) -> serde_json::Value {
    if args.is_null() {
        serde_json::json!({})
    } else {
        args
    }
}

/// Boxed future returned by [`ModelClient::generate`].
///
/// Boxing keeps the trait dyn-compatible so the orchestrator can hold a
/// `&dyn ModelClient`.
pub type GenerateFuture<'a> =
    Pin<Box<dyn Future<Output = Result<ModelReply, ClientError>> + Send + 'a>>;

/// A provider that can answer one model call.
///
/// [`GeminiClient`](super::gemini::GeminiClient) is the production
/// implementation; tests substitute scripted fakes.
pub trait ModelClient: Send + Sync {
    fn generate<'a>(&'a self, request: &'a GenerateRequest) -> GenerateFuture<'a>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: serde_json::Value) -> Result<ModelReply, ClientError> {
        let resp: GenerateContentResponse = serde_json::from_value(v).unwrap();
        ModelReply::from_response(resp)
    }

    #[test]
    fn text_reply() {
        let reply = parse(json!({
            "candidates": [{"content": {"role": "model", "parts": [{"text": "Hi "}, {"text": "there"}]}, "finishReason": "STOP"}],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4}
        }))
        .unwrap();
        assert_eq!(reply.text.as_deref(), Some("Hi there"));
        assert!(reply.tool_calls.is_empty());
        assert_eq!(
            reply.usage,
            Some(UsageInfo {
                prompt_tokens: 12,
                completion_tokens: 4
            })
        );
        assert_eq!(reply.finish_reason.as_deref(), Some("STOP"));
    }

    #[test]
    fn leading_function_call_collects_all_calls() {
        let reply = parse(json!({
            "candidates": [{"content": {"role": "model", "parts": [
                {"functionCall": {"name": "search_products", "args": {"query": "headphones"}}},
                {"text": "ignored"},
                {"functionCall": {"name": "get_cart_contents"}}
            ]}}]
        }))
        .unwrap();
        assert!(reply.text.is_none());
        assert_eq!(reply.tool_calls.len(), 2);
        assert_eq!(reply.tool_calls[0].args["query"], "headphones");
        assert_eq!(reply.tool_calls[1].args, json!({}));
    }

    #[test]
    fn calls_after_text_are_dropped() {
        let reply = parse(json!({
            "candidates": [{"content": {"parts": [
                {"text": "Let me check."},
                {"functionCall": {"name": "get_cart_contents", "args": {}}}
            ]}}]
        }))
        .unwrap();
        assert_eq!(reply.text.as_deref(), Some("Let me check."));
        assert!(reply.tool_calls.is_empty());
    }

    #[test]
    fn no_candidates_is_empty() {
        let reply = parse(json!({"candidates": []})).unwrap();
        assert!(reply.is_empty());
    }

    #[test]
    fn blocked_prompt_is_error() {
        let err = parse(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap_err();
        assert_eq!(err, ClientError::Blocked("SAFETY".into()));
    }

    #[test]
    fn error_body_is_error() {
        let err = parse(json!({"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}))
            .unwrap_err();
        assert!(matches!(err, ClientError::Api(m) if m == "API key not valid"));
    }

    #[test]
    fn usage_accumulates() {
        let mut total = UsageInfo::default();
        total.add(UsageInfo {
            prompt_tokens: 10,
            completion_tokens: 2,
        });
        total.add(UsageInfo {
            prompt_tokens: 5,
            completion_tokens: 1,
        });
        assert_eq!(total.total(), 18);
    }
}
