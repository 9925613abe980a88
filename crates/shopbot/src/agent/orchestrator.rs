//! The chat orchestration loop.
//!
//! One call to [`ChatOrchestrator::run_turn`] takes a user message from
//! input to final answer:
//!
//! 1. Encode the prior history plus the new user message and call the model
//!    with the tool declarations (and, on the first call, the system
//!    instruction).
//! 2. If the reply leads with function calls, record them as one model
//!    message, execute each call in order through the
//!    [`ToolRegistry`], record one tool-result message per call, and call the
//!    model again.
//! 3. Otherwise the reply's text becomes the final model message.
//!
//! The loop is bounded by [`ChatConfig::max_rounds`]. A client error on any
//! model call abandons the turn; the outcome then holds a single apology
//! message. Tool side effects already applied to the session are kept.

use std::time::Duration;

use serde::Serialize;
use tracing::{error, info, warn};

use super::config::{ChatConfig, MAX_EMPTY_RESPONSE_RETRIES};
use super::events::{EventHandler, NoopHandler, TurnEvent};
use super::session::ShopSession;
use crate::api::client::{GenerateRequest, ModelClient, ModelReply, UsageInfo};
use crate::api::codec::encode_history;
use crate::api::error::ClientError;
use crate::api::retry::retry_call;
use crate::ids::generate_turn_id;
use crate::message::{Message, ToolCall};
use crate::tools::registry::ToolRegistry;

/// Base delay between attempts after an empty reply; scaled by attempt.
const EMPTY_RESPONSE_BACKOFF: Duration = Duration::from_millis(200);

/// How a turn ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum TurnStatus {
    /// The model produced a final answer (or kept replying empty).
    Completed,
    /// Every round was spent on tool calls.
    Exhausted { rounds: u32 },
    /// A model call failed; the message is the client error.
    Failed(String),
}

impl TurnStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TurnStatus::Completed => "completed",
            TurnStatus::Exhausted { .. } => "exhausted",
            TurnStatus::Failed(_) => "failed",
        }
    }
}

/// Result of one turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    pub turn_id: String,
    /// New messages in order, to be appended to the history.
    pub messages: Vec<Message>,
    pub status: TurnStatus,
    /// Model calls made, including empty-reply retries.
    pub rounds_used: u32,
    pub usage: UsageInfo,
}

impl TurnOutcome {
    /// Text of the last model text message, if any.
    pub fn final_text(&self) -> Option<&str> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.role == crate::message::Role::Model)
            .and_then(Message::text)
    }
}

/// What one model reply asks the loop to do next.
enum RoundStep {
    Calls(Vec<ToolCall>),
    Final(String),
    Empty,
}

impl From<ModelReply> for RoundStep {
    fn from(reply: ModelReply) -> Self {
        if !reply.tool_calls.is_empty() {
            return RoundStep::Calls(reply.tool_calls);
        }
        match reply.text {
            Some(text) if !text.is_empty() => RoundStep::Final(text),
            _ => RoundStep::Empty,
        }
    }
}

/// Runs turns against a model client and a tool registry.
pub struct ChatOrchestrator<'a> {
    client: &'a dyn ModelClient,
    tools: &'a ToolRegistry,
    config: ChatConfig,
    event_handler: &'a dyn EventHandler,
}

impl<'a> ChatOrchestrator<'a> {
    pub fn new(client: &'a dyn ModelClient, tools: &'a ToolRegistry, config: ChatConfig) -> Self {
        Self {
            client,
            tools,
            config,
            event_handler: &NoopHandler,
        }
    }

    pub fn with_event_handler(mut self, handler: &'a dyn EventHandler) -> Self {
        self.event_handler = handler;
        self
    }

    pub fn config(&self) -> &ChatConfig {
        &self.config
    }

    /// Run one turn for `user_text` on top of `prior`.
    ///
    /// `prior` is not modified; append [`TurnOutcome::messages`] to it.
    pub async fn run_turn(
        &self,
        prior: &[Message],
        user_text: &str,
        session: &mut ShopSession,
    ) -> TurnOutcome {
        let turn_id = generate_turn_id();
        let max_rounds = self.config.max_rounds.max(1);
        info!(
            "Turn started: turn_id={turn_id}, model={}, prior_messages={}",
            self.config.model,
            prior.len()
        );

        let mut messages = vec![Message::user(user_text)];
        let mut usage = UsageInfo::default();
        let mut empty_retries: u32 = 0;

        for round in 0..max_rounds {
            let rounds_used = round + 1;
            self.event_handler.on_event(&TurnEvent::RoundStart {
                round: rounds_used,
                max_rounds,
            });

            let request = self.build_request(prior, &messages, round == 0);
            let reply = match self.call_model(&request).await {
                Ok(reply) => reply,
                Err(e) => return self.failed(turn_id, &e, rounds_used, usage),
            };

            if let Some(u) = reply.usage {
                usage.add(u);
                self.event_handler.on_event(&TurnEvent::TokenUsage {
                    prompt_tokens: u.prompt_tokens,
                    completion_tokens: u.completion_tokens,
                });
            }

            match RoundStep::from(reply) {
                RoundStep::Calls(calls) => {
                    empty_retries = 0;
                    self.event_handler.on_event(&TurnEvent::ToolCallsReceived {
                        round: rounds_used,
                        count: calls.len(),
                    });
                    messages.push(Message::model_tool_calls(calls.clone()));
                    for call in &calls {
                        self.event_handler.on_event(&TurnEvent::ToolExecuting {
                            name: &call.name,
                            args: &call.args,
                        });
                        let result = self.tools.invoke(call, session).await;
                        self.event_handler.on_event(&TurnEvent::ToolResult {
                            name: &result.name,
                            result: &result.result,
                            is_error: result.is_error(),
                        });
                        messages.push(Message::tool_result(result));
                    }
                }
                RoundStep::Final(text) => {
                    self.event_handler.on_event(&TurnEvent::Text(&text));
                    messages.push(Message::model_text(text));
                    return self.completed(turn_id, messages, rounds_used, usage);
                }
                RoundStep::Empty => {
                    empty_retries += 1;
                    if empty_retries <= MAX_EMPTY_RESPONSE_RETRIES {
                        self.event_handler.on_event(&TurnEvent::EmptyResponse {
                            round: rounds_used,
                            attempt: empty_retries,
                            max_retries: MAX_EMPTY_RESPONSE_RETRIES,
                        });
                        tokio::time::sleep(EMPTY_RESPONSE_BACKOFF * empty_retries).await;
                        continue;
                    }
                    warn!(
                        "Empty API response persisted after {MAX_EMPTY_RESPONSE_RETRIES} retries. \
                         Ending turn without a reply."
                    );
                    return self.completed(turn_id, messages, rounds_used, usage);
                }
            }
        }

        self.event_handler
            .on_event(&TurnEvent::RoundLimitReached { max_rounds });
        messages.push(Message::model_text(crate::EXHAUSTED_TEXT));
        info!(
            "Turn exhausted: turn_id={turn_id}, rounds={max_rounds}, messages={}",
            messages.len()
        );
        TurnOutcome {
            turn_id,
            messages,
            status: TurnStatus::Exhausted { rounds: max_rounds },
            rounds_used: max_rounds,
            usage,
        }
    }

    fn build_request(&self, prior: &[Message], new: &[Message], first_call: bool) -> GenerateRequest {
        let mut contents = encode_history(prior);
        contents.extend(encode_history(new));
        let send_instruction = first_call || self.config.resend_system_instruction;
        GenerateRequest {
            model: self.config.model.clone(),
            contents,
            tools: self.tools.definitions().to_vec(),
            system_instruction: (send_instruction && !self.config.system_instruction.is_empty())
                .then(|| self.config.system_instruction.clone()),
            max_output_tokens: self.config.max_output_tokens,
            temperature: self.config.temperature,
        }
    }

    async fn call_model(&self, request: &GenerateRequest) -> Result<ModelReply, ClientError> {
        let client = self.client;
        retry_call(&self.config.retry, || client.generate(request)).await
    }

    fn completed(
        &self,
        turn_id: String,
        messages: Vec<Message>,
        rounds_used: u32,
        usage: UsageInfo,
    ) -> TurnOutcome {
        self.event_handler.on_event(&TurnEvent::Finished);
        info!(
            "Turn completed: turn_id={turn_id}, rounds={rounds_used}, messages={}, tokens={}",
            messages.len(),
            usage.total()
        );
        TurnOutcome {
            turn_id,
            messages,
            status: TurnStatus::Completed,
            rounds_used,
            usage,
        }
    }

    fn failed(
        &self,
        turn_id: String,
        err: &ClientError,
        rounds_used: u32,
        usage: UsageInfo,
    ) -> TurnOutcome {
        let reason = err.to_string();
        error!("Turn failed: turn_id={turn_id}, round={rounds_used}: {reason}");
        self.event_handler
            .on_event(&TurnEvent::TurnFailed { error: &reason });
        TurnOutcome {
            turn_id,
            messages: vec![Message::model_text(crate::APOLOGY_TEXT)],
            status: TurnStatus::Failed(reason),
            rounds_used,
            usage,
        }
    }
}
