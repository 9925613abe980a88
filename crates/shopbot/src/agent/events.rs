//! Events emitted while a turn runs, and the handlers that observe them.
//!
//! | Handler | Use case |
//! |---------|----------|
//! | [`NoopHandler`] | Tests or fire-and-forget turns |
//! | [`LoggingHandler`] | Structured logging via `tracing` |
//! | [`FnEventHandler`] | Quick closures for simple callbacks |
//! | [`CompositeEventHandler`] | Compose multiple handlers in order |

use serde_json::Value;
use tracing::{debug, error, info, warn};

// ── Events ─────────────────────────────────────────────────────────

/// Events emitted by the orchestrator during a turn.
#[derive(Debug)]
pub enum TurnEvent<'a> {
    /// A model call is about to be made.
    RoundStart { round: u32, max_rounds: u32 },
    /// The model produced final text.
    Text(&'a str),
    /// The model requested tool calls this round.
    ToolCallsReceived { round: u32, count: usize },
    /// A tool is about to be executed.
    ToolExecuting { name: &'a str, args: &'a Value },
    /// A tool finished.
    ToolResult {
        name: &'a str,
        result: &'a Value,
        is_error: bool,
    },
    /// Token usage reported for one model call.
    TokenUsage {
        prompt_tokens: u32,
        completion_tokens: u32,
    },
    /// The model returned neither text nor tool calls.
    EmptyResponse {
        round: u32,
        attempt: u32,
        max_retries: u32,
    },
    /// The turn ended normally.
    Finished,
    /// The turn used every round without a final answer.
    RoundLimitReached { max_rounds: u32 },
    /// A model call failed and the turn was abandoned.
    TurnFailed { error: &'a str },
}

impl TurnEvent<'_> {
    /// Total tokens for a `TokenUsage` event.
    pub fn total_tokens(&self) -> Option<u64> {
        if let TurnEvent::TokenUsage {
            prompt_tokens,
            completion_tokens,
        } = self
        {
            Some(u64::from(*prompt_tokens) + u64::from(*completion_tokens))
        } else {
            None
        }
    }
}

/// Handler for turn events.
pub trait EventHandler: Send + Sync {
    fn on_event(&self, event: &TurnEvent<'_>) {
        let _ = event;
    }
}

/// Ignores every event.
pub struct NoopHandler;
impl EventHandler for NoopHandler {}

/// An event handler backed by a closure.
///
/// ```ignore
/// let handler = FnEventHandler::new(|event| {
///     if let TurnEvent::Text(text) = event {
///         println!("{text}");
///     }
/// });
/// ```
pub struct FnEventHandler<F>(F)
where
    F: Fn(&TurnEvent<'_>) + Send + Sync;

impl<F> FnEventHandler<F>
where
    F: Fn(&TurnEvent<'_>) + Send + Sync,
{
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<F> EventHandler for FnEventHandler<F>
where
    F: Fn(&TurnEvent<'_>) + Send + Sync,
{
    fn on_event(&self, event: &TurnEvent<'_>) {
        (self.0)(event)
    }
}

/// Dispatches each event to several handlers, in registration order.
///
/// ```ignore
/// let handler = CompositeEventHandler::new()
///     .with(LoggingHandler)
///     .with_opt(broadcast_handler);
/// ```
pub struct CompositeEventHandler {
    handlers: Vec<Box<dyn EventHandler>>,
}

impl CompositeEventHandler {
    pub fn new() -> Self {
        Self {
            handlers: Vec::new(),
        }
    }

    pub fn with(mut self, handler: impl EventHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Add a handler from an `Option`. `None` is a no-op.
    pub fn with_opt(self, handler: Option<impl EventHandler + 'static>) -> Self {
        match handler {
            Some(h) => self.with(h),
            None => self,
        }
    }
}

impl Default for CompositeEventHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for CompositeEventHandler {
    fn on_event(&self, event: &TurnEvent<'_>) {
        for handler in &self.handlers {
            handler.on_event(event);
        }
    }
}

/// Logs every event through `tracing`.
pub struct LoggingHandler;

impl EventHandler for LoggingHandler {
    fn on_event(&self, event: &TurnEvent<'_>) {
        match event {
            TurnEvent::RoundStart { round, max_rounds } => {
                info!("[round {round}/{max_rounds}]");
            }
            TurnEvent::Text(text) => {
                let preview: String = text.chars().take(200).collect();
                debug!(
                    "LLM text: {preview}{}",
                    if text.chars().count() > 200 { "..." } else { "" }
                );
            }
            TurnEvent::ToolCallsReceived { round, count } => {
                debug!("{count} tool call(s) in round {round}");
            }
            TurnEvent::ToolExecuting { name, .. } => {
                debug!("Executing tool: {name}");
            }
            TurnEvent::ToolResult { name, is_error, .. } => {
                if *is_error {
                    warn!("Tool {name} returned an error result");
                } else {
                    debug!("Tool {name} succeeded");
                }
            }
            TurnEvent::TokenUsage {
                prompt_tokens,
                completion_tokens,
            } => {
                debug!(
                    "Tokens: prompt={prompt_tokens}, completion={completion_tokens}, total={}",
                    event.total_tokens().unwrap_or_default()
                );
            }
            TurnEvent::EmptyResponse {
                round,
                attempt,
                max_retries,
            } => {
                warn!(
                    "Empty API response at round {round} (no text, no tool calls). \
                     Retrying ({attempt}/{max_retries})..."
                );
            }
            TurnEvent::Finished => info!("Turn finished"),
            TurnEvent::RoundLimitReached { max_rounds } => {
                info!("Turn hit round limit ({max_rounds})");
            }
            TurnEvent::TurnFailed { error: e } => error!("Turn failed: {e}"),
        }
    }
}
