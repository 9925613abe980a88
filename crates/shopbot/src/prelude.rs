//! Convenience re-exports for common `shopbot` types.
//!
//! ```ignore
//! use shopbot::prelude::*;
//! ```

// ── Core types ──────────────────────────────────────────────────────
pub use crate::json_schema_for;
pub use crate::message::{Message, MessageContent, Role, ToolCall, ToolResult};

// ── Model client ────────────────────────────────────────────────────
pub use crate::api::{
    ClientConfig, ClientError, GeminiClient, GenerateFuture, GenerateRequest, ModelClient,
    ModelReply, RetryConfig, UsageInfo, decode_history, encode_history,
};

// ── Orchestration ───────────────────────────────────────────────────
pub use crate::agent::{
    ChatConfig, ChatOrchestrator, CompositeEventHandler, Conversation, EventHandler,
    FnEventHandler, LoggingHandler, NoopHandler, ShopSession, TurnEvent, TurnOutcome, TurnStatus,
};

// ── Tools ───────────────────────────────────────────────────────────
pub use crate::tools::{
    Cart, OrderLookup, RecommendationFeed, ShopTool, ToolError, ToolRegistry,
};

// ── Configuration ───────────────────────────────────────────────────
pub use crate::config::{ConfigError, api_key_from_env};
