//! API interaction layer: everything between the
//! [`ChatOrchestrator`](crate::agent::orchestrator::ChatOrchestrator) loop and
//! the Gemini API.
//!
//! - [`client`]: the [`ModelClient`] seam: a provider-agnostic
//!   `generate(request) -> reply` capability.
//! - [`gemini`]: [`GeminiClient`], the `reqwest` implementation against
//!   `models/{model}:generateContent`.
//! - [`wire`]: serde types for the Gemini request/response bodies.
//! - [`codec`]: the History Codec: message history ⇄ wire turns.
//! - [`retry`]: transient error retry with exponential backoff and jitter.
//! - [`error`]: [`ClientError`].

pub mod client;
pub mod codec;
pub mod error;
pub mod gemini;
pub mod retry;
pub mod wire;

// Re-export commonly used items at the module level.
pub use client::{GenerateFuture, GenerateRequest, ModelClient, ModelReply, UsageInfo};
pub use codec::{decode_history, encode_history};
pub use error::ClientError;
pub use gemini::{ClientConfig, GeminiClient};
pub use retry::RetryConfig;
