//! Shopping-assistant chat orchestration on top of the Gemini
//! function-calling API.
//!
//! `shopbot` mediates between a stateless message history and an LLM that may
//! request zero or more tool invocations before producing a final answer. The
//! core abstraction is the [`ChatOrchestrator`](agent::orchestrator::ChatOrchestrator):
//! it sends the history to the model, executes any requested tools through the
//! [`ToolRegistry`](tools::registry::ToolRegistry), appends the results, and
//! repeats until the model produces plain text or the round cap is reached.
//!
//! # Getting started
//!
//! ```ignore
//! use shopbot::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let api_key = shopbot::config::api_key_from_env()?;
//!     let client = GeminiClient::new(api_key)?;
//!     let tools = ToolRegistry::new();
//!     let config = ChatConfig::default().with_max_rounds(6);
//!
//!     let orchestrator = ChatOrchestrator::new(&client, &tools, config);
//!     let mut conversation = Conversation::new("CUST_12345");
//!
//!     let outcome = orchestrator
//!         .run_turn(&conversation.history, "show me headphones", &mut conversation.session)
//!         .await;
//!     conversation.extend(outcome.messages);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`message`] | Conversation messages, tool calls, tool results |
//! | [`api`] | Gemini client, History Codec, retry, client errors |
//! | [`tools`] | The six shopping tools and their registry |
//! | [`agent`] | Orchestrator loop, configuration, events, sessions |
//! | [`config`] | Startup configuration (API credential) |

pub mod agent;
pub mod api;
pub mod config;
pub mod ids;
pub mod message;
pub mod prelude;
pub mod tools;

use schemars::JsonSchema;

// Re-export schemars for downstream crates.
pub use schemars;

// ── Constants ──────────────────────────────────────────────────────

/// Base URL of the Gemini REST API.
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Default model for all turns.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Persona sent as the system instruction on the first call of a turn.
pub const SYSTEM_INSTRUCTION: &str = "You are ShopBot, a helpful and friendly AI shopping \
assistant. You can search products, check orders, manage carts, apply discounts and suggest \
items. Be concise and helpful.";

/// Greeting shown as the first model message of every conversation.
pub const GREETING: &str = "Hello! I'm ShopBot, your AI shopping assistant. How can I help you \
today? You can ask me to find products, check your order status, and more!";

/// Reply returned in place of a turn that failed on a model call.
pub const APOLOGY_TEXT: &str = "I'm sorry, I encountered an error. Please try again.";

/// Reply appended when a turn runs out of rounds.
pub const EXHAUSTED_TEXT: &str =
    "I'm sorry, I couldn't complete that request. Please try again.";

// ── Schema generation ──────────────────────────────────────────────

/// Generate a JSON Schema `serde_json::Value` from a type that implements
/// `schemars::JsonSchema`.
///
/// The full schema is what argument validation runs against. Use
/// [`tools::schema::declaration_schema`] to reduce it to the subset accepted
/// by Gemini function declarations.
///
/// ```
/// use shopbot::json_schema_for;
/// use schemars::JsonSchema;
/// use serde::Deserialize;
///
/// #[derive(Deserialize, JsonSchema)]
/// struct LookupArgs {
///     sku: String,
///     #[serde(default)]
///     note: Option<String>,
/// }
///
/// let schema = json_schema_for::<LookupArgs>();
/// assert_eq!(schema["type"], "object");
/// assert!(schema["required"].as_array().unwrap().contains(&"sku".into()));
/// ```
pub fn json_schema_for<T: JsonSchema>() -> serde_json::Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(schema)
        .unwrap_or_else(|_| serde_json::json!({"type": "object", "properties": {}}))
}
