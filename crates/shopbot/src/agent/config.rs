//! Configuration for the [`ChatOrchestrator`](super::orchestrator::ChatOrchestrator).
//!
//! ```ignore
//! let config = ChatConfig::default()
//!     .with_model("gemini-2.5-flash")
//!     .with_max_rounds(6)
//!     .with_max_output_tokens(1024)
//!     .with_retries(2);
//! ```

use crate::api::retry::RetryConfig;

/// Default cap on model calls per turn.
pub const DEFAULT_MAX_ROUNDS: u32 = 8;

/// Extra attempts allowed for a reply with neither text nor tool calls.
pub const MAX_EMPTY_RESPONSE_RETRIES: u32 = 2;

#[derive(Debug, Clone)]
pub struct ChatConfig {
    pub model: String,
    pub system_instruction: String,
    /// Maximum model calls in one turn, including continuations and empty
    /// reply retries.
    pub max_rounds: u32,
    pub max_output_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// Send the system instruction on continuation calls too, not only on
    /// the first call of a turn.
    pub resend_system_instruction: bool,
    /// Retry policy for transient client errors.
    pub retry: RetryConfig,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            model: crate::DEFAULT_MODEL.to_string(),
            system_instruction: crate::SYSTEM_INSTRUCTION.to_string(),
            max_rounds: DEFAULT_MAX_ROUNDS,
            max_output_tokens: None,
            temperature: None,
            resend_system_instruction: false,
            retry: RetryConfig::default(),
        }
    }
}

impl ChatConfig {
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = instruction.into();
        self
    }

    /// Set the round cap. Values below 1 are raised to 1.
    pub fn with_max_rounds(mut self, max_rounds: u32) -> Self {
        self.max_rounds = max_rounds.max(1);
        self
    }

    pub fn with_max_output_tokens(mut self, tokens: u32) -> Self {
        self.max_output_tokens = Some(tokens);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_resend_system_instruction(mut self, resend: bool) -> Self {
        self.resend_system_instruction = resend;
        self
    }

    pub fn with_retries(mut self, retries: u32) -> Self {
        self.retry = RetryConfig::with_retries(retries);
        self
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = ChatConfig::default();
        assert_eq!(c.model, "gemini-2.5-flash");
        assert_eq!(c.max_rounds, 8);
        assert!(!c.resend_system_instruction);
        assert_eq!(c.retry.max_retries, 0);
        assert!(c.system_instruction.starts_with("You are ShopBot"));
    }

    #[test]
    fn builders() {
        let c = ChatConfig::default()
            .with_model("gemini-2.0-flash")
            .with_max_rounds(0)
            .with_max_output_tokens(512)
            .with_temperature(0.2)
            .with_resend_system_instruction(true)
            .with_retries(3);
        assert_eq!(c.model, "gemini-2.0-flash");
        assert_eq!(c.max_rounds, 1);
        assert_eq!(c.max_output_tokens, Some(512));
        assert_eq!(c.temperature, Some(0.2));
        assert!(c.resend_system_instruction);
        assert_eq!(c.retry.max_retries, 3);
    }
}
