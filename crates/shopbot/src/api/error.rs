//! Errors raised while talking to the model provider.

use std::time::Duration;

/// A failed model call.
///
/// Every variant aborts the current turn. [`is_transient`](Self::is_transient)
/// decides whether the call is worth retrying.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ClientError {
    #[error("failed to build HTTP client: {0}")]
    Build(String),
    #[error("request failed: {0}")]
    Transport(String),
    #[error("request timed out after {0:?}")]
    Timeout(Duration),
    #[error("Gemini API HTTP {status}: {body}")]
    Status { status: u16, body: String },
    #[error("Gemini API error: {0}")]
    Api(String),
    #[error("failed to parse response: {0}")]
    Decode(String),
    #[error("prompt blocked by the provider: {0}")]
    Blocked(String),
}

impl ClientError {
    /// Whether the failure is transient: network trouble, timeouts, rate
    /// limiting, or a 5xx from the provider. Bad requests, auth failures,
    /// undecodable bodies and blocked prompts are permanent.
    pub fn is_transient(&self) -> bool {
        match self {
            ClientError::Transport(_) | ClientError::Timeout(_) => true,
            ClientError::Status { status, .. } => matches!(status, 429 | 500 | 502 | 503 | 504),
            ClientError::Build(_)
            | ClientError::Api(_)
            | ClientError::Decode(_)
            | ClientError::Blocked(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_statuses() {
        for status in [429, 500, 502, 503, 504] {
            let e = ClientError::Status {
                status,
                body: String::new(),
            };
            assert!(e.is_transient(), "{status} should be transient");
        }
    }

    #[test]
    fn permanent_statuses() {
        for status in [400, 401, 403, 404] {
            let e = ClientError::Status {
                status,
                body: String::new(),
            };
            assert!(!e.is_transient(), "{status} should be permanent");
        }
    }

    #[test]
    fn network_errors_are_transient() {
        assert!(ClientError::Transport("connection reset".into()).is_transient());
        assert!(ClientError::Timeout(Duration::from_secs(60)).is_transient());
        assert!(!ClientError::Decode("eof".into()).is_transient());
    }

    #[test]
    fn display_includes_status() {
        let e = ClientError::Status {
            status: 503,
            body: "overloaded".into(),
        };
        assert_eq!(e.to_string(), "Gemini API HTTP 503: overloaded");
    }
}
