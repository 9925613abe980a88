//! Startup configuration.

/// Environment variables consulted for the Gemini API key, in order.
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("no API key found: set GEMINI_API_KEY (or API_KEY)")]
    MissingApiKey,
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Read the API key from the environment.
///
/// Blank values are treated as unset.
pub fn api_key_from_env() -> Result<String, ConfigError> {
    api_key_from(|name| std::env::var(name).ok())
}

/// Resolve the API key through `lookup`, trying each of [`API_KEY_VARS`].
pub fn api_key_from(lookup: impl Fn(&str) -> Option<String>) -> Result<String, ConfigError> {
    API_KEY_VARS
        .iter()
        .filter_map(|name| lookup(name))
        .map(|v| v.trim().to_string())
        .find(|v| !v.is_empty())
        .ok_or(ConfigError::MissingApiKey)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn prefers_gemini_key() {
        let vars = env(&[("GEMINI_API_KEY", "g"), ("API_KEY", "a")]);
        assert_eq!(api_key_from(|k| vars.get(k).cloned()), Ok("g".into()));
    }

    #[test]
    fn falls_back_to_api_key() {
        let vars = env(&[("GEMINI_API_KEY", "  "), ("API_KEY", "a")]);
        assert_eq!(api_key_from(|k| vars.get(k).cloned()), Ok("a".into()));
    }

    #[test]
    fn missing_key_is_error() {
        let vars = env(&[]);
        assert_eq!(
            api_key_from(|k| vars.get(k).cloned()),
            Err(ConfigError::MissingApiKey)
        );
    }
}
