//! `reqwest` client for the Gemini `generateContent` endpoint.

use std::time::{Duration, Instant};

use tracing::{debug, trace};

use super::client::{GenerateFuture, GenerateRequest, ModelClient, ModelReply};
use super::error::ClientError;
use super::wire::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, ToolBlock,
};

/// Transport settings for [`GeminiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: crate::GEMINI_API_BASE.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl ClientConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Async HTTP client for the Gemini API.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    config: ClientConfig,
}

impl GeminiClient {
    /// Create a client with the default endpoint and a 60 s timeout.
    pub fn new(api_key: impl Into<String>) -> Result<Self, ClientError> {
        Self::with_config(api_key, ClientConfig::default())
    }

    pub fn with_config(api_key: impl Into<String>, config: ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("shopbot/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{model}:generateContent", self.config.base_url)
    }

    /// Send one `generateContent` request.
    pub async fn generate_content(&self, request: &GenerateRequest) -> Result<ModelReply, ClientError> {
        let body = build_body(request);
        debug!(
            "LLM request: model={}, contents={}, tools={}, system_instruction={}",
            request.model,
            body.contents.len(),
            request.tools.len(),
            body.system_instruction.is_some(),
        );
        trace!(
            "Request payload size: {} bytes",
            serde_json::to_string(&body).map_or(0, |s| s.len())
        );

        let start = Instant::now();

        let resp = self
            .client
            .post(self.endpoint(&request.model))
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = resp.status();
        let text = resp.text().await.map_err(|e| self.transport_error(e))?;

        debug!(
            "LLM response: HTTP {} in {:.1}s ({} bytes)",
            status,
            start.elapsed().as_secs_f64(),
            text.len()
        );

        if !status.is_success() {
            return Err(ClientError::Status {
                status: status.as_u16(),
                body: text,
            });
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| ClientError::Decode(e.to_string()))?;
        let reply = ModelReply::from_response(parsed)?;

        if let Some(usage) = reply.usage {
            debug!(
                "Token usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens,
                usage.completion_tokens,
                usage.total(),
            );
        }
        debug!(
            "LLM output: {} chars text, {} tool call(s)",
            reply.text.as_ref().map_or(0, |t| t.len()),
            reply.tool_calls.len()
        );

        Ok(reply)
    }

    fn transport_error(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout(self.config.timeout)
        } else {
            ClientError::Transport(e.to_string())
        }
    }
}

impl ModelClient for GeminiClient {
    fn generate<'a>(&'a self, request: &'a GenerateRequest) -> GenerateFuture<'a> {
        Box::pin(self.generate_content(request))
    }
}

/// Assemble the wire body for a request.
pub(crate) fn build_body(request: &GenerateRequest) -> GenerateContentRequest {
    let tools = (!request.tools.is_empty()).then(|| {
        vec![ToolBlock {
            function_declarations: request.tools.clone(),
        }]
    });
    GenerateContentRequest {
        contents: request.contents.clone(),
        tools,
        system_instruction: request.system_instruction.as_deref().map(Content::instruction),
        generation_config: GenerationConfig {
            max_output_tokens: request.max_output_tokens,
            temperature: request.temperature,
        },
    }
}
