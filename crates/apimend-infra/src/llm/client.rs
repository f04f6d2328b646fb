//! Minimal Anthropic Messages API client.
//!
//! Sends non-streaming completion requests to `/v1/messages`. The API key
//! is wrapped in [`secrecy::SecretString`] and is only exposed when
//! constructing request headers; it never appears in Debug output, error
//! strings, or tracing logs.

use std::time::Duration;

use apimend_types::transcript::{MessageRole, Transcript};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Errors from the LLM provider.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("LLM request failed: {0}")]
    Request(String),

    #[error("LLM authentication failed")]
    AuthenticationFailed,

    #[error("LLM rate limited")]
    RateLimited,

    #[error("LLM returned an unparseable response: {0}")]
    Malformed(String),
}

#[derive(Serialize)]
struct ApiRequest {
    model: String,
    max_tokens: u32,
    system: String,
    messages: Vec<ApiMessage>,
}

#[derive(Serialize)]
struct ApiMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: String,
}

/// Anthropic Messages API client.
pub struct AnthropicClient {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

// AnthropicClient intentionally does not derive Debug so the key cannot
// leak through formatting.

impl AnthropicClient {
    const API_VERSION: &'static str = "2023-06-01";
    const MAX_TOKENS: u32 = 8_192;

    pub fn new(api_key: SecretString, model: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("failed to create reqwest client");
        Self {
            client,
            api_key,
            base_url: "https://api.anthropic.com".to_string(),
            model: model.into(),
        }
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// One non-streaming completion. System messages in the transcript are
    /// folded into the system prompt; the rest map to API turns.
    pub async fn complete(
        &self,
        system: &str,
        transcript: &Transcript,
    ) -> Result<String, LlmError> {
        let mut system_prompt = system.to_string();
        let mut messages = Vec::with_capacity(transcript.len());
        for message in transcript.messages() {
            match message.role {
                MessageRole::System => {
                    system_prompt.push_str("\n\n");
                    system_prompt.push_str(&message.content);
                }
                role => messages.push(ApiMessage {
                    role: role.to_string(),
                    content: message.content.clone(),
                }),
            }
        }

        let body = ApiRequest {
            model: self.model.clone(),
            max_tokens: Self::MAX_TOKENS,
            system: system_prompt,
            messages,
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", Self::API_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Request(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimited,
                _ => LlmError::Request(format!("HTTP {status}: {error_body}")),
            });
        }

        let parsed: ApiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Malformed(format!("failed to parse response: {e}")))?;

        parsed
            .content
            .iter()
            .find(|block| block.kind == "text")
            .map(|block| block.text.clone())
            .ok_or_else(|| LlmError::Malformed("response contains no text block".to_string()))
    }
}
