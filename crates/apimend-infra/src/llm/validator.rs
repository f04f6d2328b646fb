//! LLM-backed response validation.
//!
//! Judges whether a healed attempt's response actually satisfies the call's
//! instruction (and schema, when present). Only invoked for attempts that
//! went through synthesis; first-attempt configs are trusted.

use apimend_core::call::{ResponseValidator, Verdict};
use apimend_core::mask::truncate;
use apimend_types::error::CallError;
use apimend_types::transcript::Transcript;
use serde::Deserialize;
use serde_json::Value;

use super::client::AnthropicClient;
use super::strip_code_fences;

const VALIDATION_PROMPT: &str = "You judge whether an API response satisfies the caller's \
intent. Given the intent, an optional JSON Schema, and the response, reply with a single JSON \
object {\"success\": true|false, \"reason\": \"<one short sentence>\"}. JSON only, no prose.";

/// Maximum characters of response data included in a validation prompt.
const PROMPT_DATA_LEN: usize = 4000;

#[derive(Deserialize)]
struct VerdictReply {
    success: bool,
    #[serde(default)]
    reason: String,
}

/// [`ResponseValidator`] implementation backed by the Anthropic client.
pub struct LlmResponseValidator {
    client: AnthropicClient,
}

impl LlmResponseValidator {
    pub fn new(client: AnthropicClient) -> Self {
        Self { client }
    }
}

impl ResponseValidator for LlmResponseValidator {
    async fn validate(
        &self,
        data: &Value,
        schema: Option<&Value>,
        instruction: &str,
    ) -> Result<Verdict, CallError> {
        let mut prompt = Transcript::new();
        let mut request = format!("Intent: {instruction}");
        if let Some(schema) = schema {
            request.push_str("\nExpected schema: ");
            request.push_str(&schema.to_string());
        }
        request.push_str("\nResponse: ");
        request.push_str(&truncate(&data.to_string(), PROMPT_DATA_LEN));
        prompt.push_user(request);

        let reply = self
            .client
            .complete(VALIDATION_PROMPT, &prompt)
            .await
            .map_err(|e| CallError::Transport(format!("response validation failed: {e}")))?;

        let verdict: VerdictReply =
            serde_json::from_str(strip_code_fences(&reply)).map_err(|e| {
                CallError::Transport(format!("validator produced an unparseable verdict: {e}"))
            })?;

        Ok(if verdict.success {
            Verdict::pass()
        } else {
            Verdict::fail(verdict.reason)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_verdict_reply_parses() {
        let reply: VerdictReply =
            serde_json::from_str(r#"{"success": false, "reason": "missing orders field"}"#)
                .unwrap();
        assert!(!reply.success);
        assert_eq!(reply.reason, "missing orders field");
    }

    #[test]
    fn test_verdict_reply_reason_optional() {
        let reply: VerdictReply = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(reply.success);
        assert!(reply.reason.is_empty());
    }
}
