//! LLM-backed config synthesis.
//!
//! Builds a repair prompt from the failing config, integration
//! documentation, payload shape, and credential names (never values), sends
//! it with the accumulated failure transcript, and parses the model's reply
//! as a partial config merged over the current one.

use apimend_core::call::{ConfigSynthesizer, Synthesis};
use apimend_types::config::ApiConfig;
use apimend_types::credentials::Credentials;
use apimend_types::error::CallError;
use apimend_types::transcript::Transcript;
use serde_json::{Map, Value, json};

use super::client::AnthropicClient;
use super::strip_code_fences;

const SYNTHESIS_PROMPT: &str = "You repair failing API call configurations. Given the current \
configuration, API documentation, the request payload shape, and the failures so far, reply with \
a corrected configuration as a single JSON object. You may change url_host, url_path, method, \
headers, query_params, body, response_schema, and response_mapping. Reference secrets with \
{placeholder} syntax using only the listed credential names. Reply with JSON only, no prose.";

const SELECTOR_PROMPT: &str = "You write JEXL expressions that select the array of items a loop \
should iterate over from a JSON payload. Given the call's intent and the payload's top-level \
shape, reply with only the expression (for example `data.items`), or the single word NONE when \
no array of items can be identified. No prose, no code fences.";

/// [`ConfigSynthesizer`] implementation backed by the Anthropic client.
pub struct LlmConfigSynthesizer {
    client: AnthropicClient,
}

impl LlmConfigSynthesizer {
    pub fn new(client: AnthropicClient) -> Self {
        Self { client }
    }
}

impl ConfigSynthesizer for LlmConfigSynthesizer {
    async fn synthesize(
        &self,
        config: &ApiConfig,
        documentation: &str,
        payload: &Value,
        credentials: &Credentials,
        attempt: u32,
        mut transcript: Transcript,
    ) -> Result<Synthesis, CallError> {
        let system = build_synthesis_context(config, documentation, payload, credentials);

        tracing::debug!(
            config_id = config.id.as_str(),
            attempt,
            transcript_len = transcript.len(),
            "requesting config synthesis"
        );

        let reply = self
            .client
            .complete(&system, &transcript)
            .await
            .map_err(|e| CallError::Transport(format!("config synthesis failed: {e}")))?;

        let healed = parse_config_reply(&reply, config)?;
        transcript.push_assistant(reply);

        Ok(Synthesis {
            config: healed,
            transcript,
        })
    }

    async fn synthesize_selector(
        &self,
        instruction: &str,
        payload_summary: &Value,
    ) -> Result<Option<String>, CallError> {
        let mut prompt = Transcript::new();
        prompt.push_user(format!(
            "Intent: {instruction}\nPayload shape: {payload_summary}"
        ));

        let reply = self
            .client
            .complete(SELECTOR_PROMPT, &prompt)
            .await
            .map_err(|e| CallError::Transport(format!("selector synthesis failed: {e}")))?;

        let expression = strip_code_fences(&reply).trim_matches('`').trim().to_string();
        if expression.is_empty() || expression.eq_ignore_ascii_case("none") {
            return Ok(None);
        }
        Ok(Some(expression))
    }
}

/// System prompt carrying everything the model needs except the failures,
/// which arrive as transcript turns. Credential values never appear; only
/// their names do.
fn build_synthesis_context(
    config: &ApiConfig,
    documentation: &str,
    payload: &Value,
    credentials: &Credentials,
) -> String {
    let mut credential_names: Vec<&str> = credentials.iter().map(|(name, _)| name).collect();
    credential_names.sort_unstable();

    let mut context = format!(
        "{SYNTHESIS_PROMPT}\n\nCurrent configuration:\n{}\n\nAvailable credential placeholders: {}\n\nPayload shape:\n{}",
        serde_json::to_string_pretty(config).unwrap_or_default(),
        if credential_names.is_empty() {
            "(none)".to_string()
        } else {
            credential_names
                .iter()
                .map(|name| format!("{{{name}}}"))
                .collect::<Vec<_>>()
                .join(", ")
        },
        payload_shape(payload),
    );

    if !documentation.is_empty() {
        context.push_str("\n\nAPI documentation:\n");
        context.push_str(documentation);
    }
    context
}

/// Top-level payload keys with type and size only, never values.
fn payload_shape(payload: &Value) -> String {
    let describe = |value: &Value| match value {
        Value::Array(a) => format!("array({} items)", a.len()),
        Value::Object(o) => format!("object({} keys)", o.len()),
        Value::String(s) => format!("string({} chars)", s.chars().count()),
        Value::Number(_) => "number".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Null => "null".to_string(),
    };
    match payload {
        Value::Object(map) => {
            let shape: Map<String, Value> = map
                .iter()
                .map(|(key, value)| (key.clone(), json!(describe(value))))
                .collect();
            Value::Object(shape).to_string()
        }
        other => describe(other),
    }
}

/// Parse the model's reply as a partial config and merge it over the
/// current one. The config ID is never replaced by the model.
fn parse_config_reply(reply: &str, base: &ApiConfig) -> Result<ApiConfig, CallError> {
    let patch: Value = serde_json::from_str(strip_code_fences(reply)).map_err(|e| {
        CallError::Transport(format!("config synthesis produced invalid JSON: {e}"))
    })?;
    let Value::Object(patch) = patch else {
        return Err(CallError::Transport(
            "config synthesis produced a non-object reply".to_string(),
        ));
    };

    let mut merged = match serde_json::to_value(base) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    for (key, value) in patch {
        if key == "id" {
            continue;
        }
        merged.insert(key, value);
    }
    merged.insert("id".to_string(), json!(base.id));

    serde_json::from_value(Value::Object(merged)).map_err(|e| {
        CallError::Transport(format!("config synthesis produced an invalid config: {e}"))
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> ApiConfig {
        ApiConfig {
            id: "c1".to_string(),
            url_host: "https://api.example.com".to_string(),
            url_path: "/v1/orders".to_string(),
            method: "GET".to_string(),
            headers: None,
            query_params: None,
            body: None,
            instruction: "list orders".to_string(),
            response_schema: None,
            response_mapping: None,
        }
    }

    #[test]
    fn test_parse_config_reply_merges_over_base() {
        let reply = r#"{"url_path": "/v2/orders", "method": "POST"}"#;
        let healed = parse_config_reply(reply, &base_config()).unwrap();
        assert_eq!(healed.url_path, "/v2/orders");
        assert_eq!(healed.method, "POST");
        assert_eq!(healed.url_host, "https://api.example.com");
        assert_eq!(healed.instruction, "list orders");
    }

    #[test]
    fn test_parse_config_reply_keeps_base_id() {
        let reply = r#"{"id": "evil", "url_path": "/v2/orders"}"#;
        let healed = parse_config_reply(reply, &base_config()).unwrap();
        assert_eq!(healed.id, "c1");
    }

    #[test]
    fn test_parse_config_reply_strips_fences() {
        let reply = "```json\n{\"method\": \"PUT\"}\n```";
        let healed = parse_config_reply(reply, &base_config()).unwrap();
        assert_eq!(healed.method, "PUT");
    }

    #[test]
    fn test_parse_config_reply_rejects_prose() {
        let err = parse_config_reply("Sure! Here is the fix:", &base_config()).unwrap_err();
        assert!(err.to_string().contains("invalid JSON"));
    }

    #[test]
    fn test_synthesis_context_lists_names_not_values() {
        let credentials = Credentials::from([("api_key", "sk-super-secret")]);
        let context = build_synthesis_context(
            &base_config(),
            "GET /v2/orders returns {orders: []}",
            &json!({"customer": "acme"}),
            &credentials,
        );
        assert!(context.contains("{api_key}"));
        assert!(!context.contains("sk-super-secret"));
        assert!(context.contains("GET /v2/orders"));
        // Payload values are summarized, not included.
        assert!(!context.contains("acme"));
        assert!(context.contains("string(4 chars)"));
    }
}
