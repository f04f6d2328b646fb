//! Reqwest-based transport caller.
//!
//! Executes one HTTP request described by an [`ApiConfig`]. URL, headers,
//! query parameters, and body may contain `{name}` placeholders resolved
//! from credentials first, then top-level payload keys. Resolved secret
//! values exist only inside the outgoing request; errors carry the raw
//! provider text and rely on the engine's credential masking upstream.

use std::time::Duration;

use apimend_core::call::TransportCaller;
use apimend_types::config::ApiConfig;
use apimend_types::credentials::Credentials;
use apimend_types::error::CallError;
use apimend_types::options::RequestOptions;
use serde_json::Value;

/// Request timeout for transport calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP transport caller backed by a shared reqwest client.
pub struct HttpTransportCaller {
    client: reqwest::Client,
}

impl HttpTransportCaller {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("failed to create reqwest client");
        Self { client }
    }
}

impl Default for HttpTransportCaller {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportCaller for HttpTransportCaller {
    async fn call(
        &self,
        config: &ApiConfig,
        payload: &Value,
        credentials: &Credentials,
        options: &RequestOptions,
    ) -> Result<Value, CallError> {
        let url = resolve_template(&config.endpoint(), credentials, payload)?;
        let method = reqwest::Method::from_bytes(config.method.as_bytes())
            .map_err(|_| CallError::Configuration(format!("invalid HTTP method \"{}\"", config.method)))?;

        let mut request = self.client.request(method, &url);

        if let Some(headers) = &config.headers {
            for (name, value) in headers {
                request = request.header(name, resolve_template(value, credentials, payload)?);
            }
        }

        if let Some(query_params) = &config.query_params {
            let mut resolved = Vec::with_capacity(query_params.len());
            for (name, value) in query_params {
                resolved.push((name.clone(), resolve_template(value, credentials, payload)?));
            }
            request = request.query(&resolved);
        }

        if let Some(body) = &config.body {
            let resolved = resolve_template(body, credentials, payload)?;
            // JSON when the template resolves to valid JSON, raw text
            // otherwise.
            request = match serde_json::from_str::<Value>(&resolved) {
                Ok(json) => request.json(&json),
                Err(_) => request.body(resolved),
            };
        }

        tracing::debug!(
            endpoint = config.endpoint().as_str(),
            method = config.method.as_str(),
            test_mode = options.test_mode,
            "dispatching API call"
        );

        let response = request
            .send()
            .await
            .map_err(|e| CallError::Transport(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| CallError::Transport(format!("failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(CallError::Transport(format!("HTTP {status}: {text}")));
        }

        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&text).unwrap_or(Value::String(text)))
    }
}

// ---------------------------------------------------------------------------
// Template resolution
// ---------------------------------------------------------------------------

/// Replace `{name}` placeholders with credential values (first) or
/// top-level payload values (second). A brace pair that is not a plain
/// identifier is left alone, so JSON body templates pass through intact.
fn resolve_template(
    template: &str,
    credentials: &Credentials,
    payload: &Value,
) -> Result<String, CallError> {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    loop {
        match rest.find('{') {
            None => {
                out.push_str(rest);
                return Ok(out);
            }
            Some(open) => {
                out.push_str(&rest[..open]);
                let after = &rest[open + 1..];
                match after.find('}') {
                    Some(close) if is_placeholder_name(&after[..close]) => {
                        let name = &after[..close];
                        let value = lookup(name, credentials, payload).ok_or_else(|| {
                            CallError::Configuration(format!(
                                "unresolved template placeholder \"{{{name}}}\""
                            ))
                        })?;
                        out.push_str(&value);
                        rest = &after[close + 1..];
                    }
                    _ => {
                        out.push('{');
                        rest = after;
                    }
                }
            }
        }
    }
}

fn is_placeholder_name(candidate: &str) -> bool {
    !candidate.is_empty()
        && candidate
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_')
}

fn lookup(name: &str, credentials: &Credentials, payload: &Value) -> Option<String> {
    if let Some(secret) = credentials.get(name) {
        return Some(secret.to_string());
    }
    payload.get(name).map(|value| match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_credential_placeholder_resolved() {
        let credentials = Credentials::from([("api_key", "sk-123")]);
        let resolved =
            resolve_template("Bearer {api_key}", &credentials, &json!({})).unwrap();
        assert_eq!(resolved, "Bearer sk-123");
    }

    #[test]
    fn test_payload_placeholder_resolved() {
        let resolved = resolve_template(
            "/users/{user_id}/orders",
            &Credentials::new(),
            &json!({"user_id": 42}),
        )
        .unwrap();
        assert_eq!(resolved, "/users/42/orders");
    }

    #[test]
    fn test_credentials_take_precedence_over_payload() {
        let credentials = Credentials::from([("token", "from-credentials")]);
        let resolved = resolve_template(
            "{token}",
            &credentials,
            &json!({"token": "from-payload"}),
        )
        .unwrap();
        assert_eq!(resolved, "from-credentials");
    }

    #[test]
    fn test_json_braces_left_intact() {
        let credentials = Credentials::from([("api_key", "sk-123")]);
        let resolved = resolve_template(
            r#"{"auth": "{api_key}", "nested": {"a": 1}}"#,
            &credentials,
            &json!({}),
        )
        .unwrap();
        assert_eq!(resolved, r#"{"auth": "sk-123", "nested": {"a": 1}}"#);
    }

    #[test]
    fn test_unresolved_placeholder_is_config_error() {
        let err = resolve_template("{missing}", &Credentials::new(), &json!({})).unwrap_err();
        assert!(err.to_string().contains("{missing}"));
    }

    #[test]
    fn test_unclosed_brace_is_literal() {
        let resolved =
            resolve_template("query { user", &Credentials::new(), &json!({})).unwrap();
        assert_eq!(resolved, "query { user");
    }
}
