//! API call configuration and engine defaults.
//!
//! [`ApiConfig`] is the unit of self-healing: it describes one HTTP/GraphQL
//! call well enough to execute it, and carries the natural-language
//! `instruction` that the config synthesizer and response validator use to
//! judge intent. [`EngineConfig`] holds system-wide defaults loaded from
//! `config.toml`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// ApiConfig
// ---------------------------------------------------------------------------

/// Configuration for a single API call.
///
/// Once a call succeeds, the config that produced the success becomes the
/// config of record for the remainder of that step's iterations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Stable identifier, used as the keyed-store cache key.
    pub id: String,
    /// Target host, scheme included (e.g. "https://api.example.com").
    pub url_host: String,
    /// Target path (e.g. "/v2/orders").
    #[serde(default)]
    pub url_path: String,
    /// HTTP method (e.g. "GET", "POST").
    #[serde(default = "default_method")]
    pub method: String,
    /// Request headers. Values may contain `{credential}` placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<HashMap<String, String>>,
    /// Query parameters. Values may contain placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub query_params: Option<HashMap<String, String>>,
    /// Request body template. May contain placeholders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    /// Natural-language description of what this call should achieve.
    pub instruction: String,
    /// Expected response shape as plain JSON Schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_schema: Option<serde_json::Value>,
    /// Post-call transformation expression applied to the response.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_mapping: Option<String>,
}

fn default_method() -> String {
    "GET".to_string()
}

impl ApiConfig {
    /// The endpoint this config targets, for logs and telemetry.
    pub fn endpoint(&self) -> String {
        format!("{}{}", self.url_host, self.url_path)
    }
}

// ---------------------------------------------------------------------------
// EngineConfig
// ---------------------------------------------------------------------------

/// System-wide engine defaults, loaded from `config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Default retry budget for the self-healing call executor.
    #[serde(default = "default_retries")]
    pub default_retries: u32,
    /// Default cap on loop iterations when a step does not set one.
    #[serde(default = "default_loop_max_iters")]
    pub default_loop_max_iters: u32,
}

fn default_retries() -> u32 {
    8
}

fn default_loop_max_iters() -> u32 {
    1000
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_retries: default_retries(),
            default_loop_max_iters: default_loop_max_iters(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample_config() -> ApiConfig {
        ApiConfig {
            id: "orders-v2".to_string(),
            url_host: "https://api.example.com".to_string(),
            url_path: "/v2/orders".to_string(),
            method: "POST".to_string(),
            headers: Some(HashMap::from([(
                "Authorization".to_string(),
                "Bearer {api_key}".to_string(),
            )])),
            query_params: None,
            body: Some(r#"{"status":"open"}"#.to_string()),
            instruction: "Fetch all open orders".to_string(),
            response_schema: Some(json!({
                "type": "object",
                "properties": { "orders": { "type": "array" } }
            })),
            response_mapping: Some("orders".to_string()),
        }
    }

    #[test]
    fn test_api_config_json_roundtrip() {
        let original = sample_config();
        let json_str = serde_json::to_string(&original).unwrap();
        let parsed: ApiConfig = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed, original);
    }

    #[test]
    fn test_api_config_defaults() {
        let json_str = r#"{
            "id": "c1",
            "url_host": "https://api.example.com",
            "instruction": "list users"
        }"#;
        let parsed: ApiConfig = serde_json::from_str(json_str).unwrap();
        assert_eq!(parsed.method, "GET");
        assert_eq!(parsed.url_path, "");
        assert!(parsed.headers.is_none());
        assert!(parsed.response_schema.is_none());
    }

    #[test]
    fn test_endpoint() {
        let config = sample_config();
        assert_eq!(config.endpoint(), "https://api.example.com/v2/orders");
    }

    #[test]
    fn test_engine_config_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.default_retries, 8);
        assert_eq!(config.default_loop_max_iters, 1000);
    }

    #[test]
    fn test_engine_config_partial_toml() {
        let config: EngineConfig = toml::from_str("default_retries = 3").unwrap();
        assert_eq!(config.default_retries, 3);
        assert_eq!(config.default_loop_max_iters, 1000);
    }
}
