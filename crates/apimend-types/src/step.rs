//! Workflow step types: the unit of execution for the step engine.
//!
//! A [`WorkflowStep`] embeds one [`ApiConfig`] and declares how it runs:
//! `Direct` (one call) or `Loop` (one call per item extracted from the
//! payload). [`WorkflowStepResult`] is the engine's only output for a step --
//! strategies never propagate errors past their boundary.

use serde::{Deserialize, Serialize};

use crate::config::ApiConfig;

// ---------------------------------------------------------------------------
// ExecutionMode
// ---------------------------------------------------------------------------

/// How a step's call is executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExecutionMode {
    /// Execute the call exactly once.
    Direct,
    /// Execute the call once per item drawn from the payload.
    Loop,
}

impl Default for ExecutionMode {
    fn default() -> Self {
        ExecutionMode::Direct
    }
}

// ---------------------------------------------------------------------------
// WorkflowStep
// ---------------------------------------------------------------------------

/// A single declarative workflow step.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStep {
    /// User-defined step ID (e.g. "fetch-orders"). Unique within a workflow.
    pub id: String,
    /// The API call configuration this step executes.
    pub config: ApiConfig,
    /// Execution mode.
    #[serde(default)]
    pub execution_mode: ExecutionMode,
    /// Expression extracting the sequence of loop items from the payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_selector: Option<String>,
    /// Cap on loop iterations (engine default when unset).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loop_max_iters: Option<u32>,
    /// Legacy per-step response-mapping expression applied to raw data.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_mapping: Option<String>,
}

// ---------------------------------------------------------------------------
// WorkflowStepResult
// ---------------------------------------------------------------------------

/// The outcome of executing one workflow step.
///
/// Created fresh per step invocation. `success == true` implies both raw and
/// transformed data are present and `error` is empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowStepResult {
    /// The step this result belongs to.
    pub step_id: String,
    /// Whether the step succeeded.
    pub success: bool,
    /// Raw response data (per-iteration sequence for loop steps).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_data: Option<serde_json::Value>,
    /// Response data after the legacy response mapping.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transformed_data: Option<serde_json::Value>,
    /// The config that actually produced the result (may differ from the
    /// step's config when healing occurred).
    pub config: ApiConfig,
    /// Human-readable, credential-masked error when `success` is false.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkflowStepResult {
    /// Build a successful result.
    pub fn ok(
        step_id: impl Into<String>,
        raw_data: serde_json::Value,
        transformed_data: serde_json::Value,
        config: ApiConfig,
    ) -> Self {
        Self {
            step_id: step_id.into(),
            success: true,
            raw_data: Some(raw_data),
            transformed_data: Some(transformed_data),
            config,
            error: None,
        }
    }

    /// Build a failed result carrying an error string.
    pub fn failed(step_id: impl Into<String>, config: ApiConfig, error: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            success: false,
            raw_data: None,
            transformed_data: None,
            config,
            error: Some(error.into()),
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
            id: "c1".to_string(),
            url_host: "https://api.example.com".to_string(),
            url_path: "/items".to_string(),
            method: "GET".to_string(),
            headers: None,
            query_params: None,
            body: None,
            instruction: "list items".to_string(),
            response_schema: None,
            response_mapping: None,
        }
    }

    #[test]
    fn test_execution_mode_serde() {
        assert_eq!(
            serde_json::to_string(&ExecutionMode::Loop).unwrap(),
            "\"loop\""
        );
        let parsed: ExecutionMode = serde_json::from_str("\"direct\"").unwrap();
        assert_eq!(parsed, ExecutionMode::Direct);
    }

    #[test]
    fn test_step_defaults() {
        let json_str = serde_json::to_string(&json!({
            "id": "s1",
            "config": sample_config(),
        }))
        .unwrap();
        let step: WorkflowStep = serde_json::from_str(&json_str).unwrap();
        assert_eq!(step.execution_mode, ExecutionMode::Direct);
        assert!(step.loop_selector.is_none());
        assert!(step.loop_max_iters.is_none());
    }

    #[test]
    fn test_result_ok_invariant() {
        let result = WorkflowStepResult::ok("s1", json!({"a": 1}), json!(1), sample_config());
        assert!(result.success);
        assert!(result.raw_data.is_some());
        assert!(result.transformed_data.is_some());
        assert!(result.error.is_none());
    }

    #[test]
    fn test_result_failed() {
        let result = WorkflowStepResult::failed("s1", sample_config(), "transport error");
        assert!(!result.success);
        assert!(result.raw_data.is_none());
        assert_eq!(result.error.as_deref(), Some("transport error"));
    }

    #[test]
    fn test_step_json_roundtrip() {
        let step = WorkflowStep {
            id: "loop-step".to_string(),
            config: sample_config(),
            execution_mode: ExecutionMode::Loop,
            loop_selector: Some("items".to_string()),
            loop_max_iters: Some(10),
            response_mapping: Some("$".to_string()),
        };
        let json_str = serde_json::to_string(&step).unwrap();
        let parsed: WorkflowStep = serde_json::from_str(&json_str).unwrap();
        assert_eq!(parsed.id, "loop-step");
        assert_eq!(parsed.execution_mode, ExecutionMode::Loop);
        assert_eq!(parsed.loop_selector.as_deref(), Some("items"));
        assert_eq!(parsed.loop_max_iters, Some(10));
    }
}
