//! Loop strategy: one executor invocation per extracted payload item.
//!
//! Items come from the step's `loop_selector` evaluated through the
//! transform evaluator. Iterations run strictly sequentially as a fold over
//! `(current_config, accumulated_results)`: the config that produced the
//! first successful call becomes the config of record for the remaining
//! iterations. Any per-item failure aborts the whole loop and discards
//! results collected so far (fail-fast, not partial-success).

use apimend_types::config::ApiConfig;
use apimend_types::credentials::Credentials;
use apimend_types::error::CallError;
use apimend_types::integration::Integration;
use apimend_types::options::RequestOptions;
use apimend_types::run::Metadata;
use apimend_types::step::{WorkflowStep, WorkflowStepResult};
use serde_json::{Map, Value, json};

use crate::call::{ConfigSynthesizer, ResponseValidator, TransportCaller};
use crate::mask::{mask_credentials, truncate};
use crate::transform::IDENTITY_SELECTOR;

use super::StepExecutor;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Reserved payload key carrying the current loop item verbatim.
pub const ITEM_KEY: &str = "current_item";

/// Wrapper key for non-object response bodies in per-item raw data.
const RESPONSE_KEY: &str = "response";

/// Maximum characters of a failing item rendered into the abort error.
const ITEM_PREVIEW_LEN: usize = 50;

// ---------------------------------------------------------------------------
// Loop execution
// ---------------------------------------------------------------------------

impl<T, S, V> StepExecutor<T, S, V>
where
    T: TransportCaller,
    S: ConfigSynthesizer,
    V: ResponseValidator,
{
    /// Run the step's call once per extracted item. Failures from selector
    /// resolution or any iteration are caught here and rendered as a failed
    /// result.
    pub(super) async fn execute_loop(
        &self,
        step: &WorkflowStep,
        payload: &Value,
        credentials: &Credentials,
        options: &RequestOptions,
        metadata: &Metadata,
        integration: Option<&Integration>,
    ) -> WorkflowStepResult {
        let result = match self
            .run_loop(step, payload, credentials, options, metadata, integration)
            .await
        {
            Ok(result) => result,
            Err(e) => {
                let masked = mask_credentials(&e.to_string(), credentials);
                WorkflowStepResult::failed(step.id.clone(), step.config.clone(), masked)
            }
        };

        tracing::info!(
            step_id = step.id.as_str(),
            run_id = %metadata.run_id,
            success = result.success,
            "loop step completed"
        );
        result
    }

    async fn run_loop(
        &self,
        step: &WorkflowStep,
        payload: &Value,
        credentials: &Credentials,
        options: &RequestOptions,
        metadata: &Metadata,
        integration: Option<&Integration>,
    ) -> Result<WorkflowStepResult, CallError> {
        let selector = self.resolve_selector(step, payload)?;
        let mut items = self.extract_items(payload, &selector);

        // Empty extraction triggers exactly one selector regeneration. A
        // second empty result is accepted as-is: zero iterations, vacuously
        // successful.
        if items.is_empty() {
            let summary = payload_summary(payload);
            if let Some(regenerated) = self
                .executor
                .synthesizer()
                .synthesize_selector(&step.config.instruction, &summary)
                .await?
            {
                tracing::info!(
                    step_id = step.id.as_str(),
                    selector = regenerated.as_str(),
                    "regenerated loop selector after empty extraction"
                );
                items = self.extract_items(payload, &regenerated);
                if items.is_empty() {
                    tracing::warn!(
                        step_id = step.id.as_str(),
                        "regenerated selector also yielded no items, proceeding with zero iterations"
                    );
                }
            }
        }

        let cap = step
            .loop_max_iters
            .unwrap_or(self.config.default_loop_max_iters) as usize;
        if items.len() > cap {
            tracing::warn!(
                step_id = step.id.as_str(),
                extracted = items.len(),
                cap,
                "loop items truncated to iteration cap"
            );
            items.truncate(cap);
        }

        // Loop iterations are real calls even when the caller asked for a
        // dry run.
        let mut loop_options = options.clone();
        loop_options.test_mode = false;

        let total = items.len();
        let mut current_config: Option<ApiConfig> = None;
        let mut raw_items = Vec::with_capacity(total);
        let mut transformed_items = Vec::with_capacity(total);

        for (i, item) in items.iter().enumerate() {
            let index = i + 1;
            let iteration_payload = build_iteration_payload(payload, item);
            let call_config = current_config
                .clone()
                .unwrap_or_else(|| step.config.clone());

            let executed = self
                .executor
                .execute_api_call(
                    &call_config,
                    &iteration_payload,
                    credentials,
                    &loop_options,
                    metadata,
                    integration,
                )
                .await
                .map_err(|e| abort(index, total, item, e))?;

            if executed.config != call_config {
                tracing::info!(
                    step_id = step.id.as_str(),
                    iteration = index,
                    "loop learned a refined config"
                );
            }

            let raw = merge_item_response(item, &executed.data);
            let transformed = self
                .apply_mapping(&raw, step.response_mapping.as_deref())
                .map_err(|e| abort(index, total, item, e))?;

            raw_items.push(raw);
            transformed_items.push(transformed);
            current_config = Some(executed.config);
        }

        Ok(WorkflowStepResult::ok(
            step.id.clone(),
            Value::Array(raw_items),
            Value::Array(transformed_items),
            current_config.unwrap_or_else(|| step.config.clone()),
        ))
    }

    /// Selector resolution: an absent selector falls back to identity for
    /// array payloads and is a configuration error otherwise.
    fn resolve_selector(&self, step: &WorkflowStep, payload: &Value) -> Result<String, CallError> {
        match &step.loop_selector {
            Some(selector) if !selector.trim().is_empty() => Ok(selector.clone()),
            _ if payload.is_array() => Ok(IDENTITY_SELECTOR.to_string()),
            _ => Err(CallError::Configuration(format!(
                "loop step \"{}\" has no loop_selector and the payload is not an array",
                step.id
            ))),
        }
    }

    /// Evaluate the selector; a failed evaluation or non-array result is
    /// treated as zero items.
    fn extract_items(&self, payload: &Value, selector: &str) -> Vec<Value> {
        match self.transform.evaluate(payload, selector) {
            Ok(Value::Array(items)) => items,
            Ok(other) => {
                tracing::debug!(
                    selector,
                    got = value_kind(&other),
                    "loop selector yielded a non-array, treating as empty"
                );
                Vec::new()
            }
            Err(e) => {
                tracing::debug!(
                    selector,
                    error = %e,
                    "loop selector evaluation failed, treating as empty"
                );
                Vec::new()
            }
        }
    }
}

fn abort(index: usize, total: usize, item: &Value, source: CallError) -> CallError {
    CallError::LoopAborted {
        index,
        total,
        item: truncate(&item.to_string(), ITEM_PREVIEW_LEN),
        source: Box::new(source),
    }
}

// ---------------------------------------------------------------------------
// Payload shaping
// ---------------------------------------------------------------------------

/// Iteration payload: outer payload keys, then the item's fields flattened
/// to dotted keys, then the item verbatim under [`ITEM_KEY`].
fn build_iteration_payload(outer: &Value, item: &Value) -> Value {
    let mut merged = match outer {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };
    flatten_into(&mut merged, "", item);
    merged.insert(ITEM_KEY.to_string(), item.clone());
    Value::Object(merged)
}

/// Flatten nested object fields into dotted keys ("a.b": 1). Scalars and
/// arrays are inserted as-is under their dotted path; a non-object item at
/// the top level contributes nothing (it is still reachable via the
/// reserved key).
fn flatten_into(out: &mut Map<String, Value>, prefix: &str, value: &Value) {
    if let Value::Object(map) = value {
        for (key, inner) in map {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            match inner {
                Value::Object(_) => flatten_into(out, &path, inner),
                _ => {
                    out.insert(path, inner.clone());
                }
            }
        }
    }
}

/// Per-item raw data: the reserved item key merged with the response body.
/// Non-object bodies are wrapped under [`RESPONSE_KEY`].
fn merge_item_response(item: &Value, data: &Value) -> Value {
    let mut merged = Map::new();
    merged.insert(ITEM_KEY.to_string(), item.clone());
    match data {
        Value::Object(map) => merged.extend(map.clone()),
        other => {
            merged.insert(RESPONSE_KEY.to_string(), other.clone());
        }
    }
    Value::Object(merged)
}

/// Summary of each top-level payload key's type and size, for the selector
/// regeneration prompt. Full payload content is never included.
fn payload_summary(payload: &Value) -> Value {
    match payload {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, value)| (key.clone(), json!(describe(value))))
                .collect(),
        ),
        other => json!({ "payload": describe(other) }),
    }
}

fn describe(value: &Value) -> String {
    match value {
        Value::Array(a) => format!("array({} items)", a.len()),
        Value::Object(o) => format!("object({} keys)", o.len()),
        Value::String(s) => format!("string({} chars)", s.chars().count()),
        Value::Number(_) => "number".to_string(),
        Value::Bool(_) => "boolean".to_string(),
        Value::Null => "null".to_string(),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
