//! JEXL transform evaluator for response mappings and loop-item selectors.
//!
//! Wraps `jexl_eval::Evaluator` with pre-registered standard transforms.
//! Used both for shaping responses (response mappings) and for extracting
//! loop items from a payload.
//!
//! **Security note:** Data is always passed as a context object, NEVER
//! interpolated into expression strings.

use serde_json::{Value, json};

/// The reserved expression that selects the whole input (identity).
pub const IDENTITY_SELECTOR: &str = "$";

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

/// Errors that can occur during transform evaluation.
///
/// All variants render with a stable "transform expression" marker so the
/// call executor can recognize mapping-layer failures and append the mapping
/// guide to the synthesis transcript.
#[derive(Debug, thiserror::Error)]
pub enum TransformError {
    #[error("transform expression evaluation failed: {0}")]
    EvalFailed(String),

    #[error("transform expression requires an object input, got {kind}")]
    NonObjectInput { kind: &'static str },
}

// ---------------------------------------------------------------------------
// TransformEvaluator
// ---------------------------------------------------------------------------

/// JEXL expression evaluator with standard transforms pre-registered.
///
/// Supports:
/// - identity selection via [`IDENTITY_SELECTOR`] (or an empty expression)
/// - field paths and array indexing (e.g. `orders[0].id`)
/// - transform pipes (e.g. `items|length`)
pub struct TransformEvaluator {
    evaluator: jexl_eval::Evaluator<'static>,
}

impl TransformEvaluator {
    /// Create a new evaluator with all standard transforms registered.
    pub fn new() -> Self {
        let evaluator = jexl_eval::Evaluator::new()
            .with_transform("lower", |args: &[Value]| {
                let s = args.first().and_then(|v| v.as_str()).unwrap_or("");
                Ok(json!(s.to_lowercase()))
            })
            .with_transform("upper", |args: &[Value]| {
                let s = args.first().and_then(|v| v.as_str()).unwrap_or("");
                Ok(json!(s.to_uppercase()))
            })
            .with_transform("trim", |args: &[Value]| {
                let s = args.first().and_then(|v| v.as_str()).unwrap_or("");
                Ok(json!(s.trim()))
            })
            .with_transform("first", |args: &[Value]| {
                let val = args.first().cloned().unwrap_or(Value::Null);
                let first = match &val {
                    Value::Array(a) => a.first().cloned().unwrap_or(Value::Null),
                    _ => Value::Null,
                };
                Ok(first)
            })
            .with_transform("length", |args: &[Value]| {
                let val = args.first().cloned().unwrap_or(Value::Null);
                let len = match &val {
                    Value::String(s) => s.len(),
                    Value::Array(a) => a.len(),
                    Value::Object(o) => o.len(),
                    _ => 0,
                };
                Ok(json!(len as f64))
            });

        Self { evaluator }
    }

    /// Evaluate a transform expression against a JSON value.
    ///
    /// The identity selector (or an empty expression) returns the input
    /// unchanged. Any other expression is evaluated via JEXL, which requires
    /// the input to be a JSON object.
    pub fn evaluate(&self, data: &Value, expression: &str) -> Result<Value, TransformError> {
        let expr = expression.trim();
        if expr.is_empty() || expr == IDENTITY_SELECTOR {
            return Ok(data.clone());
        }

        if !data.is_object() {
            return Err(TransformError::NonObjectInput {
                kind: json_kind(data),
            });
        }

        self.evaluator
            .eval_in_context(expr, data)
            .map_err(|e| TransformError::EvalFailed(e.to_string()))
    }
}

impl Default for TransformEvaluator {
    fn default() -> Self {
        Self::new()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
