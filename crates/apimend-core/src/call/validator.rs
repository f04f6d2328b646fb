//! Response validator trait definition.

use apimend_types::error::CallError;
use serde_json::Value;

/// The validator's judgement of a response.
#[derive(Debug, Clone)]
pub struct Verdict {
    pub success: bool,
    /// Short human-readable reason when `success` is false.
    pub short_reason: String,
}

impl Verdict {
    pub fn pass() -> Self {
        Self {
            success: true,
            short_reason: String::new(),
        }
    }

    pub fn fail(reason: impl Into<String>) -> Self {
        Self {
            success: false,
            short_reason: reason.into(),
        }
    }
}

/// Judges whether response data satisfies the config's schema and
/// instruction (LLM-backed in the infrastructure layer).
pub trait ResponseValidator: Send + Sync {
    fn validate(
        &self,
        data: &Value,
        schema: Option<&Value>,
        instruction: &str,
    ) -> impl std::future::Future<Output = Result<Verdict, CallError>> + Send;
}
