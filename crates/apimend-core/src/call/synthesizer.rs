//! Config synthesizer trait definition.

use apimend_types::config::ApiConfig;
use apimend_types::credentials::Credentials;
use apimend_types::error::CallError;
use apimend_types::transcript::Transcript;
use serde_json::Value;

/// A candidate configuration plus the updated conversation transcript.
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub config: ApiConfig,
    pub transcript: Transcript,
}

/// Produces candidate API configurations from failure feedback (LLM-backed
/// in the infrastructure layer).
pub trait ConfigSynthesizer: Send + Sync {
    /// Synthesize a replacement config.
    ///
    /// `documentation` is the integration's processed API documentation, or
    /// empty when none is available. `attempt` is the executor's 1-based
    /// healing attempt index. The transcript is taken and returned by value:
    /// implementations append their own assistant message and the executor
    /// threads the result into the next attempt.
    fn synthesize(
        &self,
        config: &ApiConfig,
        documentation: &str,
        payload: &Value,
        credentials: &Credentials,
        attempt: u32,
        transcript: Transcript,
    ) -> impl std::future::Future<Output = Result<Synthesis, CallError>> + Send;

    /// Synthesize a loop-item extraction expression.
    ///
    /// `payload_summary` describes each top-level payload key's type and
    /// size, never the full content. Returns `Ok(None)` when no usable
    /// selector could be produced.
    fn synthesize_selector(
        &self,
        instruction: &str,
        payload_summary: &Value,
    ) -> impl std::future::Future<Output = Result<Option<String>, CallError>> + Send;
}
