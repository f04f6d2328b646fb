//! Self-healing call executor: a bounded retry state machine.
//!
//! Runs one API call through a repair loop. Attempt 0 always uses the given
//! config verbatim; later attempts (with healing enabled) feed the masked
//! failure transcript into the config synthesizer and retry with its
//! candidate. Responses on healed attempts are semantically validated.
//!
//! # Retry state
//!
//! Each attempt is a state transition over `(config, transcript, last_error,
//! guide_appended)`, threaded by value -- no shared mutable transcript.

use apimend_types::config::{ApiConfig, EngineConfig};
use apimend_types::credentials::Credentials;
use apimend_types::error::CallError;
use apimend_types::integration::Integration;
use apimend_types::options::RequestOptions;
use apimend_types::run::Metadata;
use apimend_types::transcript::Transcript;
use serde_json::Value;

use crate::mask::{MAX_ERROR_LEN, mask_credentials, truncate};

use super::synthesizer::ConfigSynthesizer;
use super::transport::TransportCaller;
use super::validator::ResponseValidator;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Failure text for empty/absent response bodies.
const NO_DATA_MSG: &str = "no data returned, this is likely a configuration error";

/// Marker in masked errors that identifies mapping-layer failures.
const MAPPING_ERROR_MARKER: &str = "transform expression";

/// One-shot guide appended to the transcript when a mapping-layer failure is
/// seen, so the synthesizer knows the expression language.
const MAPPING_GUIDE: &str = "Mapping language guide: response mappings and loop selectors are \
JEXL expressions evaluated against a JSON object. Use dotted field paths (`data.items`), array \
indexing (`items[0]`), and transform pipes (`items|length`, `items|first`, `name|lower`, \
`name|upper`, `name|trim`). The reserved expression `$` selects the whole input.";

// ---------------------------------------------------------------------------
// ExecutedCall
// ---------------------------------------------------------------------------

/// The outcome of a successful self-healing call.
#[derive(Debug, Clone)]
pub struct ExecutedCall {
    /// The response body.
    pub data: Value,
    /// The config that produced the success (the synthesizer's candidate
    /// when healing occurred, the input config otherwise).
    pub config: ApiConfig,
}

// ---------------------------------------------------------------------------
// ApiCallExecutor
// ---------------------------------------------------------------------------

/// Executes one API call through the bounded repair loop.
///
/// Generic over the transport caller, config synthesizer, and response
/// validator so tests can script each collaborator.
pub struct ApiCallExecutor<T, S, V> {
    transport: T,
    synthesizer: S,
    validator: V,
    defaults: EngineConfig,
}

/// Retry state threaded by value through each attempt.
struct AttemptState {
    config: ApiConfig,
    transcript: Transcript,
    last_error: String,
    guide_appended: bool,
}

impl<T, S, V> ApiCallExecutor<T, S, V>
where
    T: TransportCaller,
    S: ConfigSynthesizer,
    V: ResponseValidator,
{
    pub fn new(transport: T, synthesizer: S, validator: V) -> Self {
        Self {
            transport,
            synthesizer,
            validator,
            defaults: EngineConfig::default(),
        }
    }

    /// Use the given engine defaults for settings the request options leave
    /// unset (currently the retry budget).
    pub fn with_defaults(mut self, defaults: EngineConfig) -> Self {
        self.defaults = defaults;
        self
    }

    /// The config synthesizer (shared with the loop strategy's selector
    /// regeneration path).
    pub fn synthesizer(&self) -> &S {
        &self.synthesizer
    }

    /// Run one API call through the repair loop.
    ///
    /// Fails with [`CallError::RetryExhausted`] when the retry budget is
    /// spent without a successful, validated response.
    pub async fn execute_api_call(
        &self,
        config: &ApiConfig,
        payload: &Value,
        credentials: &Credentials,
        options: &RequestOptions,
        metadata: &Metadata,
        integration: Option<&Integration>,
    ) -> Result<ExecutedCall, CallError> {
        let healing = options.healing_enabled();
        let retries = options.retry_budget(self.defaults.default_retries);

        let mut state = AttemptState {
            config: config.clone(),
            transcript: Transcript::new(),
            last_error: String::new(),
            guide_appended: false,
        };

        for attempt in 0..retries {
            // Attempt 0 uses the given config verbatim. A first-attempt
            // failure on a never-validated config is the normal healing
            // trigger, not a reported error.
            if attempt > 0 && healing {
                let documentation = resolve_documentation(integration);
                match self
                    .synthesizer
                    .synthesize(
                        &state.config,
                        &documentation,
                        payload,
                        credentials,
                        attempt,
                        state.transcript.clone(),
                    )
                    .await
                {
                    Ok(synthesis) => {
                        state.config = synthesis.config;
                        state.transcript = synthesis.transcript;
                    }
                    Err(e) => {
                        state = self.record_failure(state, attempt, &e.to_string(), credentials);
                        continue;
                    }
                }
            }

            match self.run_attempt(&state.config, payload, credentials, options, attempt, healing)
                .await
            {
                Ok(data) => {
                    tracing::debug!(
                        run_id = %metadata.run_id,
                        endpoint = state.config.endpoint().as_str(),
                        attempt,
                        "API call succeeded"
                    );
                    return Ok(ExecutedCall {
                        data,
                        config: state.config,
                    });
                }
                Err(e) => {
                    state = self.record_failure(state, attempt, &e.to_string(), credentials);
                }
            }
        }

        // Exhaustion: report to telemetry, then fail with the retry count
        // and the last masked error.
        tracing::error!(
            run_id = %metadata.run_id,
            endpoint = state.config.endpoint().as_str(),
            retries,
            "API call exhausted retry budget"
        );
        Err(CallError::RetryExhausted {
            retries,
            last_error: state.last_error,
        })
    }

    /// One transport call plus (on healed attempts) semantic validation.
    async fn run_attempt(
        &self,
        config: &ApiConfig,
        payload: &Value,
        credentials: &Credentials,
        options: &RequestOptions,
        attempt: u32,
        healing: bool,
    ) -> Result<Value, CallError> {
        let data = self
            .transport
            .call(config, payload, credentials, options)
            .await?;

        if is_empty_response(&data) {
            return Err(CallError::Transport(NO_DATA_MSG.to_string()));
        }

        // The config supplied at attempt 0 is trusted: transport success is
        // enough. Healed configs are validated against schema + instruction.
        if attempt > 0 && healing {
            let verdict = self
                .validator
                .validate(&data, config.response_schema.as_ref(), &config.instruction)
                .await?;
            if !verdict.success {
                return Err(CallError::Validation {
                    reason: verdict.short_reason,
                    response_preview: truncate(&data.to_string(), MAX_ERROR_LEN),
                });
            }
        }

        Ok(data)
    }

    /// Mask the error, feed it into the transcript, and append the mapping
    /// guide (at most once per call) when the failure came from the
    /// transform layer.
    fn record_failure(
        &self,
        mut state: AttemptState,
        attempt: u32,
        error: &str,
        credentials: &Credentials,
    ) -> AttemptState {
        let masked = mask_credentials(error, credentials);
        tracing::warn!(attempt, error = masked.as_str(), "API call attempt failed");

        state
            .transcript
            .push_user(format!("Attempt {attempt} failed: {masked}"));

        if masked.contains(MAPPING_ERROR_MARKER) && !state.guide_appended {
            state.transcript.push_user(MAPPING_GUIDE);
            state.guide_appended = true;
        }

        state.last_error = masked;
        state
    }
}

/// Resolve the documentation string for the synthesizer prompt.
///
/// Empty when no integration was supplied, or when its documentation is
/// still being processed asynchronously (logged as a warning; the attempt
/// proceeds without documentation).
fn resolve_documentation(integration: Option<&Integration>) -> String {
    match integration {
        Some(integration) => match integration.ready_documentation() {
            Some(docs) => docs.to_string(),
            None => {
                if integration.documentation_pending {
                    tracing::warn!(
                        integration = integration.id.as_str(),
                        "integration documentation still processing, synthesizing without it"
                    );
                }
                String::new()
            }
        },
        None => String::new(),
    }
}

/// Empty/absent response bodies are failures.
fn is_empty_response(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
        _ => false,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
