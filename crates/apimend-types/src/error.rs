use thiserror::Error;

/// Errors from the self-healing call path.
///
/// The executor surfaces these upward; strategies catch everything at their
/// boundary and convert to a `WorkflowStepResult` with `success = false`.
#[derive(Debug, Error)]
pub enum CallError {
    /// Missing or unsupported configuration (e.g. loop step with no selector
    /// and a non-array payload, or a non-JSON-Schema response schema).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Transport caller failure or empty response body.
    #[error("transport error: {0}")]
    Transport(String),

    /// Response failed the schema/instruction check on a healed attempt.
    #[error("response validation failed: {reason} (response: {response_preview})")]
    Validation {
        reason: String,
        response_preview: String,
    },

    /// The executor's retry loop completed without a success.
    #[error("API call failed after {retries} attempts. Last error: {last_error}")]
    RetryExhausted { retries: u32, last_error: String },

    /// A loop iteration failed; all prior iteration results are discarded.
    #[error("loop aborted at item {index}/{total} (item: {item}): {source}")]
    LoopAborted {
        index: usize,
        total: usize,
        item: String,
        #[source]
        source: Box<CallError>,
    },

    /// Keyed-store failure.
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors from keyed-store operations (used by trait definitions in
/// apimend-core).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("entity not found")]
    NotFound,

    #[error("query error: {0}")]
    Query(String),

    #[error("conflict: {0}")]
    Conflict(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retry_exhausted_display() {
        let err = CallError::RetryExhausted {
            retries: 8,
            last_error: "HTTP 500".to_string(),
        };
        let text = err.to_string();
        assert!(text.contains("8 attempts"));
        assert!(text.contains("HTTP 500"));
    }

    #[test]
    fn test_loop_aborted_display() {
        let err = CallError::LoopAborted {
            index: 2,
            total: 3,
            item: "{\"id\":42}".to_string(),
            source: Box::new(CallError::Transport("connection refused".to_string())),
        };
        let text = err.to_string();
        assert!(text.contains("2/3"));
        assert!(text.contains("connection refused"));
    }

    #[test]
    fn test_validation_display() {
        let err = CallError::Validation {
            reason: "missing 'orders' field".to_string(),
            response_preview: "{}".to_string(),
        };
        assert!(err.to_string().contains("missing 'orders' field"));
    }

    #[test]
    fn test_store_error_conversion() {
        let err: CallError = StoreError::NotFound.into();
        assert!(matches!(err, CallError::Store(StoreError::NotFound)));
    }
}
