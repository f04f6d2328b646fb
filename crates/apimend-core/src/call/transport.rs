//! Transport caller trait definition.

use apimend_types::config::ApiConfig;
use apimend_types::credentials::Credentials;
use apimend_types::error::CallError;
use apimend_types::options::RequestOptions;
use serde_json::Value;

/// Executes one HTTP/GraphQL call described by an [`ApiConfig`].
///
/// Fails on network/HTTP error. Transport-level retry/backoff and timeouts
/// are this layer's responsibility, not the engine's.
pub trait TransportCaller: Send + Sync {
    /// Execute the call and return the parsed response body.
    fn call(
        &self,
        config: &ApiConfig,
        payload: &Value,
        credentials: &Credentials,
        options: &RequestOptions,
    ) -> impl std::future::Future<Output = Result<Value, CallError>> + Send;
}
