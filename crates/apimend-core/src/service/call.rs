//! Call orchestrator: config resolution, execution, caching, persistence.
//!
//! [`CallService::execute`] is the external entry point for a single
//! orchestrated call. It resolves the config (by ID from the keyed store,
//! reads gated on the cache mode, or inline), invokes the self-healing
//! executor, applies the post-call transform, writes the refined config back
//! when the cache mode allows, fires the webhook, and persists a run record
//! with timestamps regardless of outcome. It never fails to its caller:
//! every error becomes a `success=false` [`CallResult`] with a
//! credential-masked message.

use apimend_types::config::ApiConfig;
use apimend_types::credentials::Credentials;
use apimend_types::error::CallError;
use apimend_types::integration::Integration;
use apimend_types::options::RequestOptions;
use apimend_types::run::{Metadata, RunRecord};
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::call::{
    ApiCallExecutor, ConfigSynthesizer, ResponseValidator, TransportCaller, WebhookNotifier,
};
use crate::mask::mask_credentials;
use crate::repository::ConfigStore;
use crate::transform::TransformEvaluator;

// ---------------------------------------------------------------------------
// ConfigRef / CallResult
// ---------------------------------------------------------------------------

/// How the caller names the config to execute.
#[derive(Debug, Clone)]
pub enum ConfigRef {
    /// Look the config up in the keyed store.
    Id(String),
    /// Use the supplied config directly.
    Inline(ApiConfig),
}

/// The orchestrator's only output.
#[derive(Debug, Clone)]
pub struct CallResult {
    pub success: bool,
    /// Transformed response data on success.
    pub data: Option<Value>,
    /// The final config (possibly refined by healing). Absent only when
    /// config resolution itself failed.
    pub config: Option<ApiConfig>,
    /// Credential-masked error when `success` is false.
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// CallService
// ---------------------------------------------------------------------------

/// Orchestrates one API call end to end.
pub struct CallService<R, T, S, V, W> {
    store: R,
    executor: ApiCallExecutor<T, S, V>,
    webhook: W,
    transform: TransformEvaluator,
}

impl<R, T, S, V, W> CallService<R, T, S, V, W>
where
    R: ConfigStore,
    T: TransportCaller,
    S: ConfigSynthesizer,
    V: ResponseValidator,
    W: WebhookNotifier,
{
    pub fn new(store: R, executor: ApiCallExecutor<T, S, V>, webhook: W) -> Self {
        Self {
            store,
            executor,
            webhook,
            transform: TransformEvaluator::new(),
        }
    }

    /// The backing keyed store.
    pub fn store(&self) -> &R {
        &self.store
    }

    /// Execute one orchestrated call. Never fails to the caller.
    pub async fn execute(
        &self,
        config_ref: ConfigRef,
        payload: &Value,
        credentials: &Credentials,
        options: &RequestOptions,
        metadata: &Metadata,
    ) -> CallResult {
        let started_at = Utc::now();

        let config = match self.resolve_config(&config_ref, options).await {
            Ok(config) => config,
            Err(e) => {
                let masked = mask_credentials(&e.to_string(), credentials);
                tracing::warn!(run_id = %metadata.run_id, error = masked.as_str(), "config resolution failed");
                self.finish(
                    metadata,
                    started_at,
                    &placeholder_config(&config_ref),
                    options,
                    None,
                    Some(&masked),
                )
                .await;
                return CallResult {
                    success: false,
                    data: None,
                    config: None,
                    error: Some(masked),
                };
            }
        };

        match self
            .run_call(&config, payload, credentials, options, metadata)
            .await
        {
            Ok((data, final_config)) => {
                self.finish(metadata, started_at, &final_config, options, Some(&data), None)
                    .await;
                CallResult {
                    success: true,
                    data: Some(data),
                    config: Some(final_config),
                    error: None,
                }
            }
            Err(e) => {
                let masked = mask_credentials(&e.to_string(), credentials);
                self.finish(metadata, started_at, &config, options, None, Some(&masked))
                    .await;
                CallResult {
                    success: false,
                    data: None,
                    config: Some(config),
                    error: Some(masked),
                }
            }
        }
    }

    /// The failable middle: schema guard, executor, post-call transform,
    /// cache write-back.
    async fn run_call(
        &self,
        config: &ApiConfig,
        payload: &Value,
        credentials: &Credentials,
        options: &RequestOptions,
        metadata: &Metadata,
    ) -> Result<(Value, ApiConfig), CallError> {
        ensure_supported_schema(config)?;

        let integration = self.lookup_integration(config).await;
        let executed = self
            .executor
            .execute_api_call(
                config,
                payload,
                credentials,
                options,
                metadata,
                integration.as_ref(),
            )
            .await?;

        let data = match executed.config.response_mapping.as_deref() {
            Some(expr) if !expr.trim().is_empty() => self
                .transform
                .evaluate(&executed.data, expr)
                .map_err(|e| CallError::Configuration(e.to_string()))?,
            _ => executed.data.clone(),
        };

        if options.write_cache() && !executed.config.id.is_empty() {
            if let Err(e) = self
                .store
                .upsert_config(&executed.config.id, &executed.config)
                .await
            {
                tracing::warn!(
                    config_id = executed.config.id.as_str(),
                    error = %e,
                    "failed to persist refined config"
                );
            }
        }

        Ok((data, executed.config))
    }

    async fn resolve_config(
        &self,
        config_ref: &ConfigRef,
        options: &RequestOptions,
    ) -> Result<ApiConfig, CallError> {
        match config_ref {
            ConfigRef::Inline(config) => Ok(config.clone()),
            ConfigRef::Id(id) => {
                if !options.read_cache() {
                    return Err(CallError::Configuration(format!(
                        "config \"{id}\" requested by ID but cache reads are disabled"
                    )));
                }
                match self.store.get_config(id).await? {
                    Some(config) => Ok(config),
                    None => Err(CallError::Configuration(format!("config \"{id}\" not found"))),
                }
            }
        }
    }

    /// Integration lookup keyed by the config's host. Best-effort: a store
    /// failure degrades to synthesis without documentation.
    async fn lookup_integration(&self, config: &ApiConfig) -> Option<Integration> {
        match self.store.get_integration(&config.url_host).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(
                    url_host = config.url_host.as_str(),
                    error = %e,
                    "integration lookup failed"
                );
                None
            }
        }
    }

    /// Completion side effects shared by both outcomes: webhook (when
    /// configured, best-effort) and run record persistence.
    async fn finish(
        &self,
        metadata: &Metadata,
        started_at: DateTime<Utc>,
        config: &ApiConfig,
        options: &RequestOptions,
        data: Option<&Value>,
        error: Option<&str>,
    ) {
        let success = error.is_none();

        if let Some(url) = options.webhook_url.as_deref() {
            self.webhook
                .notify(url, metadata.run_id, success, data, error)
                .await;
        }

        let record = RunRecord {
            id: metadata.run_id,
            org_id: metadata.org_id.clone(),
            config: config.clone(),
            success,
            error: error.map(str::to_string),
            started_at,
            completed_at: Utc::now(),
        };
        if let Err(e) = self.store.create_run(&record).await {
            tracing::error!(run_id = %metadata.run_id, error = %e, "failed to persist run record");
        }
    }
}

/// A run record still gets persisted when resolution fails; the stub config
/// carries the requested ID so the failure is attributable.
fn placeholder_config(config_ref: &ConfigRef) -> ApiConfig {
    let id = match config_ref {
        ConfigRef::Id(id) => id.clone(),
        ConfigRef::Inline(config) => config.id.clone(),
    };
    ApiConfig {
        id,
        url_host: String::new(),
        url_path: String::new(),
        method: "GET".to_string(),
        headers: None,
        query_params: None,
        body: None,
        instruction: String::new(),
        response_schema: None,
        response_mapping: None,
    }
}

/// Reject response-schema representations other than plain JSON Schema. A
/// runtime-validator export (marked by `_def`) cannot be evaluated here.
fn ensure_supported_schema(config: &ApiConfig) -> Result<(), CallError> {
    if let Some(schema) = &config.response_schema {
        let plain_json_schema = schema
            .as_object()
            .is_some_and(|o| !o.contains_key("_def"));
        if !plain_json_schema {
            return Err(CallError::Configuration(
                "response_schema must be a plain JSON Schema object".to_string(),
            ));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
