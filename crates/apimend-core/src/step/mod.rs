//! Workflow step execution: strategy dispatch over Direct and Loop.
//!
//! [`StepExecutor`] is the step engine's entry point. It selects the
//! execution strategy from the step's declared mode, runs it, and always
//! returns a [`WorkflowStepResult`] -- failures are caught at the strategy
//! boundary and rendered as masked error strings, never propagated.

mod direct;
mod looping;
mod strategy;

pub use strategy::ExecutionStrategy;

use apimend_types::config::EngineConfig;
use apimend_types::credentials::Credentials;
use apimend_types::error::CallError;
use apimend_types::integration::Integration;
use apimend_types::options::RequestOptions;
use apimend_types::run::Metadata;
use apimend_types::step::{WorkflowStep, WorkflowStepResult};
use serde_json::Value;

use crate::call::{ApiCallExecutor, ConfigSynthesizer, ResponseValidator, TransportCaller};
use crate::transform::TransformEvaluator;

// ---------------------------------------------------------------------------
// StepExecutor
// ---------------------------------------------------------------------------

/// Executes workflow steps through the self-healing call executor.
pub struct StepExecutor<T, S, V> {
    executor: ApiCallExecutor<T, S, V>,
    transform: TransformEvaluator,
    config: EngineConfig,
}

impl<T, S, V> StepExecutor<T, S, V>
where
    T: TransportCaller,
    S: ConfigSynthesizer,
    V: ResponseValidator,
{
    pub fn new(executor: ApiCallExecutor<T, S, V>, config: EngineConfig) -> Self {
        Self {
            executor: executor.with_defaults(config.clone()),
            transform: TransformEvaluator::new(),
            config,
        }
    }

    /// Execute one step. Never fails: any error becomes a
    /// `success=false` result with a credential-masked message.
    pub async fn execute(
        &self,
        step: &WorkflowStep,
        payload: &Value,
        credentials: &Credentials,
        options: &RequestOptions,
        metadata: &Metadata,
        integration: Option<&Integration>,
    ) -> WorkflowStepResult {
        match ExecutionStrategy::for_mode(step.execution_mode) {
            ExecutionStrategy::Direct => {
                self.execute_direct(step, payload, credentials, options, metadata, integration)
                    .await
            }
            ExecutionStrategy::Loop => {
                self.execute_loop(step, payload, credentials, options, metadata, integration)
                    .await
            }
        }
    }

    /// Apply a legacy response-mapping expression to raw data.
    ///
    /// An absent or blank mapping passes the data through unchanged.
    fn apply_mapping(&self, data: &Value, mapping: Option<&str>) -> Result<Value, CallError> {
        match mapping {
            Some(expr) if !expr.trim().is_empty() => self
                .transform
                .evaluate(data, expr)
                .map_err(|e| CallError::Configuration(e.to_string())),
            _ => Ok(data.clone()),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests (shared scenario harness lives in direct.rs / looping.rs)
// ---------------------------------------------------------------------------
