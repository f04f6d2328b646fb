//! Direct strategy: one executor invocation per step.

use apimend_types::credentials::Credentials;
use apimend_types::error::CallError;
use apimend_types::integration::Integration;
use apimend_types::options::RequestOptions;
use apimend_types::run::Metadata;
use apimend_types::step::{WorkflowStep, WorkflowStepResult};
use serde_json::Value;

use crate::call::{ConfigSynthesizer, ResponseValidator, TransportCaller};
use crate::mask::mask_credentials;

use super::StepExecutor;

impl<T, S, V> StepExecutor<T, S, V>
where
    T: TransportCaller,
    S: ConfigSynthesizer,
    V: ResponseValidator,
{
    /// Run the step's call once. Failures from the executor or the mapping
    /// layer are caught here and rendered as a failed result.
    pub(super) async fn execute_direct(
        &self,
        step: &WorkflowStep,
        payload: &Value,
        credentials: &Credentials,
        options: &RequestOptions,
        metadata: &Metadata,
        integration: Option<&Integration>,
    ) -> WorkflowStepResult {
        let result = match self
            .direct_call(step, payload, credentials, options, metadata, integration)
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
            "direct step completed"
        );
        result
    }

    async fn direct_call(
        &self,
        step: &WorkflowStep,
        payload: &Value,
        credentials: &Credentials,
        options: &RequestOptions,
        metadata: &Metadata,
        integration: Option<&Integration>,
    ) -> Result<WorkflowStepResult, CallError> {
        let executed = self
            .executor
            .execute_api_call(&step.config, payload, credentials, options, metadata, integration)
            .await?;

        let transformed = self.apply_mapping(&executed.data, step.response_mapping.as_deref())?;

        Ok(WorkflowStepResult::ok(
            step.id.clone(),
            executed.data,
            transformed,
            executed.config,
        ))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
