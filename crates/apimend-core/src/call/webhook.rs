//! Webhook notifier trait definition.

use serde_json::Value;
use uuid::Uuid;

/// Delivers a completion notification for an orchestrated call.
///
/// Best-effort: delivery failures are logged by the implementation and never
/// retried by the engine.
pub trait WebhookNotifier: Send + Sync {
    fn notify(
        &self,
        url: &str,
        run_id: Uuid,
        success: bool,
        data: Option<&Value>,
        error: Option<&str>,
    ) -> impl std::future::Future<Output = ()> + Send;
}
