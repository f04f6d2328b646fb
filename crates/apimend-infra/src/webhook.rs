//! Signed HTTP webhook notifier.
//!
//! Posts a JSON completion payload to the caller's webhook URL. When a
//! signing secret is configured, the request carries an
//! `X-Apimend-Signature` header holding the base64-encoded HMAC-SHA256 of
//! the body. Delivery is best-effort: failures are logged and never
//! retried.

use std::time::Duration;

use apimend_core::call::WebhookNotifier;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde_json::{Value, json};
use sha2::Sha256;
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Signature header on outgoing webhook requests.
pub const SIGNATURE_HEADER: &str = "X-Apimend-Signature";

/// Reqwest-based [`WebhookNotifier`] implementation.
pub struct HttpWebhookNotifier {
    client: reqwest::Client,
    signing_secret: Option<SecretString>,
}

impl HttpWebhookNotifier {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("failed to create reqwest client");
        Self {
            client,
            signing_secret: None,
        }
    }

    /// Sign outgoing payloads with the given shared secret.
    pub fn with_signing_secret(mut self, secret: SecretString) -> Self {
        self.signing_secret = Some(secret);
        self
    }
}

impl Default for HttpWebhookNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl WebhookNotifier for HttpWebhookNotifier {
    async fn notify(
        &self,
        url: &str,
        run_id: Uuid,
        success: bool,
        data: Option<&Value>,
        error: Option<&str>,
    ) {
        let body = json!({
            "run_id": run_id,
            "success": success,
            "data": data,
            "error": error,
        })
        .to_string();

        let mut request = self
            .client
            .post(url)
            .header("content-type", "application/json");
        if let Some(secret) = &self.signing_secret {
            if let Some(signature) = sign_payload(secret.expose_secret().as_bytes(), body.as_bytes())
            {
                request = request.header(SIGNATURE_HEADER, signature);
            }
        }

        match request.body(body).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::debug!(%run_id, url, "webhook delivered");
            }
            Ok(response) => {
                tracing::warn!(
                    %run_id,
                    url,
                    status = %response.status(),
                    "webhook delivery rejected"
                );
            }
            Err(e) => {
                tracing::warn!(%run_id, url, error = %e, "webhook delivery failed");
            }
        }
    }
}

/// Base64-encoded HMAC-SHA256 of the body. HMAC accepts any key length, so
/// this only returns `None` on a pathological key error.
fn sign_payload(secret: &[u8], body: &[u8]) -> Option<String> {
    let mut mac = HmacSha256::new_from_slice(secret).ok()?;
    mac.update(body);
    Some(BASE64.encode(mac.finalize().into_bytes()))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
