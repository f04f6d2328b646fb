//! Run records and per-call metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::ApiConfig;

// ---------------------------------------------------------------------------
// Metadata
// ---------------------------------------------------------------------------

/// Identifiers threaded through a call for logging and telemetry only.
/// Never used for control flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    /// UUIDv7 run ID.
    pub run_id: Uuid,
    /// Owning organization, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
}

impl Metadata {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::now_v7(),
            org_id: None,
        }
    }

    pub fn with_org(org_id: impl Into<String>) -> Self {
        Self {
            run_id: Uuid::now_v7(),
            org_id: Some(org_id.into()),
        }
    }
}

impl Default for Metadata {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// RunRecord
// ---------------------------------------------------------------------------

/// A persisted outcome for one orchestrated call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// UUIDv7 run ID.
    pub id: Uuid,
    /// Owning organization, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
    /// The final config (possibly refined by healing).
    pub config: ApiConfig,
    /// Whether the call succeeded.
    pub success: bool,
    /// Credential-masked error when the call failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the orchestrated call started.
    pub started_at: DateTime<Utc>,
    /// When it completed.
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> ApiConfig {
        ApiConfig {
            id: "c1".to_string(),
            url_host: "https://api.example.com".to_string(),
            url_path: "".to_string(),
            method: "GET".to_string(),
            headers: None,
            query_params: None,
            body: None,
            instruction: "list".to_string(),
            response_schema: None,
            response_mapping: None,
        }
    }

    #[test]
    fn test_metadata_ids_unique() {
        let a = Metadata::new();
        let b = Metadata::new();
        assert_ne!(a.run_id, b.run_id);
        assert!(a.org_id.is_none());
    }

    #[test]
    fn test_run_record_roundtrip() {
        let record = RunRecord {
            id: Uuid::now_v7(),
            org_id: Some("org-1".to_string()),
            config: sample_config(),
            success: false,
            error: Some("retry budget exhausted".to_string()),
            started_at: Utc::now(),
            completed_at: Utc::now(),
        };
        let json = serde_json::to_string(&record).unwrap();
        let parsed: RunRecord = serde_json::from_str(&json).unwrap();
        assert!(!parsed.success);
        assert_eq!(parsed.error.as_deref(), Some("retry budget exhausted"));
    }
}
