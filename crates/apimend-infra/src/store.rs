//! In-memory keyed store backed by DashMap.
//!
//! Atomic per-key read/write, safe for concurrent callers. No cross-key
//! transactions.

use apimend_core::repository::ConfigStore;
use apimend_types::config::ApiConfig;
use apimend_types::error::StoreError;
use apimend_types::integration::Integration;
use apimend_types::run::RunRecord;
use dashmap::DashMap;
use uuid::Uuid;

/// DashMap-backed [`ConfigStore`] implementation.
#[derive(Default)]
pub struct InMemoryConfigStore {
    configs: DashMap<String, ApiConfig>,
    runs: DashMap<Uuid, RunRecord>,
    integrations: DashMap<String, Integration>,
}

impl InMemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an integration under its lookup key (the target host).
    pub fn insert_integration(&self, key: impl Into<String>, integration: Integration) {
        self.integrations.insert(key.into(), integration);
    }

    /// Fetch a persisted run by ID.
    pub fn get_run(&self, id: Uuid) -> Option<RunRecord> {
        self.runs.get(&id).map(|entry| entry.clone())
    }

    pub fn run_count(&self) -> usize {
        self.runs.len()
    }
}

impl ConfigStore for InMemoryConfigStore {
    async fn get_config(&self, id: &str) -> Result<Option<ApiConfig>, StoreError> {
        Ok(self.configs.get(id).map(|entry| entry.clone()))
    }

    async fn upsert_config(&self, id: &str, config: &ApiConfig) -> Result<ApiConfig, StoreError> {
        self.configs.insert(id.to_string(), config.clone());
        Ok(config.clone())
    }

    async fn create_run(&self, record: &RunRecord) -> Result<(), StoreError> {
        if self.runs.contains_key(&record.id) {
            return Err(StoreError::Conflict(format!(
                "run {} already recorded",
                record.id
            )));
        }
        self.runs.insert(record.id, record.clone());
        Ok(())
    }

    async fn get_integration(&self, id: &str) -> Result<Option<Integration>, StoreError> {
        Ok(self.integrations.get(id).map(|entry| entry.clone()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn sample_config(id: &str) -> ApiConfig {
        ApiConfig {
            id: id.to_string(),
            url_host: "https://api.example.com".to_string(),
            url_path: "/items".to_string(),
            method: "GET".to_string(),
            headers: None,
            query_params: None,
            body: None,
            instruction: "list items".to_string(),
            response_schema: None,
            response_mapping: None,
        }
    }

    #[tokio::test]
    async fn test_config_roundtrip() {
        let store = InMemoryConfigStore::new();
        assert!(store.get_config("c1").await.unwrap().is_none());

        store.upsert_config("c1", &sample_config("c1")).await.unwrap();
        let fetched = store.get_config("c1").await.unwrap().unwrap();
        assert_eq!(fetched.url_path, "/items");

        let mut refined = sample_config("c1");
        refined.url_path = "/v2/items".to_string();
        store.upsert_config("c1", &refined).await.unwrap();
        let fetched = store.get_config("c1").await.unwrap().unwrap();
        assert_eq!(fetched.url_path, "/v2/items");
    }

    #[tokio::test]
    async fn test_duplicate_run_is_conflict() {
        let store = InMemoryConfigStore::new();
        let record = RunRecord {
            id: Uuid::now_v7(),
            org_id: None,
            config: sample_config("c1"),
            success: true,
            error: None,
            started_at: Utc::now(),
            completed_at: Utc::now(),
        };

        store.create_run(&record).await.unwrap();
        assert!(matches!(
            store.create_run(&record).await,
            Err(StoreError::Conflict(_))
        ));
        assert_eq!(store.run_count(), 1);
        assert!(store.get_run(record.id).is_some());
    }

    #[tokio::test]
    async fn test_integration_lookup() {
        let store = InMemoryConfigStore::new();
        store.insert_integration(
            "https://api.stripe.com",
            Integration {
                id: "stripe".to_string(),
                url_host: Some("https://api.stripe.com".to_string()),
                documentation: Some("POST /v1/charges".to_string()),
                documentation_pending: false,
            },
        );

        let found = store
            .get_integration("https://api.stripe.com")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, "stripe");
        assert!(store.get_integration("https://other").await.unwrap().is_none());
    }
}
