//! Keyed-store trait definition.
//!
//! Defines the storage interface for API call configs, run records, and
//! integrations. The infrastructure layer implements this trait (the
//! in-memory DashMap store ships with apimend-infra).
//!
//! Each key's value is opaque structured data; the store must tolerate
//! concurrent callers and provide atomic per-key read/write. No cross-key
//! transactions are required.

use apimend_types::config::ApiConfig;
use apimend_types::error::StoreError;
use apimend_types::integration::Integration;
use apimend_types::run::RunRecord;

/// Repository trait for config/run/integration persistence.
///
/// Uses native async fn in traits (Rust 2024 edition, no async_trait macro).
pub trait ConfigStore: Send + Sync {
    /// Get an API config by ID. `Ok(None)` when the key is absent.
    fn get_config(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<ApiConfig>, StoreError>> + Send;

    /// Insert or replace a config by ID, returning the stored value.
    fn upsert_config(
        &self,
        id: &str,
        config: &ApiConfig,
    ) -> impl std::future::Future<Output = Result<ApiConfig, StoreError>> + Send;

    /// Persist a run record.
    fn create_run(
        &self,
        record: &RunRecord,
    ) -> impl std::future::Future<Output = Result<(), StoreError>> + Send;

    /// Get an integration by ID. `Ok(None)` when the key is absent.
    fn get_integration(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Integration>, StoreError>> + Send;
}
