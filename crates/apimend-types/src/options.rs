//! Per-call request options: self-healing mode, cache mode, retry budget.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Mode enums
// ---------------------------------------------------------------------------

/// How much of the self-healing machinery is active for a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelfHealingMode {
    /// No config regeneration, no response validation.
    Disabled,
    /// Full healing: regenerate configs and validate responses.
    Enabled,
    /// Heal the request config only; downstream transform healing is skipped.
    RequestOnly,
}

/// How the config cache (keyed store) is consulted for a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheMode {
    Disabled,
    Enabled,
    Readonly,
    Writeonly,
}

impl Default for CacheMode {
    fn default() -> Self {
        CacheMode::Enabled
    }
}

// ---------------------------------------------------------------------------
// RequestOptions
// ---------------------------------------------------------------------------

/// Options controlling one API call. Immutable per call; the loop strategy
/// copies these and forces `test_mode` off for iterations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RequestOptions {
    /// Self-healing mode. `None` means the engine default (enabled).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub self_healing: Option<SelfHealingMode>,
    /// Config cache mode.
    #[serde(default)]
    pub cache_mode: CacheMode,
    /// Retry budget for the self-healing call executor. `None` means the
    /// engine default (`EngineConfig::default_retries`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retries: Option<u32>,
    /// Webhook URL to notify when the orchestrated call completes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    /// Test-mode flag. Forced off for loop iterations.
    #[serde(default)]
    pub test_mode: bool,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            self_healing: None,
            cache_mode: CacheMode::default(),
            retries: None,
            webhook_url: None,
            test_mode: false,
        }
    }
}

impl RequestOptions {
    /// Resolve the retry budget for a call: the per-call override when set,
    /// otherwise the engine default. Clamped to at least one attempt.
    pub fn retry_budget(&self, default_retries: u32) -> u32 {
        self.retries.unwrap_or(default_retries).max(1)
    }

    /// Whether self-healing is active.
    ///
    /// Enabled by default: healing is disabled only when a mode is present
    /// and it is neither `Enabled` nor `RequestOnly`. An unset mode is
    /// treated as enabled.
    pub fn healing_enabled(&self) -> bool {
        match self.self_healing {
            Some(mode) => matches!(
                mode,
                SelfHealingMode::Enabled | SelfHealingMode::RequestOnly
            ),
            None => true,
        }
    }

    /// Whether the orchestrator should read configs from the keyed store.
    pub fn read_cache(&self) -> bool {
        matches!(self.cache_mode, CacheMode::Enabled | CacheMode::Readonly)
    }

    /// Whether the orchestrator should persist refined configs back.
    pub fn write_cache(&self) -> bool {
        matches!(self.cache_mode, CacheMode::Enabled | CacheMode::Writeonly)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = RequestOptions::default();
        assert!(opts.retries.is_none());
        assert_eq!(opts.cache_mode, CacheMode::Enabled);
        assert!(!opts.test_mode);
        assert!(opts.webhook_url.is_none());
    }

    #[test]
    fn test_healing_enabled_polarity() {
        let mut opts = RequestOptions::default();
        assert!(opts.healing_enabled(), "unset mode is enabled");

        opts.self_healing = Some(SelfHealingMode::Enabled);
        assert!(opts.healing_enabled());

        opts.self_healing = Some(SelfHealingMode::RequestOnly);
        assert!(opts.healing_enabled());

        opts.self_healing = Some(SelfHealingMode::Disabled);
        assert!(!opts.healing_enabled());
    }

    #[test]
    fn test_cache_predicates() {
        let mut opts = RequestOptions::default();

        opts.cache_mode = CacheMode::Enabled;
        assert!(opts.read_cache());
        assert!(opts.write_cache());

        opts.cache_mode = CacheMode::Readonly;
        assert!(opts.read_cache());
        assert!(!opts.write_cache());

        opts.cache_mode = CacheMode::Writeonly;
        assert!(!opts.read_cache());
        assert!(opts.write_cache());

        opts.cache_mode = CacheMode::Disabled;
        assert!(!opts.read_cache());
        assert!(!opts.write_cache());
    }

    #[test]
    fn test_options_serde_defaults() {
        let opts: RequestOptions = serde_json::from_str("{}").unwrap();
        assert!(opts.retries.is_none());
        assert!(opts.self_healing.is_none());
        assert!(opts.healing_enabled());
    }

    #[test]
    fn test_retry_budget_resolution() {
        let mut opts = RequestOptions::default();
        assert_eq!(opts.retry_budget(8), 8, "unset falls back to the default");

        opts.retries = Some(3);
        assert_eq!(opts.retry_budget(8), 3, "per-call override wins");

        opts.retries = Some(0);
        assert_eq!(opts.retry_budget(8), 1, "at least one attempt");
    }

    #[test]
    fn test_mode_serde() {
        let json = serde_json::to_string(&SelfHealingMode::RequestOnly).unwrap();
        assert_eq!(json, "\"request_only\"");
        let json = serde_json::to_string(&CacheMode::Writeonly).unwrap();
        assert_eq!(json, "\"writeonly\"");
    }
}
