//! Integration metadata: documentation context for config synthesis.

use serde::{Deserialize, Serialize};

/// An external API integration known to the keyed store.
///
/// The documentation string is scraped/processed asynchronously; while that
/// is in flight `documentation_pending` is true and synthesis proceeds
/// without documentation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Integration {
    /// Stable integration identifier (e.g. "stripe").
    pub id: String,
    /// Base host this integration targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_host: Option<String>,
    /// Processed API documentation for the synthesizer prompt.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub documentation: Option<String>,
    /// True while asynchronous documentation processing has not finished.
    #[serde(default)]
    pub documentation_pending: bool,
}

impl Integration {
    /// Documentation ready for use in a synthesis prompt, if any.
    pub fn ready_documentation(&self) -> Option<&str> {
        if self.documentation_pending {
            None
        } else {
            self.documentation.as_deref()
        }
    }
}
