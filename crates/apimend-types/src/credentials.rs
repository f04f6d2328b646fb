//! Caller-supplied credentials for API calls.
//!
//! A flat mapping of secret name to secret value. The values are never in
//! `Debug` output and are never copied into persisted state unredacted --
//! error strings pass through credential masking before they leave the
//! engine.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Flat secret-name to secret-value mapping.
///
/// Passed by reference throughout the engine so that error masking can see
/// every known secret value.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Credentials(HashMap<String, String>);

impl Credentials {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    /// Look up a secret value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    /// Iterate over `(name, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Iterate over secret values (for masking).
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.0.values().map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<HashMap<String, String>> for Credentials {
    fn from(map: HashMap<String, String>) -> Self {
        Self(map)
    }
}

impl<const N: usize> From<[(&str, &str); N]> for Credentials {
    fn from(pairs: [(&str, &str); N]) -> Self {
        Self(
            pairs
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
        )
    }
}

// Debug prints key names only. The values never appear.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<&str> = self.0.keys().map(String::as_str).collect();
        keys.sort_unstable();
        f.debug_tuple("Credentials").field(&keys).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_values() {
        let creds = Credentials::from([("api_key", "sk-secret-123"), ("token", "tok-456")]);
        let debug = format!("{creds:?}");
        assert!(debug.contains("api_key"));
        assert!(debug.contains("token"));
        assert!(!debug.contains("sk-secret-123"));
        assert!(!debug.contains("tok-456"));
    }

    #[test]
    fn test_get_and_len() {
        let creds = Credentials::from([("api_key", "abc")]);
        assert_eq!(creds.get("api_key"), Some("abc"));
        assert_eq!(creds.get("missing"), None);
        assert_eq!(creds.len(), 1);
        assert!(!creds.is_empty());
    }

    #[test]
    fn test_values_iterator() {
        let creds = Credentials::from([("a", "1"), ("b", "2")]);
        let mut values: Vec<&str> = creds.values().collect();
        values.sort_unstable();
        assert_eq!(values, vec!["1", "2"]);
    }
}
