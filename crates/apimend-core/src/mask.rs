//! Credential masking for error strings.
//!
//! Every error string is masked before logging, transcript-appending,
//! persistence, or return. Masking replaces each known credential value with
//! a placeholder, then truncates the result.

use apimend_types::credentials::Credentials;

/// Placeholder substituted for credential values.
pub const MASKED: &str = "<masked>";

/// Maximum length of a masked error string.
pub const MAX_ERROR_LEN: usize = 1000;

/// Replace every known credential value in `message` with [`MASKED`], then
/// truncate to [`MAX_ERROR_LEN`] characters.
///
/// Very short credential values (under 4 characters) are skipped so that
/// masking cannot shred unrelated text.
pub fn mask_credentials(message: &str, credentials: &Credentials) -> String {
    let mut masked = message.to_string();
    for value in credentials.values() {
        if value.len() < 4 {
            continue;
        }
        masked = masked.replace(value, MASKED);
    }
    truncate(&masked, MAX_ERROR_LEN)
}

/// Truncate a string to at most `max` characters, appending an ellipsis
/// marker when anything was cut. The marker counts against the limit, so
/// the output never exceeds `max` characters. Safe on multi-byte
/// characters.
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{cut}...")
}
