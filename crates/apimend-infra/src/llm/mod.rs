//! Anthropic-backed implementations of the synthesis and validation traits.

pub mod client;
pub mod synthesizer;
pub mod validator;

pub use client::{AnthropicClient, LlmError};
pub use synthesizer::LlmConfigSynthesizer;
pub use validator::LlmResponseValidator;

/// Strip a Markdown code fence from an LLM reply, if present.
///
/// Models frequently wrap JSON answers in ```json fences despite being
/// asked not to.
pub(crate) fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = match inner.find('\n') {
        Some(newline) => &inner[newline + 1..],
        None => inner,
    };
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
