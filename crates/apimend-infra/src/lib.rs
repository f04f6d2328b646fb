//! Infrastructure implementations of the apimend collaborator traits.
//!
//! This crate provides the concrete adapters the engine runs on: the
//! reqwest-based HTTP transport, the Anthropic-backed config synthesizer
//! and response validator, the DashMap in-memory keyed store, the signed
//! HTTP webhook notifier, and the engine config loader.

pub mod config;
pub mod http;
pub mod llm;
pub mod store;
pub mod webhook;

pub use config::load_engine_config;
pub use http::HttpTransportCaller;
pub use llm::{AnthropicClient, LlmConfigSynthesizer, LlmResponseValidator};
pub use store::InMemoryConfigStore;
pub use webhook::HttpWebhookNotifier;
