//! The self-healing call path: collaborator traits and the executor.

pub mod executor;
pub mod synthesizer;
pub mod transport;
pub mod validator;
pub mod webhook;

pub use executor::{ApiCallExecutor, ExecutedCall};
pub use synthesizer::{ConfigSynthesizer, Synthesis};
pub use transport::TransportCaller;
pub use validator::{ResponseValidator, Verdict};
pub use webhook::WebhookNotifier;
