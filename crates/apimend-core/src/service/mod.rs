//! Top-level call orchestration.

mod call;

pub use call::{CallResult, CallService, ConfigRef};
