//! Storage trait definitions ("ports") implemented by the infrastructure
//! layer.

pub mod config;

pub use config::ConfigStore;
