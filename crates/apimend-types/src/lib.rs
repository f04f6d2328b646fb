//! Shared domain types for apimend.
//!
//! This crate contains the core domain types used across the apimend engine:
//! workflow steps, API call configurations, request options, credentials,
//! synthesis transcripts, run records, and their associated error types.
//!
//! Zero infrastructure dependencies -- only serde, uuid, chrono, thiserror.

pub mod config;
pub mod credentials;
pub mod error;
pub mod integration;
pub mod options;
pub mod run;
pub mod step;
pub mod transcript;
