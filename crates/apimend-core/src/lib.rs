//! Step execution engine and collaborator trait definitions for apimend.
//!
//! This crate defines the "ports" (collaborator traits) that the
//! infrastructure layer implements, plus the engine itself: the self-healing
//! call executor, the Direct and Loop execution strategies, and the call
//! orchestrator. It depends only on `apimend-types` -- never on
//! `apimend-infra` or any HTTP/database crate.

pub mod call;
pub mod mask;
pub mod repository;
pub mod service;
pub mod step;
pub mod transform;
