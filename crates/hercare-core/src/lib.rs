//! Domain layer for the AskHerCare conversation client.
//!
//! This crate contains the conversation domain model (messages, the
//! ordered message store, personality modes, health categories), the
//! `AssistantGateway` trait that abstracts the remote assistant
//! service, and the shared error type used across the workspace.

pub mod category;
pub mod error;
pub mod gateway;
pub mod message;
pub mod personality;
pub mod selection;
pub mod store;

// Re-export common error type
pub use error::{HerCareError, Result};
