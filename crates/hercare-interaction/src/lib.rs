//! Outbound HTTP layer for the AskHerCare conversation client.
//!
//! This crate provides the reqwest-based implementation of the
//! [`AssistantGateway`](hercare_core::gateway::AssistantGateway)
//! trait defined in the domain layer.

pub mod assistant_client;

pub use assistant_client::AssistantApiClient;
