//! Application layer for the AskHerCare conversation client.
//!
//! This crate orchestrates the conversation: the request coordinator
//! turns user intents into single outbound assistant calls and maps
//! their outcomes back onto the message store, and the conversation
//! controller owns the store, the coordinator, and the ambient session
//! state the view layer renders from.

pub mod conversation;

pub use conversation::{
    CategoryCatalog, ConversationController, ConversationSession, RequestCoordinator, SendOutcome,
    View,
};
