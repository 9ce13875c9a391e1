//! Conversation orchestration module.
//!
//! # Module Structure
//!
//! - `coordinator`: maps user intents to single outbound assistant
//!   calls and their store mutations (`RequestCoordinator`)
//! - `controller`: top-level conversation orchestration and ambient
//!   session state (`ConversationController`)

mod controller;
mod coordinator;

// Re-export public API
pub use controller::{CategoryCatalog, ConversationController, ConversationSession, View};
pub use coordinator::{RequestCoordinator, SendOutcome};
