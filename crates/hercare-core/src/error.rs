//! Error types for the AskHerCare conversation core.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the conversation core.
///
/// This provides typed, structured error variants with automatic
/// conversion from common error types via the `From` trait. No variant
/// is ever fatal to a conversation session: callers recover every
/// failure into a renderable state (see the coordinator layer).
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum HerCareError {
    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A message id was appended twice (programming-invariant violation)
    #[error("Duplicate message id: '{id}'")]
    DuplicateId { id: String },

    /// User input rejected before any request was issued
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network-level failure reaching the assistant service
    #[error("Transport error: {0}")]
    Transport(String),

    /// The assistant service answered with a non-success status
    #[error("Assistant service error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization { format: String, message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl HerCareError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates a DuplicateId error
    pub fn duplicate_id(id: impl Into<String>) -> Self {
        Self::DuplicateId { id: id.into() }
    }

    /// Creates an InvalidInput error
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput(message.into())
    }

    /// Creates a Transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport(message.into())
    }

    /// Creates an Api error
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a DuplicateId error
    pub fn is_duplicate_id(&self) -> bool {
        matches!(self, Self::DuplicateId { .. })
    }

    /// Check if this is an InvalidInput error
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, Self::InvalidInput(_))
    }

    /// Check if this error came from the wire (transport failure or a
    /// non-success service status).
    pub fn is_service_failure(&self) -> bool {
        matches!(self, Self::Transport(_) | Self::Api { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<serde_json::Error> for HerCareError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from String (for error messages)
impl From<String> for HerCareError {
    fn from(err: String) -> Self {
        Self::Internal(err)
    }
}

/// A type alias for `Result<T, HerCareError>`.
pub type Result<T> = std::result::Result<T, HerCareError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = HerCareError::not_found("message", "abc-123");
        assert_eq!(err.to_string(), "Entity not found: message 'abc-123'");
        assert!(err.is_not_found());
    }

    #[test]
    fn test_service_failure_covers_transport_and_api() {
        assert!(HerCareError::transport("connection refused").is_service_failure());
        assert!(HerCareError::api(503, "unavailable").is_service_failure());
        assert!(!HerCareError::duplicate_id("x").is_service_failure());
    }
}
