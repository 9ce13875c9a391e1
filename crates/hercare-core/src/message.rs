//! Conversation message types.
//!
//! A [`Message`] is created once and treated as immutable afterwards,
//! with two exceptions: `simplified_content` and `show_simplified` may
//! be patched later when a simplify action resolves. Everything else
//! is write-once by contract.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::personality::PersonalityMode;

/// Confidence below this value attaches a low-confidence disclaimer
/// to the rendered message.
pub const LOW_CONFIDENCE_THRESHOLD: f64 = 0.7;

/// Confidence assumed when the assistant service omits the field.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Fixed user-visible reply substituted when a chat request fails.
pub const SEND_FAILURE_REPLY: &str = "I'm having some trouble right now, but I'm here to help! \
     Could you try asking your question again?";

/// Represents the role of a message in a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    /// Message from the user.
    User,
    /// Message from the AI assistant.
    Assistant,
}

/// A retrieval source backing an assistant reply.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Source {
    /// Excerpt of the source document.
    pub content: String,
    /// Relevance score in [0, 1].
    pub score: f64,
}

/// A single message in the conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    /// Unique message identifier (UUID format), assigned at creation.
    pub id: String,
    /// The role of the message sender.
    pub role: MessageRole,
    /// Primary display text.
    pub content: String,
    /// Timestamp when the message was created (ISO 8601 format).
    pub created_at: String,
    /// Set on assistant messages substituted for a failed chat request.
    #[serde(default)]
    pub is_error: bool,
    /// Set on assistant messages produced by an explain-term action.
    #[serde(default)]
    pub is_explanation: bool,
    /// Retrieval sources, present only on successful assistant replies.
    #[serde(default)]
    pub sources: Vec<Source>,
    /// Answer confidence in [0, 1], when reported by the service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    /// The personality mode active when this reply was produced.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personality_tag: Option<PersonalityMode>,
    /// Simplified body, populated by a later simplify action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub simplified_content: Option<String>,
    /// Whether the simplified body is the one to render.
    #[serde(default)]
    pub show_simplified: bool,
}

impl Message {
    fn base(role: MessageRole, content: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content,
            created_at: chrono::Utc::now().to_rfc3339(),
            is_error: false,
            is_explanation: false,
            sources: Vec::new(),
            confidence: None,
            personality_tag: None,
            simplified_content: None,
            show_simplified: false,
        }
    }

    /// Creates a user message. The caller is expected to pass already
    /// trimmed, non-empty text.
    pub fn user(text: impl Into<String>) -> Self {
        Self::base(MessageRole::User, text.into())
    }

    /// Creates a normal assistant reply.
    pub fn assistant(
        content: impl Into<String>,
        sources: Vec<Source>,
        confidence: f64,
        personality: PersonalityMode,
    ) -> Self {
        let mut message = Self::base(MessageRole::Assistant, content.into());
        message.sources = sources;
        message.confidence = Some(confidence);
        message.personality_tag = Some(personality);
        message
    }

    /// Creates the error-flagged assistant reply substituted when a
    /// chat request fails.
    pub fn error_reply(personality: PersonalityMode) -> Self {
        let mut message = Self::base(MessageRole::Assistant, SEND_FAILURE_REPLY.to_string());
        message.is_error = true;
        message.personality_tag = Some(personality);
        message
    }

    /// Creates the explanation-flagged assistant reply for an
    /// explain-term result, formatted as `**<term>**: <explanation>`.
    pub fn explanation(term: &str, explanation: &str, personality: PersonalityMode) -> Self {
        let mut message = Self::base(MessageRole::Assistant, format!("**{term}**: {explanation}"));
        message.is_explanation = true;
        message.personality_tag = Some(personality);
        message
    }

    /// Whether a low-confidence disclaimer should accompany this
    /// message when rendered.
    pub fn needs_disclaimer(&self) -> bool {
        self.confidence
            .is_some_and(|confidence| confidence < LOW_CONFIDENCE_THRESHOLD)
    }

    /// The body to render: the simplified text when the toggle is set
    /// and a simplified body exists, the original content otherwise.
    pub fn display_content(&self) -> &str {
        if self.show_simplified {
            if let Some(simplified) = &self.simplified_content {
                return simplified;
            }
        }
        &self.content
    }
}
