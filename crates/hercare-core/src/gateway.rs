//! Assistant service gateway trait.
//!
//! Defines the contract for the remote Q&A assistant, decoupling the
//! conversation logic from the HTTP transport (and letting tests run
//! against mocks).

use async_trait::async_trait;

use crate::category::HealthCategory;
use crate::error::Result;
use crate::message::Source;
use crate::personality::PersonalityMode;

/// An outbound chat request.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatPrompt {
    /// The user's question, already trimmed and non-empty.
    pub message: String,
    /// The active personality mode.
    pub personality_mode: PersonalityMode,
    /// The selected category id, if any.
    pub category: Option<String>,
}

/// A successful chat reply.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatReply {
    /// The assistant's answer text.
    pub message: String,
    /// Retrieval sources backing the answer (may be empty).
    pub sources: Vec<Source>,
    /// Answer confidence in [0, 1], when the service reports one.
    pub confidence: Option<f64>,
}

/// A successful explain-term reply.
#[derive(Debug, Clone, PartialEq)]
pub struct TermExplanation {
    /// The term as echoed by the service.
    pub term: String,
    /// Plain-language explanation of the term.
    pub explanation: String,
}

/// An abstract gateway to the remote assistant service.
///
/// Every operation is a single best-effort attempt: no retries, no
/// timeouts at this layer. Implementations map transport failures and
/// non-success statuses to `Transport` / `Api` errors and never panic.
#[async_trait]
pub trait AssistantGateway: Send + Sync {
    /// Asks the assistant a question.
    ///
    /// # Returns
    ///
    /// - `Ok(ChatReply)`: the assistant answered
    /// - `Err(_)`: transport failure or non-success service status
    async fn chat(&self, prompt: &ChatPrompt) -> Result<ChatReply>;

    /// Rewrites `text` in simpler language.
    async fn simplify(&self, text: &str) -> Result<String>;

    /// Explains a medical term in plain language.
    async fn explain_term(&self, term: &str) -> Result<TermExplanation>;

    /// Fetches the question category catalog.
    async fn categories(&self) -> Result<Vec<HealthCategory>>;
}
