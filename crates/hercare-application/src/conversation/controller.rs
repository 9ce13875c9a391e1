//! Top-level conversation orchestration.
//!
//! The controller owns one message store, one request coordinator, one
//! selection tracker, and the ambient session state (personality mode,
//! selected category, current view). It is the only entry point the
//! view layer talks to.

use std::sync::Arc;

use hercare_core::Result;
use hercare_core::category::{HealthCategory, default_categories};
use hercare_core::gateway::AssistantGateway;
use hercare_core::message::Message;
use hercare_core::personality::PersonalityMode;
use hercare_core::selection::SelectionTracker;
use hercare_core::store::MessageStore;
use tokio::sync::RwLock;

use super::coordinator::{RequestCoordinator, SendOutcome};

/// The screen the client is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Category cards and personality picker.
    Home,
    /// The conversation transcript.
    Chat,
}

/// Ambient per-conversation state, recreated on "new chat".
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSession {
    /// The active personality mode.
    pub personality_mode: PersonalityMode,
    /// The category the chat was started from, if any.
    pub selected_category: Option<String>,
    /// The current view.
    pub view: View,
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self {
            personality_mode: PersonalityMode::default(),
            selected_category: None,
            view: View::Home,
        }
    }
}

/// The category catalog together with how it was obtained.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryCatalog {
    /// The categories to render.
    pub categories: Vec<HealthCategory>,
    /// True when the service could not be reached and the built-in
    /// list is standing in (degraded-mode notice, never a fatal error).
    pub degraded: bool,
}

/// Orchestrates the conversation for one client session.
pub struct ConversationController {
    /// The conversation's message log, shared with the coordinator
    store: Arc<RwLock<MessageStore>>,
    /// Issues outbound assistant calls and maps outcomes to the store
    coordinator: RequestCoordinator,
    /// The user's current text selection, seeding explain-term
    selection: RwLock<SelectionTracker>,
    /// Ambient session state
    session: RwLock<ConversationSession>,
    /// Gateway handle for the category catalog
    gateway: Arc<dyn AssistantGateway>,
}

impl ConversationController {
    /// Creates a controller with a fresh, empty conversation.
    pub fn new(gateway: Arc<dyn AssistantGateway>) -> Self {
        let store = Arc::new(RwLock::new(MessageStore::new()));
        Self {
            coordinator: RequestCoordinator::new(gateway.clone(), store.clone()),
            store,
            selection: RwLock::new(SelectionTracker::new()),
            session: RwLock::new(ConversationSession::default()),
            gateway,
        }
    }

    /// Enters the chat view, optionally seeded with a category.
    pub async fn start_chat(&self, category: Option<String>) {
        let mut session = self.session.write().await;
        session.selected_category = category;
        session.view = View::Chat;
    }

    /// Starts a new chat: clears the transcript and the selection,
    /// drops the selected category and returns to the home view.
    ///
    /// Requests still in flight stay safe: their late resolutions
    /// patch nothing (missing ids are no-ops) or land as stale new
    /// messages, per the store contract.
    pub async fn reset_conversation(&self) {
        self.store.write().await.clear();
        self.selection.write().await.clear();
        let mut session = self.session.write().await;
        session.selected_category = None;
        session.view = View::Home;
        tracing::info!("conversation reset");
    }

    /// Sends a user message using the session's personality mode and
    /// selected category. Blank text or an in-flight send is a quiet
    /// no-op (`Ignored`).
    pub async fn send(&self, text: &str) -> Result<SendOutcome> {
        let (personality, category) = {
            let session = self.session.read().await;
            (session.personality_mode, session.selected_category.clone())
        };
        self.coordinator.send_message(text, personality, category).await
    }

    /// Requests a simplified rewrite of the given assistant message.
    pub async fn simplify_message(&self, message_id: &str) -> Result<()> {
        self.coordinator.simplify(message_id).await
    }

    /// Records the user's current text selection.
    pub async fn capture_selection(&self, text: &str) {
        self.selection.write().await.capture(text);
    }

    /// Asks the assistant to explain the currently selected term,
    /// consuming the selection. No selection means no request.
    pub async fn explain_selection(&self) -> Result<()> {
        let Some(term) = self.selection.write().await.consume_and_clear() else {
            return Ok(());
        };
        let personality = self.session.read().await.personality_mode;
        self.coordinator.explain_term(&term, personality).await
    }

    /// Flips which body (original or simplified) a message renders.
    /// Returns `true` if the toggle applied; messages without a
    /// simplified body are left alone.
    pub async fn toggle_simplified(&self, message_id: &str) -> bool {
        let mut store = self.store.write().await;
        let has_simplified = store
            .get(message_id)
            .is_some_and(|message| message.simplified_content.is_some());
        if !has_simplified {
            return false;
        }
        store.patch_by_id(message_id, |message| {
            message.show_simplified = !message.show_simplified;
        })
    }

    /// Switches the active personality mode for subsequent sends.
    pub async fn set_personality(&self, mode: PersonalityMode) {
        self.session.write().await.personality_mode = mode;
    }

    /// Fetches the category catalog, falling back to the built-in list
    /// when the service is unreachable. Catalog failure is reported
    /// only as the `degraded` flag, never as an error.
    pub async fn load_categories(&self) -> CategoryCatalog {
        match self.gateway.categories().await {
            Ok(categories) => CategoryCatalog {
                categories,
                degraded: false,
            },
            Err(err) => {
                tracing::warn!("category fetch failed, using built-in list: {err}");
                CategoryCatalog {
                    categories: default_categories(),
                    degraded: true,
                }
            }
        }
    }

    /// Snapshot of the transcript for rendering.
    pub async fn messages(&self) -> Vec<Message> {
        self.store.read().await.list().to_vec()
    }

    /// The current view.
    pub async fn view(&self) -> View {
        self.session.read().await.view
    }

    /// The active personality mode.
    pub async fn personality(&self) -> PersonalityMode {
        self.session.read().await.personality_mode
    }

    /// The selected category id, if any.
    pub async fn selected_category(&self) -> Option<String> {
        self.session.read().await.selected_category.clone()
    }

    /// Whether a send is outstanding (UI disable hook).
    pub fn is_send_in_flight(&self) -> bool {
        self.coordinator.is_send_in_flight()
    }
}
