//! Request coordination between user actions and the assistant service.
//!
//! The coordinator translates each user intent (send, simplify,
//! explain-term) into exactly one outbound call and deterministically
//! maps the outcome back onto the message store. Sends are
//! single-flight; simplify and explain-term run independently of the
//! send gate. The send/simplify error asymmetry (user-visible apology
//! vs. silent drop) is contractual: minor-feature failures must not
//! clutter the transcript.

use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use hercare_core::Result;
use hercare_core::gateway::{AssistantGateway, ChatPrompt};
use hercare_core::message::{DEFAULT_CONFIDENCE, Message, MessageRole};
use hercare_core::personality::PersonalityMode;
use hercare_core::store::MessageStore;
use tokio::sync::{Mutex, RwLock};

/// Outcome of a send request cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// The assistant replied and the reply was appended.
    Delivered,
    /// The call failed; a user-visible error reply was appended instead.
    Failed,
    /// Nothing was issued (blank text, or a send already in flight).
    Ignored,
}

/// Releases the single-flight send gate on drop, so every exit path
/// out of a send cycle frees it.
struct SendGuard {
    flag: Arc<AtomicBool>,
}

impl SendGuard {
    fn acquire(flag: &Arc<AtomicBool>) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        Some(Self {
            flag: Arc::clone(flag),
        })
    }
}

impl Drop for SendGuard {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}

/// Issues one outbound assistant call per user action and maps the
/// outcome onto the message store.
pub struct RequestCoordinator {
    /// Gateway to the remote assistant service
    gateway: Arc<dyn AssistantGateway>,
    /// The conversation's message log, shared with the controller
    store: Arc<RwLock<MessageStore>>,
    /// Single-flight gate for sends
    send_in_flight: Arc<AtomicBool>,
    /// Ids with a simplify request currently outstanding
    pending_simplify: Mutex<HashSet<String>>,
}

impl RequestCoordinator {
    /// Creates a coordinator over the given gateway and store.
    pub fn new(gateway: Arc<dyn AssistantGateway>, store: Arc<RwLock<MessageStore>>) -> Self {
        Self {
            gateway,
            store,
            send_in_flight: Arc::new(AtomicBool::new(false)),
            pending_simplify: Mutex::new(HashSet::new()),
        }
    }

    /// Whether a send is currently outstanding (UI disable hook).
    pub fn is_send_in_flight(&self) -> bool {
        self.send_in_flight.load(Ordering::SeqCst)
    }

    /// Sends a user message to the assistant.
    ///
    /// Blank text and an already-outstanding send are both quiet
    /// no-ops (`Ignored`), not errors: this is a UI debounce
    /// guarantee. The user message is appended *before* the call is
    /// issued, so a slow network never reorders the visible
    /// conversation.
    ///
    /// # Errors
    ///
    /// Only store-invariant violations (`DuplicateId`) surface as
    /// errors; service failures resolve to `Ok(SendOutcome::Failed)`
    /// with the fixed apology appended.
    pub async fn send_message(
        &self,
        text: &str,
        personality: PersonalityMode,
        category: Option<String>,
    ) -> Result<SendOutcome> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(SendOutcome::Ignored);
        }

        let Some(_guard) = SendGuard::acquire(&self.send_in_flight) else {
            tracing::debug!("send ignored: a send is already in flight");
            return Ok(SendOutcome::Ignored);
        };

        self.store.write().await.append(Message::user(text))?;

        let prompt = ChatPrompt {
            message: text.to_string(),
            personality_mode: personality,
            category,
        };

        // _guard releases the gate on every path below, including the
        // error-propagating appends.
        match self.gateway.chat(&prompt).await {
            Ok(reply) => {
                let message = Message::assistant(
                    reply.message,
                    reply.sources,
                    reply.confidence.unwrap_or(DEFAULT_CONFIDENCE),
                    personality,
                );
                self.store.write().await.append(message)?;
                Ok(SendOutcome::Delivered)
            }
            Err(err) => {
                tracing::warn!("chat request failed: {err}");
                self.store
                    .write()
                    .await
                    .append(Message::error_reply(personality))?;
                Ok(SendOutcome::Failed)
            }
        }
    }

    /// Requests a simplified rewrite of an assistant message.
    ///
    /// No-op when the target is missing, is not an assistant message,
    /// or already has a simplify outstanding. On success the target is
    /// patched in place (`simplified_content` + `show_simplified`); on
    /// failure nothing changes and the failure is only logged for
    /// operators — deliberately quieter than the send path.
    pub async fn simplify(&self, message_id: &str) -> Result<()> {
        let text = {
            let store = self.store.read().await;
            match store.get(message_id) {
                Some(message) if message.role == MessageRole::Assistant => message.content.clone(),
                Some(_) => {
                    tracing::debug!("simplify ignored: '{message_id}' is not an assistant message");
                    return Ok(());
                }
                None => {
                    tracing::debug!("simplify ignored: no message with id '{message_id}'");
                    return Ok(());
                }
            }
        };

        {
            let mut pending = self.pending_simplify.lock().await;
            if !pending.insert(message_id.to_string()) {
                tracing::debug!("simplify ignored: request already pending for '{message_id}'");
                return Ok(());
            }
        }

        let result = self.gateway.simplify(&text).await;
        self.pending_simplify.lock().await.remove(message_id);

        match result {
            Ok(simplified) => {
                let patched = self.store.write().await.patch_by_id(message_id, |message| {
                    message.simplified_content = Some(simplified);
                    message.show_simplified = true;
                });
                if !patched {
                    // The conversation was reset while the request was
                    // in flight; the late result has nowhere to land.
                    tracing::debug!("simplify target '{message_id}' no longer present");
                }
                Ok(())
            }
            Err(err) => {
                tracing::warn!("simplify request failed for '{message_id}': {err}");
                Ok(())
            }
        }
    }

    /// Asks the assistant to explain a term.
    ///
    /// Blank terms are a quiet no-op. On success an
    /// explanation-flagged assistant message is appended; on failure
    /// the request is dropped with only an operator log, like
    /// `simplify`.
    pub async fn explain_term(&self, term: &str, personality: PersonalityMode) -> Result<()> {
        let term = term.trim();
        if term.is_empty() {
            return Ok(());
        }

        match self.gateway.explain_term(term).await {
            Ok(explanation) => {
                let message = Message::explanation(
                    &explanation.term,
                    &explanation.explanation,
                    personality,
                );
                self.store.write().await.append(message)?;
                Ok(())
            }
            Err(err) => {
                tracing::warn!("explain-term request failed for '{term}': {err}");
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::AtomicUsize;

    use hercare_core::HerCareError;
    use hercare_core::category::HealthCategory;
    use hercare_core::gateway::{ChatReply, TermExplanation};
    use hercare_core::message::{SEND_FAILURE_REPLY, Source};
    use tokio::sync::Notify;

    /// Scripted gateway: queued results, call counters.
    #[derive(Default)]
    struct MockGateway {
        chat_results: StdMutex<VecDeque<Result<ChatReply>>>,
        simplify_results: StdMutex<VecDeque<Result<String>>>,
        explain_results: StdMutex<VecDeque<Result<TermExplanation>>>,
        chat_calls: AtomicUsize,
        simplify_calls: AtomicUsize,
        explain_calls: AtomicUsize,
    }

    impl MockGateway {
        fn new() -> Self {
            Self::default()
        }

        fn queue_chat(&self, result: Result<ChatReply>) {
            self.chat_results.lock().unwrap().push_back(result);
        }

        fn queue_simplify(&self, result: Result<String>) {
            self.simplify_results.lock().unwrap().push_back(result);
        }

        fn queue_explain(&self, result: Result<TermExplanation>) {
            self.explain_results.lock().unwrap().push_back(result);
        }
    }

    #[async_trait::async_trait]
    impl AssistantGateway for MockGateway {
        async fn chat(&self, _prompt: &ChatPrompt) -> Result<ChatReply> {
            self.chat_calls.fetch_add(1, Ordering::SeqCst);
            self.chat_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(HerCareError::internal("unexpected chat call")))
        }

        async fn simplify(&self, _text: &str) -> Result<String> {
            self.simplify_calls.fetch_add(1, Ordering::SeqCst);
            self.simplify_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(HerCareError::internal("unexpected simplify call")))
        }

        async fn explain_term(&self, _term: &str) -> Result<TermExplanation> {
            self.explain_calls.fetch_add(1, Ordering::SeqCst);
            self.explain_results
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(HerCareError::internal("unexpected explain call")))
        }

        async fn categories(&self) -> Result<Vec<HealthCategory>> {
            Err(HerCareError::internal("unexpected categories call"))
        }
    }

    /// Gateway that parks every call until released, for observing
    /// in-flight states.
    struct BlockingGateway {
        release: Notify,
        chat_calls: AtomicUsize,
        simplify_calls: AtomicUsize,
    }

    impl BlockingGateway {
        fn new() -> Self {
            Self {
                release: Notify::new(),
                chat_calls: AtomicUsize::new(0),
                simplify_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait::async_trait]
    impl AssistantGateway for BlockingGateway {
        async fn chat(&self, _prompt: &ChatPrompt) -> Result<ChatReply> {
            self.chat_calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            Ok(ChatReply {
                message: "slow answer".to_string(),
                sources: Vec::new(),
                confidence: Some(0.9),
            })
        }

        async fn simplify(&self, _text: &str) -> Result<String> {
            self.simplify_calls.fetch_add(1, Ordering::SeqCst);
            self.release.notified().await;
            Ok("Short version".to_string())
        }

        async fn explain_term(&self, _term: &str) -> Result<TermExplanation> {
            Err(HerCareError::internal("unexpected explain call"))
        }

        async fn categories(&self) -> Result<Vec<HealthCategory>> {
            Err(HerCareError::internal("unexpected categories call"))
        }
    }

    fn coordinator_with(gateway: Arc<dyn AssistantGateway>) -> (RequestCoordinator, Arc<RwLock<MessageStore>>) {
        let store = Arc::new(RwLock::new(MessageStore::new()));
        (RequestCoordinator::new(gateway, store.clone()), store)
    }

    #[tokio::test]
    async fn test_successful_send_appends_user_and_assistant() {
        let gateway = Arc::new(MockGateway::new());
        gateway.queue_chat(Ok(ChatReply {
            message: "PCOS is...".to_string(),
            sources: vec![Source {
                content: "NIH".to_string(),
                score: 0.9,
            }],
            confidence: Some(0.85),
        }));
        let (coordinator, store) = coordinator_with(gateway.clone());

        let outcome = coordinator
            .send_message("What's PCOS?", PersonalityMode::Doctor, Some("pcos".to_string()))
            .await
            .unwrap();
        assert_eq!(outcome, SendOutcome::Delivered);

        let store = store.read().await;
        assert_eq!(store.len(), 2);

        let user = &store.list()[0];
        assert_eq!(user.role, MessageRole::User);
        assert_eq!(user.content, "What's PCOS?");

        let reply = &store.list()[1];
        assert_eq!(reply.role, MessageRole::Assistant);
        assert_eq!(reply.content, "PCOS is...");
        assert_eq!(reply.sources.len(), 1);
        assert_eq!(reply.confidence, Some(0.85));
        assert_eq!(reply.personality_tag, Some(PersonalityMode::Doctor));
        assert!(!reply.needs_disclaimer(), "0.85 is above the threshold");
    }

    #[tokio::test]
    async fn test_send_trims_and_defaults_confidence() {
        let gateway = Arc::new(MockGateway::new());
        gateway.queue_chat(Ok(ChatReply {
            message: "answer".to_string(),
            sources: Vec::new(),
            confidence: None,
        }));
        let (coordinator, store) = coordinator_with(gateway);

        coordinator
            .send_message("  spaced out  ", PersonalityMode::Bestie, None)
            .await
            .unwrap();

        let store = store.read().await;
        assert_eq!(store.list()[0].content, "spaced out");
        assert_eq!(store.list()[1].confidence, Some(DEFAULT_CONFIDENCE));
    }

    #[tokio::test]
    async fn test_failed_send_appends_error_reply() {
        let gateway = Arc::new(MockGateway::new());
        gateway.queue_chat(Err(HerCareError::transport("connection refused")));
        let (coordinator, store) = coordinator_with(gateway);

        let outcome = coordinator
            .send_message("What's PCOS?", PersonalityMode::Doctor, None)
            .await
            .unwrap();
        assert_eq!(outcome, SendOutcome::Failed);

        let store = store.read().await;
        assert_eq!(store.len(), 2);
        let reply = &store.list()[1];
        assert!(reply.is_error);
        assert_eq!(reply.content, SEND_FAILURE_REPLY);
        assert_eq!(reply.role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_blank_send_is_noop() {
        let gateway = Arc::new(MockGateway::new());
        let (coordinator, store) = coordinator_with(gateway.clone());

        assert_eq!(
            coordinator
                .send_message("", PersonalityMode::Doctor, None)
                .await
                .unwrap(),
            SendOutcome::Ignored
        );
        assert_eq!(
            coordinator
                .send_message("   ", PersonalityMode::Doctor, None)
                .await
                .unwrap(),
            SendOutcome::Ignored
        );

        assert!(store.read().await.is_empty());
        assert_eq!(gateway.chat_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_send_is_single_flight() {
        let gateway = Arc::new(BlockingGateway::new());
        let (coordinator, store) = coordinator_with(gateway.clone());
        let coordinator = Arc::new(coordinator);

        let first = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                coordinator
                    .send_message("first question", PersonalityMode::Doctor, None)
                    .await
            })
        };

        // Wait until the first send has reached the gateway.
        while gateway.chat_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }
        assert!(coordinator.is_send_in_flight());

        let second = coordinator
            .send_message("second question", PersonalityMode::Doctor, None)
            .await
            .unwrap();
        assert_eq!(second, SendOutcome::Ignored);
        // Only the first user message is in the store; no second call went out.
        assert_eq!(store.read().await.len(), 1);
        assert_eq!(gateway.chat_calls.load(Ordering::SeqCst), 1);

        gateway.release.notify_one();
        assert_eq!(first.await.unwrap().unwrap(), SendOutcome::Delivered);
        assert!(!coordinator.is_send_in_flight());
        assert_eq!(store.read().await.len(), 2);

        // The gate is free again after resolution.
        gateway.release.notify_one();
        let third = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                coordinator
                    .send_message("third question", PersonalityMode::Doctor, None)
                    .await
            })
        };
        assert_eq!(third.await.unwrap().unwrap(), SendOutcome::Delivered);
    }

    #[tokio::test]
    async fn test_gate_released_after_failure() {
        let gateway = Arc::new(MockGateway::new());
        gateway.queue_chat(Err(HerCareError::transport("boom")));
        gateway.queue_chat(Ok(ChatReply {
            message: "recovered".to_string(),
            sources: Vec::new(),
            confidence: None,
        }));
        let (coordinator, store) = coordinator_with(gateway);

        coordinator
            .send_message("one", PersonalityMode::Doctor, None)
            .await
            .unwrap();
        assert!(!coordinator.is_send_in_flight());

        let outcome = coordinator
            .send_message("two", PersonalityMode::Doctor, None)
            .await
            .unwrap();
        assert_eq!(outcome, SendOutcome::Delivered);
        assert_eq!(store.read().await.len(), 4);
    }

    #[tokio::test]
    async fn test_simplify_patches_only_target() {
        let gateway = Arc::new(MockGateway::new());
        gateway.queue_chat(Ok(ChatReply {
            message: "PCOS is...".to_string(),
            sources: Vec::new(),
            confidence: Some(0.85),
        }));
        gateway.queue_simplify(Ok("Short version".to_string()));
        let (coordinator, store) = coordinator_with(gateway);

        coordinator
            .send_message("What's PCOS?", PersonalityMode::Doctor, None)
            .await
            .unwrap();

        let (user_before, reply_id) = {
            let store = store.read().await;
            (store.list()[0].clone(), store.list()[1].id.clone())
        };

        coordinator.simplify(&reply_id).await.unwrap();

        let store = store.read().await;
        let reply = store.get(&reply_id).unwrap();
        assert_eq!(reply.simplified_content.as_deref(), Some("Short version"));
        assert!(reply.show_simplified);
        assert_eq!(reply.display_content(), "Short version");
        // The user message is untouched.
        assert_eq!(store.list()[0], user_before);
    }

    #[tokio::test]
    async fn test_simplify_failure_is_silent() {
        let gateway = Arc::new(MockGateway::new());
        gateway.queue_chat(Ok(ChatReply {
            message: "answer".to_string(),
            sources: Vec::new(),
            confidence: None,
        }));
        gateway.queue_simplify(Err(HerCareError::transport("boom")));
        let (coordinator, store) = coordinator_with(gateway);

        coordinator
            .send_message("question", PersonalityMode::Doctor, None)
            .await
            .unwrap();
        let snapshot: Vec<Message> = store.read().await.list().to_vec();
        let reply_id = snapshot[1].id.clone();

        coordinator.simplify(&reply_id).await.unwrap();

        // Every message is byte-for-byte unchanged; no error message appears.
        assert_eq!(store.read().await.list(), snapshot.as_slice());
    }

    #[tokio::test]
    async fn test_simplify_skips_user_and_missing_messages() {
        let gateway = Arc::new(MockGateway::new());
        gateway.queue_chat(Ok(ChatReply {
            message: "answer".to_string(),
            sources: Vec::new(),
            confidence: None,
        }));
        let (coordinator, store) = coordinator_with(gateway.clone());

        coordinator
            .send_message("question", PersonalityMode::Doctor, None)
            .await
            .unwrap();
        let user_id = store.read().await.list()[0].id.clone();

        coordinator.simplify(&user_id).await.unwrap();
        coordinator.simplify("no-such-id").await.unwrap();

        assert_eq!(gateway.simplify_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_redundant_simplify_on_same_message_is_rejected() {
        let gateway = Arc::new(BlockingGateway::new());
        let (coordinator, store) = coordinator_with(gateway.clone());
        let coordinator = Arc::new(coordinator);

        {
            let mut store = store.write().await;
            store
                .append(Message::assistant(
                    "long answer",
                    Vec::new(),
                    0.8,
                    PersonalityMode::Doctor,
                ))
                .unwrap();
        }
        let reply_id = store.read().await.list()[0].id.clone();

        let first = {
            let coordinator = coordinator.clone();
            let id = reply_id.clone();
            tokio::spawn(async move { coordinator.simplify(&id).await })
        };
        while gateway.simplify_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        // Second simplify for the same id while the first is pending: no-op.
        coordinator.simplify(&reply_id).await.unwrap();
        assert_eq!(gateway.simplify_calls.load(Ordering::SeqCst), 1);

        gateway.release.notify_one();
        first.await.unwrap().unwrap();

        let store = store.read().await;
        assert_eq!(
            store.list()[0].simplified_content.as_deref(),
            Some("Short version")
        );

        // And the pending mark is gone afterwards.
        drop(store);
        gateway.release.notify_one();
        coordinator.simplify(&reply_id).await.unwrap();
        assert_eq!(gateway.simplify_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_explain_term_appends_formatted_message() {
        let gateway = Arc::new(MockGateway::new());
        gateway.queue_explain(Ok(TermExplanation {
            term: "ovulation".to_string(),
            explanation: "the release of an egg".to_string(),
        }));
        let (coordinator, store) = coordinator_with(gateway);

        coordinator
            .explain_term("ovulation", PersonalityMode::Sister)
            .await
            .unwrap();

        let store = store.read().await;
        assert_eq!(store.len(), 1);
        let message = &store.list()[0];
        assert!(message.is_explanation);
        assert_eq!(message.content, "**ovulation**: the release of an egg");
        assert_eq!(message.personality_tag, Some(PersonalityMode::Sister));
    }

    #[tokio::test]
    async fn test_explain_term_blank_and_failure_are_silent() {
        let gateway = Arc::new(MockGateway::new());
        gateway.queue_explain(Err(HerCareError::transport("boom")));
        let (coordinator, store) = coordinator_with(gateway.clone());

        coordinator
            .explain_term("  ", PersonalityMode::Doctor)
            .await
            .unwrap();
        assert_eq!(gateway.explain_calls.load(Ordering::SeqCst), 0);

        coordinator
            .explain_term("cervix", PersonalityMode::Doctor)
            .await
            .unwrap();
        assert!(store.read().await.is_empty());
    }

    #[tokio::test]
    async fn test_reset_during_inflight_send_is_safe() {
        let gateway = Arc::new(BlockingGateway::new());
        let (coordinator, store) = coordinator_with(gateway.clone());
        let coordinator = Arc::new(coordinator);

        let send = {
            let coordinator = coordinator.clone();
            tokio::spawn(async move {
                coordinator
                    .send_message("question", PersonalityMode::Doctor, None)
                    .await
            })
        };
        while gateway.chat_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        // Reset clears the store while the call is still outstanding.
        store.write().await.clear();
        gateway.release.notify_one();

        // The late reply lands as a stale-but-valid new message.
        assert_eq!(send.await.unwrap().unwrap(), SendOutcome::Delivered);
        let store = store.read().await;
        assert_eq!(store.len(), 1);
        assert_eq!(store.list()[0].role, MessageRole::Assistant);
    }

    #[tokio::test]
    async fn test_reset_during_inflight_simplify_patches_nothing() {
        let gateway = Arc::new(BlockingGateway::new());
        let (coordinator, store) = coordinator_with(gateway.clone());
        let coordinator = Arc::new(coordinator);

        {
            let mut store = store.write().await;
            store
                .append(Message::assistant(
                    "answer",
                    Vec::new(),
                    0.8,
                    PersonalityMode::Doctor,
                ))
                .unwrap();
        }
        let reply_id = store.read().await.list()[0].id.clone();

        let simplify = {
            let coordinator = coordinator.clone();
            let id = reply_id.clone();
            tokio::spawn(async move { coordinator.simplify(&id).await })
        };
        while gateway.simplify_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        store.write().await.clear();
        gateway.release.notify_one();

        simplify.await.unwrap().unwrap();
        assert!(store.read().await.is_empty(), "late patch must not resurrect anything");
    }
}
