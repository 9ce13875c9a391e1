//! Ordered message store.
//!
//! The store is append-only with one targeted mutation: a patch by
//! message id, used when a simplify action resolves. Messages are
//! never reordered or individually deleted; the whole store is cleared
//! on a conversation reset.

use crate::error::{HerCareError, Result};
use crate::message::Message;

/// The ordered log of conversation messages.
///
/// Single-writer by convention: only the request coordinator and the
/// controller's send/reset paths mutate the store. Reads never mutate.
#[derive(Debug, Default)]
pub struct MessageStore {
    messages: Vec<Message>,
}

impl MessageStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a message at the tail.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateId` if a message with the same id is already
    /// present. Ids are freshly generated UUIDs, so this is a
    /// programming-invariant guard rather than a normal error path;
    /// when it fires, only the single append is rejected.
    pub fn append(&mut self, message: Message) -> Result<()> {
        if self.messages.iter().any(|existing| existing.id == message.id) {
            return Err(HerCareError::duplicate_id(message.id));
        }
        self.messages.push(message);
        Ok(())
    }

    /// Applies `patch` to the message with the given id.
    ///
    /// Returns `true` if a message was patched, `false` if the id is
    /// absent (e.g. the store was cleared by a reset while the request
    /// that triggered the patch was still in flight). The missing-id
    /// case is a safe no-op, never an error.
    pub fn patch_by_id<F>(&mut self, id: &str, patch: F) -> bool
    where
        F: FnOnce(&mut Message),
    {
        match self.messages.iter_mut().find(|message| message.id == id) {
            Some(message) => {
                patch(message);
                true
            }
            None => false,
        }
    }

    /// Empties the store. Used on "new chat".
    pub fn clear(&mut self) {
        self.messages.clear();
    }

    /// The ordered message sequence for rendering.
    pub fn list(&self) -> &[Message] {
        &self.messages
    }

    /// Looks up a message by id.
    pub fn get(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|message| message.id == id)
    }

    /// Number of messages in the store.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
