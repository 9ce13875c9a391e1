//! Text selection tracking for explain-term requests.

/// Ephemeral record of the user's current text selection inside a
/// rendered message.
///
/// The selection seeds an explain-term request and is cleared the
/// moment it is consumed; consuming an empty tracker yields nothing
/// and no request is issued.
#[derive(Debug, Default)]
pub struct SelectionTracker {
    current: Option<String>,
}

impl SelectionTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the current selection. Whitespace-only selections clear
    /// the tracker instead of storing an empty term.
    pub fn capture(&mut self, text: &str) {
        let trimmed = text.trim();
        self.current = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
    }

    /// The currently held selection, if any.
    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// Takes the selection, leaving the tracker empty.
    pub fn consume_and_clear(&mut self) -> Option<String> {
        self.current.take()
    }

    /// Drops any held selection.
    pub fn clear(&mut self) {
        self.current = None;
    }
}
