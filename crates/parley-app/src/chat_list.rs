//! Chat List Store - mirror of the backend's conversation list.
//!
//! The list is replaced wholesale on every `chats` snapshot. Entries have no
//! identifier of their own; they are addressed by position, and a position
//! is only meaningful for the snapshot it was read from. [`generation`]
//! increments on every refresh so callers holding an index can tell it
//! went stale.
//!
//! [`generation`]: ChatListStore::generation

use parley_core::Conversation;
use parley_transport::ClientAction;

#[derive(Debug, Clone, Default)]
pub struct ChatListStore {
    conversations: Vec<Conversation>,
    generation: u64,
    /// Highlighted entry for keyboard navigation
    cursor: usize,
    /// Entry the user last switched to, re-located on every refresh
    active: Option<usize>,
}

impl ChatListStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Discard the current list and adopt `snapshot`.
    ///
    /// Backends reorder their list (most recently updated first), so the
    /// active entry is looked up again by content rather than kept by
    /// position. It is dropped when no single entry matches.
    pub fn replace(&mut self, snapshot: Vec<Conversation>) {
        let previous = self
            .active
            .and_then(|i| self.conversations.get(i))
            .cloned();

        self.conversations = snapshot;
        self.generation = self.generation.wrapping_add(1);
        self.cursor = self.cursor.min(self.conversations.len().saturating_sub(1));
        self.active = previous.and_then(|prev| self.locate(&prev));
    }

    /// Position of `conversation` in the current list.
    ///
    /// An identical entry wins; otherwise the raw title must match exactly
    /// one entry (the smart title may have been generated in between).
    fn locate(&self, conversation: &Conversation) -> Option<usize> {
        let unique = |matches: Vec<usize>| match matches.as_slice() {
            [only] => Some(*only),
            _ => None,
        };

        let identical: Vec<usize> = self
            .conversations
            .iter()
            .enumerate()
            .filter(|(_, c)| {
                c.title == conversation.title && c.smart_title == conversation.smart_title
            })
            .map(|(i, _)| i)
            .collect();
        if !identical.is_empty() {
            return unique(identical);
        }

        if conversation.title.trim().is_empty() {
            return None;
        }
        unique(
            self.conversations
                .iter()
                .enumerate()
                .filter(|(_, c)| c.title == conversation.title)
                .map(|(i, _)| i)
                .collect(),
        )
    }

    /// Drop every entry (e.g. HTTP mode or after a disconnect).
    pub fn clear(&mut self) {
        self.replace(Vec::new());
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn get(&self, index: usize) -> Option<&Conversation> {
        self.conversations.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Conversation> {
        self.conversations.iter()
    }

    /// Display title for the entry at `index`.
    pub fn display_title(&self, index: usize) -> Option<&str> {
        self.get(index).map(Conversation::display_title)
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn active(&self) -> Option<usize> {
        self.active
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn cursor_down(&mut self) {
        if self.cursor + 1 < self.conversations.len() {
            self.cursor += 1;
        }
    }

    /// Build a `switch_chat` for the entry at `index` in the current snapshot.
    ///
    /// Returns `None` when `index` is out of range locally. The backend may
    /// still have reordered its list since this snapshot was sent; the
    /// request then addresses whichever conversation now holds `index`.
    pub fn select(&mut self, index: usize) -> Option<ClientAction> {
        if index >= self.conversations.len() {
            return None;
        }
        self.cursor = index;
        self.active = Some(index);
        Some(ClientAction::SwitchChat { index })
    }

    /// Build a `delete_chat` for the entry at `index`. Same staleness rules
    /// as [`select`](Self::select).
    pub fn delete(&self, index: usize) -> Option<ClientAction> {
        (index < self.conversations.len()).then_some(ClientAction::DeleteChat { index })
    }
}
