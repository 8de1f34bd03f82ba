//! Message Render Log - the active conversation's messages and scroll state.
//!
//! Full snapshots (`chat`, `chat_switched`) replace the log and jump to the
//! bottom. Incremental messages are appended and only followed when the
//! view is already pinned to the bottom.

use parley_core::{ChatMessage, FileRef};

/// Marker rendered before the filename of an attached file.
pub const FILE_CHIP_ICON: &str = "📎";

/// Label for a message's attached file, e.g. `📎 photo.png`.
pub fn file_chip(file: &FileRef) -> String {
    format!("{} {}", FILE_CHIP_ICON, file.filename)
}

// ─────────────────────────────────────────────────────────────────────────────
// ScrollState
// ─────────────────────────────────────────────────────────────────────────────

/// Vertical scroll position of the log view.
///
/// `total_lines` and `visible_lines` are written by the renderer, which is
/// the only place that knows how messages wrap.
#[derive(Debug, Clone)]
pub struct ScrollState {
    /// Current vertical scroll offset from top
    pub offset: usize,
    /// Follow new content (pinned to the bottom)
    pub auto_scroll: bool,
    /// Total number of rendered lines (set during render)
    pub total_lines: usize,
    /// Visible lines (set during render)
    pub visible_lines: usize,
}

impl Default for ScrollState {
    fn default() -> Self {
        Self::new()
    }
}

impl ScrollState {
    pub fn new() -> Self {
        Self {
            offset: 0,
            auto_scroll: true,
            total_lines: 0,
            visible_lines: 0,
        }
    }

    fn max_offset(&self) -> usize {
        self.total_lines.saturating_sub(self.visible_lines)
    }

    pub fn scroll_up(&mut self, n: usize) {
        self.offset = self.offset.saturating_sub(n);
        self.auto_scroll = false;
    }

    pub fn scroll_down(&mut self, n: usize) {
        let max_offset = self.max_offset();
        self.offset = (self.offset + n).min(max_offset);

        if self.offset >= max_offset {
            self.auto_scroll = true;
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.offset = 0;
        self.auto_scroll = false;
    }

    /// Jump to the bottom and follow new content.
    ///
    /// The exact offset is settled by the next [`update_content_size`].
    ///
    /// [`update_content_size`]: Self::update_content_size
    pub fn scroll_to_bottom(&mut self) {
        self.offset = self.max_offset();
        self.auto_scroll = true;
    }

    pub fn page_up(&mut self) {
        let page = self.visible_lines.saturating_sub(2).max(1);
        self.scroll_up(page);
    }

    pub fn page_down(&mut self) {
        let page = self.visible_lines.saturating_sub(2).max(1);
        self.scroll_down(page);
    }

    /// Update with new content size (called by the renderer).
    pub fn update_content_size(&mut self, total: usize, visible: usize) {
        self.total_lines = total;
        self.visible_lines = visible;

        if self.auto_scroll {
            self.offset = self.max_offset();
        } else {
            self.offset = self.offset.min(self.max_offset());
        }
    }

    /// `true` when the last rendered frame showed the final line.
    pub fn is_at_bottom(&self) -> bool {
        self.offset >= self.max_offset()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// MessageLog
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct MessageLog {
    messages: Vec<ChatMessage>,
    /// Whether the backend has already generated a title for this chat
    title_generated: bool,
    pub scroll: ScrollState,
}

impl MessageLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the log with a full conversation snapshot and jump to the bottom.
    pub fn load_snapshot(&mut self, messages: Vec<ChatMessage>, title_generated: bool) {
        self.messages = messages;
        self.title_generated = title_generated;
        self.scroll.scroll_to_bottom();
    }

    /// Append one message without moving the view.
    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    /// Append a locally generated notice line.
    pub fn push_notice(&mut self, text: impl Into<String>) {
        self.push(ChatMessage::system(text));
    }

    pub fn clear(&mut self) {
        self.messages.clear();
        self.title_generated = false;
        self.scroll = ScrollState::new();
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    /// Messages alongside the scroll state, for rendering.
    pub fn view_parts(&mut self) -> (&[ChatMessage], &mut ScrollState) {
        (&self.messages, &mut self.scroll)
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn title_generated(&self) -> bool {
        self.title_generated
    }
}
