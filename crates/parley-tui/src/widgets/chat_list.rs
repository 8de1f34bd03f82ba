//! Sidebar listing the backend's conversations

use parley_app::chat_list::ChatListStore;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme::styles;

pub struct ChatListView<'a> {
    store: &'a ChatListStore,
    focused: bool,
}

impl<'a> ChatListView<'a> {
    pub fn new(store: &'a ChatListStore, focused: bool) -> Self {
        Self { store, focused }
    }

    fn render_empty(&self, area: Rect, buf: &mut Buffer) {
        let lines = vec![
            Line::from(Span::styled("No conversations", styles::text_muted())),
            Line::from(""),
            Line::from(vec![
                Span::styled("Ctrl+N", styles::keybinding()),
                Span::styled(" new chat", styles::text_muted()),
            ]),
        ];
        Paragraph::new(lines).render(area, buf);
    }
}

impl Widget for ChatListView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let title = format!(" Chats ({}) ", self.store.len());
        let block = styles::glass_block(self.focused).title(title);
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.height == 0 {
            return;
        }
        if self.store.is_empty() {
            self.render_empty(inner, buf);
            return;
        }

        let height = inner.height as usize;
        let cursor = self.store.cursor();
        // Keep the cursor row on screen.
        let offset = cursor.saturating_sub(height - 1);
        let title_width = (inner.width as usize).saturating_sub(2);

        let lines: Vec<Line> = self
            .store
            .iter()
            .enumerate()
            .skip(offset)
            .take(height)
            .map(|(index, conversation)| {
                let is_active = self.store.active() == Some(index);
                let marker = if is_active { "● " } else { "  " };
                let style = if self.focused && index == cursor {
                    styles::focused_selected()
                } else if is_active {
                    styles::accent_bold()
                } else {
                    styles::text_secondary()
                };
                Line::from(vec![
                    Span::styled(marker, style),
                    Span::styled(
                        super::truncate(conversation.display_title(), title_width),
                        style,
                    ),
                ])
            })
            .collect();

        Paragraph::new(lines).render(inner, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestTerminal;
    use parley_core::Conversation;

    fn store_with(titles: &[&str]) -> ChatListStore {
        let mut store = ChatListStore::new();
        store.replace(titles.iter().map(|t| Conversation::new(*t)).collect());
        store
    }

    #[test]
    fn test_empty_list_shows_hint() {
        let store = ChatListStore::new();
        let mut term = TestTerminal::with_size(28, 8);
        term.render_widget(ChatListView::new(&store, false), term.area());

        assert!(term.buffer_contains("No conversations"));
        assert!(term.buffer_contains("Chats (0)"));
    }

    #[test]
    fn test_titles_rendered_in_order() {
        let store = store_with(&["اول", "second"]);
        let mut term = TestTerminal::with_size(28, 8);
        term.render_widget(ChatListView::new(&store, true), term.area());

        assert!(term.line_contains(1, "اول"));
        assert!(term.line_contains(2, "second"));
    }

    #[test]
    fn test_active_chat_marked() {
        let mut store = store_with(&["a", "b"]);
        store.select(1);
        let mut term = TestTerminal::with_size(28, 8);
        term.render_widget(ChatListView::new(&store, false), term.area());

        assert!(term.line_contains(2, "● b"));
    }

    #[test]
    fn test_cursor_kept_visible() {
        let titles: Vec<String> = (0..20).map(|i| format!("chat-{i}")).collect();
        let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
        let mut store = store_with(&refs);
        for _ in 0..15 {
            store.cursor_down();
        }

        let mut term = TestTerminal::with_size(28, 7);
        term.render_widget(ChatListView::new(&store, true), term.area());
        assert!(term.buffer_contains("chat-15"));
        assert!(!term.buffer_contains("chat-0 "));
    }
}
