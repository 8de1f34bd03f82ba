//! Status bar widget
//!
//! Connection state, backend mode, and either the latest status message or
//! the key hints for the focused pane.

use parley_app::state::{AppState, ConnectionStatus, Focus};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme::styles;

pub struct StatusBar<'a> {
    state: &'a AppState,
}

impl<'a> StatusBar<'a> {
    pub fn new(state: &'a AppState) -> Self {
        Self { state }
    }

    fn connection(&self) -> Span<'static> {
        let status = &self.state.connection;
        let (icon, style) = styles::connection_indicator(status);
        let label = match status {
            ConnectionStatus::Disconnected {
                reason: Some(reason),
            } => format!("Disconnected: {reason}"),
            other => other.label(),
        };
        Span::styled(format!("{icon} {label}"), style)
    }

    fn hints(&self) -> Vec<Span<'static>> {
        let pairs: &[(&str, &str)] = match self.state.focus {
            Focus::ChatList => &[
                ("↑↓", "move"),
                ("Enter", "open"),
                ("d", "delete"),
                ("X", "clear all"),
                ("Esc", "back"),
            ],
            Focus::Input if self.state.is_http() => &[("Enter", "send"), ("^Q", "quit")],
            Focus::Input => &[
                ("Enter", "send"),
                ("^O", "attach"),
                ("Tab", "chats"),
                ("^N", "new"),
                ("^Q", "quit"),
            ],
        };

        let mut spans = Vec::with_capacity(pairs.len() * 2);
        for (key, action) in pairs {
            spans.push(Span::styled(key.to_string(), styles::keybinding()));
            spans.push(Span::styled(format!(" {action}  "), styles::text_muted()));
        }
        spans
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let separator = Span::styled(" │ ", styles::text_muted());
        let mode = if self.state.is_http() {
            "HTTP"
        } else {
            "WebSocket"
        };

        let mut spans = vec![
            Span::raw(" "),
            self.connection(),
            separator.clone(),
            Span::styled(mode, styles::text_secondary()),
            separator,
        ];

        match &self.state.status_message {
            Some(message) => spans.push(Span::styled(message.clone(), styles::text_primary())),
            None => spans.extend(self.hints()),
        }

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}
