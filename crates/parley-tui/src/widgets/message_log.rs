//! Scrollable view of the active conversation

use parley_app::message_log::{file_chip, ScrollState};
use parley_app::pending::TypingIndicator;
use parley_core::{ChatMessage, Role};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{
        Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, StatefulWidget, Widget,
    },
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::theme::styles;

const TYPING_FRAMES: [&str; 4] = ["·  ", "·· ", "···", " ··"];

/// Ticks per typing animation frame.
const TICKS_PER_FRAME: u64 = 4;

pub struct MessageLogView<'a> {
    messages: &'a [ChatMessage],
    user_label: &'a str,
    bot_label: &'a str,
    typing: TypingIndicator,
    tick: u64,
}

impl<'a> MessageLogView<'a> {
    pub fn new(messages: &'a [ChatMessage], user_label: &'a str, bot_label: &'a str) -> Self {
        Self {
            messages,
            user_label,
            bot_label,
            typing: TypingIndicator::Idle,
            tick: 0,
        }
    }

    /// Show the typing indicator after the last message while awaiting a reply.
    pub fn typing(mut self, typing: TypingIndicator, tick: u64) -> Self {
        self.typing = typing;
        self.tick = tick;
        self
    }

    fn label(&self, role: Role) -> Option<&'a str> {
        match role {
            Role::User => Some(self.user_label),
            Role::Bot => Some(self.bot_label),
            Role::System => None,
        }
    }

    /// Every line of the log at `width` columns, wrapped.
    fn build_lines(&self, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();

        for (i, message) in self.messages.iter().enumerate() {
            if i > 0 {
                lines.push(Line::from(""));
            }

            match self.label(message.role) {
                Some(label) => {
                    lines.push(Line::from(Span::styled(
                        label.to_string(),
                        styles::role_label(message.role),
                    )));
                    let body = styles::role_body(message.role);
                    if !message.content.is_empty() {
                        lines.extend(
                            wrap_text(&message.content, width)
                                .into_iter()
                                .map(|l| Line::from(Span::styled(l, body))),
                        );
                    }
                }
                None => {
                    let notice = format!("• {}", message.content);
                    let body = styles::role_body(message.role);
                    lines.extend(
                        wrap_text(&notice, width)
                            .into_iter()
                            .map(|l| Line::from(Span::styled(l, body))),
                    );
                }
            }

            if let Some(file) = &message.file {
                lines.push(Line::from(Span::styled(
                    super::truncate(&file_chip(file), width),
                    styles::file_chip(),
                )));
            }
        }

        if self.typing == TypingIndicator::AwaitingReply {
            if !lines.is_empty() {
                lines.push(Line::from(""));
            }
            let frame = TYPING_FRAMES[((self.tick / TICKS_PER_FRAME) % 4) as usize];
            lines.push(Line::from(vec![
                Span::styled(self.bot_label.to_string(), styles::role_label(Role::Bot)),
                Span::styled(format!(" is typing {frame}"), styles::text_muted()),
            ]));
        }

        lines
    }

    fn render_empty(area: Rect, buf: &mut Buffer) {
        let lines = vec![
            Line::from(""),
            Line::from(Span::styled("No messages yet", styles::text_muted())),
            Line::from(Span::styled(
                "Type below and press Enter to send",
                styles::text_muted(),
            )),
        ];
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

impl StatefulWidget for MessageLogView<'_> {
    type State = ScrollState;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Self::State) {
        let block = styles::glass_block(false).title(" Messages ");
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width < 2 || inner.height == 0 {
            return;
        }

        let visible_lines = inner.height as usize;
        if self.messages.is_empty() && self.typing == TypingIndicator::Idle {
            state.update_content_size(0, visible_lines);
            Self::render_empty(inner, buf);
            return;
        }

        // Last column is reserved for the scrollbar.
        let text_width = (inner.width - 1) as usize;
        let lines = self.build_lines(text_width);
        let total_lines = lines.len();
        state.update_content_size(total_lines, visible_lines);

        let visible: Vec<Line> = lines
            .into_iter()
            .skip(state.offset)
            .take(visible_lines)
            .collect();
        let text_area = Rect {
            width: inner.width - 1,
            ..inner
        };
        Paragraph::new(visible).render(text_area, buf);

        if total_lines > visible_lines {
            let mut scrollbar_state =
                ScrollbarState::new(total_lines.saturating_sub(visible_lines))
                    .position(state.offset);
            Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(None)
                .end_symbol(None)
                .render(inner, buf, &mut scrollbar_state);
        }
    }
}

/// Wrap `text` to `width` columns, breaking on spaces where possible.
///
/// Explicit newlines are kept. Words wider than a line are split across
/// lines. Widths are display columns, so wide glyphs count double.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut out = Vec::new();

    for raw_line in text.split('\n') {
        let mut current = String::new();
        let mut current_width = 0;

        for word in raw_line.split(' ') {
            let word_width = word.width();
            let sep = usize::from(!current.is_empty());

            if current_width + sep + word_width <= width {
                if sep == 1 {
                    current.push(' ');
                }
                current.push_str(word);
                current_width += sep + word_width;
                continue;
            }

            if !current.is_empty() {
                out.push(std::mem::take(&mut current));
                current_width = 0;
            }

            if word_width <= width {
                current.push_str(word);
                current_width = word_width;
                continue;
            }

            for c in word.chars() {
                let w = c.width().unwrap_or(0);
                if current_width + w > width && !current.is_empty() {
                    out.push(std::mem::take(&mut current));
                    current_width = 0;
                }
                current.push(c);
                current_width += w;
            }
        }

        out.push(current);
    }

    out
}
