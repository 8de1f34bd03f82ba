//! Message composer with the staged attachment chip

use parley_app::attachment::PendingAttachment;
use parley_app::input::InputBuffer;
use parley_app::message_log::FILE_CHIP_ICON;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

use crate::theme::styles;

const PLACEHOLDER: &str = "Type a message…";

pub struct InputBar<'a> {
    input: &'a InputBuffer,
    staged: Option<&'a PendingAttachment>,
    focused: bool,
    loading: bool,
}

impl<'a> InputBar<'a> {
    pub fn new(input: &'a InputBuffer) -> Self {
        Self {
            input,
            staged: None,
            focused: true,
            loading: false,
        }
    }

    pub fn staged(mut self, staged: Option<&'a PendingAttachment>) -> Self {
        self.staged = staged;
        self
    }

    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// A file is being read from disk.
    pub fn loading(mut self, loading: bool) -> Self {
        self.loading = loading;
        self
    }

    /// Terminal cursor position when rendered into `area`.
    pub fn cursor_position(&self, area: Rect) -> Option<(u16, u16)> {
        let inner = styles::glass_block(false).inner(area);
        if inner.width == 0 || inner.height == 0 {
            return None;
        }
        let (_, col) = visible_window(self.input.text(), self.input.cursor(), inner.width as usize);
        Some((inner.x + col as u16, inner.y))
    }

    fn attachment_title(&self) -> Option<Line<'static>> {
        if self.loading {
            return Some(Line::from(Span::styled(" Reading file… ", styles::text_muted())));
        }
        let staged = self.staged?;
        let kind = staged.kind().map(|k| k.label()).unwrap_or("file");
        Some(Line::from(vec![
            Span::styled(
                format!(" {} {} ", FILE_CHIP_ICON, staged.filename),
                styles::file_chip(),
            ),
            Span::styled(
                format!("{kind} · {} · Ctrl+X remove ", format_size(staged.size())),
                styles::text_muted(),
            ),
        ]))
    }
}

impl Widget for InputBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let mut block = styles::glass_block(self.focused).title(" Message ");
        if let Some(title) = self.attachment_title() {
            block = block.title(title.right_aligned());
        }
        let inner = block.inner(area);
        block.render(area, buf);

        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let line = if self.input.is_empty() {
            Line::from(Span::styled(PLACEHOLDER, styles::text_muted()))
        } else {
            let (visible, _) =
                visible_window(self.input.text(), self.input.cursor(), inner.width as usize);
            Line::from(Span::styled(visible, styles::text_primary()))
        };
        Paragraph::new(line).render(inner, buf);
    }
}

/// The slice of `text` that fits in `width` columns with the cursor visible,
/// and the cursor's column within it.
fn visible_window(text: &str, cursor: usize, width: usize) -> (String, usize) {
    let chars: Vec<char> = text.chars().collect();
    let cursor = cursor.min(chars.len());
    let width = width.max(1);
    let char_width = |c: char| c.width().unwrap_or(0);

    let mut start = 0;
    let mut col: usize = chars[..cursor].iter().map(|&c| char_width(c)).sum();
    while col >= width && start < cursor {
        col -= char_width(chars[start]);
        start += 1;
    }

    let mut visible = String::new();
    let mut used = 0;
    for &c in &chars[start..] {
        let w = char_width(c);
        if used + w > width {
            break;
        }
        visible.push(c);
        used += w;
    }

    (visible, col)
}

/// Human-readable byte count, e.g. `12.5 KB`.
pub fn format_size(bytes: usize) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let b = bytes as f64;
    if b >= MB {
        format!("{:.1} MB", b / MB)
    } else if b >= KB {
        format!("{:.1} KB", b / KB)
    } else {
        format!("{bytes} B")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::TestTerminal;
    use parley_app::attachment::{AttachmentFile, AttachmentStaging};

    #[test]
    fn test_visible_window_short_text() {
        assert_eq!(visible_window("hello", 5, 20), ("hello".to_string(), 5));
        assert_eq!(visible_window("hello", 2, 20), ("hello".to_string(), 2));
    }

    #[test]
    fn test_visible_window_scrolls_to_cursor() {
        let (visible, col) = visible_window("abcdefghij", 10, 5);
        assert_eq!(col, 4);
        assert_eq!(visible, "ghij");
    }

    #[test]
    fn test_format_size() {
        assert_eq!(format_size(512), "512 B");
        assert_eq!(format_size(2048), "2.0 KB");
        assert_eq!(format_size(3 * 1024 * 1024), "3.0 MB");
    }

    #[test]
    fn test_placeholder_when_empty() {
        let input = InputBuffer::new();
        let mut term = TestTerminal::with_size(40, 3);
        term.render_widget(InputBar::new(&input), term.area());
        assert!(term.buffer_contains("Type a message"));
    }

    #[test]
    fn test_text_and_cursor() {
        let mut input = InputBuffer::new();
        input.set("سلام");
        let bar = InputBar::new(&input);
        let area = Rect::new(0, 0, 40, 3);
        assert_eq!(bar.cursor_position(area), Some((5, 1)));

        let mut term = TestTerminal::with_size(40, 3);
        term.render_widget(bar, term.area());
        assert!(term.buffer_contains("سلام"));
    }

    #[test]
    fn test_staged_attachment_chip() {
        let mut staging = AttachmentStaging::new();
        staging
            .stage(AttachmentFile::new("photo.png", "image/png", vec![0; 2048]))
            .unwrap();
        let input = InputBuffer::new();

        let mut term = TestTerminal::with_size(70, 3);
        term.render_widget(
            InputBar::new(&input).staged(staging.pending()),
            term.area(),
        );
        assert!(term.buffer_contains("photo.png"));
        assert!(term.buffer_contains("image · 2.0 KB"));
    }
}
