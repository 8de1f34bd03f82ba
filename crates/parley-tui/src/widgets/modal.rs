//! Modal dialogs drawn over the chat view.

use parley_app::input::InputBuffer;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Clear, Paragraph, Widget},
};

use crate::theme::{palette, styles};

const ATTACH_DIALOG_WIDTH: u16 = 64;
const ATTACH_DIALOG_HEIGHT: u16 = 6;
const CONFIRM_DIALOG_WIDTH: u16 = 48;
const CONFIRM_DIALOG_HEIGHT: u16 = 5;

/// Center a fixed-size rect within an area, clamped to the area.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    let x = area.x + (area.width.saturating_sub(w)) / 2;
    let y = area.y + (area.height.saturating_sub(h)) / 2;
    Rect::new(x, y, w, h)
}

/// Dim everything in `area` behind a dialog.
pub fn dim_background(buf: &mut Buffer, area: Rect) {
    let dim_style = Style::default()
        .fg(palette::TEXT_MUTED)
        .bg(palette::DEEPEST_BG);

    for y in area.top()..area.bottom() {
        for x in area.left()..area.right() {
            if let Some(cell) = buf.cell_mut((x, y)) {
                cell.set_style(dim_style);
            }
        }
    }
}

fn hint_line(pairs: &[(&'static str, &'static str)]) -> Line<'static> {
    let mut spans = Vec::new();
    for (key, action) in pairs {
        spans.push(Span::styled(*key, styles::keybinding()));
        spans.push(Span::styled(format!(" {action}   "), styles::text_muted()));
    }
    Line::from(spans)
}

// ─────────────────────────────────────────────────────────────────────────────
// Attach prompt
// ─────────────────────────────────────────────────────────────────────────────

/// File path prompt opened with Ctrl+O.
pub struct AttachPromptDialog<'a> {
    path: &'a InputBuffer,
}

impl<'a> AttachPromptDialog<'a> {
    pub fn new(path: &'a InputBuffer) -> Self {
        Self { path }
    }

    fn dialog_area(area: Rect) -> Rect {
        centered_rect(ATTACH_DIALOG_WIDTH, ATTACH_DIALOG_HEIGHT, area)
    }

    /// The path is shown tail-first so the filename stays visible.
    fn visible_path(&self, width: usize) -> String {
        let chars: Vec<char> = self.path.text().chars().collect();
        let skip = chars.len().saturating_sub(width.saturating_sub(1));
        chars[skip..].iter().collect()
    }

    /// Terminal cursor position when rendered over `area`.
    pub fn cursor_position(&self, area: Rect) -> (u16, u16) {
        let inner = styles::modal_block("").inner(Self::dialog_area(area));
        let shown = self.visible_path(inner.width as usize).chars().count() as u16;
        (inner.x + shown.min(inner.width.saturating_sub(1)), inner.y + 1)
    }
}

impl Widget for AttachPromptDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        dim_background(buf, area);

        let dialog = Self::dialog_area(area);
        Clear.render(dialog, buf);
        let block = styles::modal_block(" Attach image or video ");
        let inner = block.inner(dialog);
        block.render(dialog, buf);

        let lines = vec![
            Line::from(Span::styled("Path:", styles::text_secondary())),
            Line::from(Span::styled(
                self.visible_path(inner.width as usize),
                styles::text_primary(),
            )),
            Line::from(""),
            hint_line(&[("Enter", "attach"), ("Esc", "cancel")]),
        ];
        Paragraph::new(lines).render(inner, buf);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Delete confirmation
// ─────────────────────────────────────────────────────────────────────────────

pub struct ConfirmDeleteDialog<'a> {
    title: &'a str,
}

impl<'a> ConfirmDeleteDialog<'a> {
    pub fn new(title: &'a str) -> Self {
        Self { title }
    }
}

impl Widget for ConfirmDeleteDialog<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        dim_background(buf, area);

        let dialog = centered_rect(CONFIRM_DIALOG_WIDTH, CONFIRM_DIALOG_HEIGHT, area);
        Clear.render(dialog, buf);
        let block = styles::modal_block(" Delete conversation ");
        let inner = block.inner(dialog);
        block.render(dialog, buf);

        let room = (inner.width as usize).saturating_sub(2);
        let lines = vec![
            Line::from(Span::styled(
                format!("“{}”", super::truncate(self.title, room)),
                styles::text_primary(),
            )),
            Line::from(""),
            hint_line(&[("y", "delete"), ("n", "keep")]),
        ];
        Paragraph::new(lines).render(inner, buf);
    }
}
