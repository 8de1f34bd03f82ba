//! Top bar: app name and the active conversation's title

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

use crate::theme::styles;

pub struct HeaderBar<'a> {
    title: &'a str,
    http: bool,
}

impl<'a> HeaderBar<'a> {
    pub fn new(title: &'a str, http: bool) -> Self {
        Self { title, http }
    }
}

impl Widget for HeaderBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = styles::glass_block(false);
        let inner = block.inner(area);
        block.render(area, buf);

        let mut spans = vec![
            Span::styled("Parley", styles::accent_bold()),
            Span::styled(" │ ", styles::text_muted()),
        ];
        if self.http {
            spans.push(Span::styled("HTTP ", styles::keybinding()));
        }
        let room = (inner.width as usize).saturating_sub(spans.iter().map(|s| s.width()).sum());
        spans.push(Span::styled(
            super::truncate(self.title, room),
            styles::text_primary(),
        ));

        Paragraph::new(Line::from(spans)).render(inner, buf);
    }
}
