//! Custom widget components

mod chat_list;
mod header;
mod input_bar;
mod message_log;
pub mod modal;
mod status_bar;

pub use chat_list::ChatListView;
pub use header::HeaderBar;
pub use input_bar::{format_size, InputBar};
pub use message_log::{wrap_text, MessageLogView};
pub use modal::{AttachPromptDialog, ConfirmDeleteDialog};
pub use status_bar::StatusBar;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Cut `text` to at most `max_width` columns, ending in `…` when shortened.
pub(crate) fn truncate(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > max_width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
