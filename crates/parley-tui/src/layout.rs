//! Screen layout for the chat view
//!
//! ```text
//! ┌ header ─────────────────────────────┐
//! ├ chats ──┬ messages ─────────────────┤
//! │         │                           │
//! │         ├ composer ─────────────────┤
//! └─────────┴───────────────────────────┘
//!   status bar
//! ```

use ratatui::layout::{Constraint, Layout, Rect};

/// Width of the conversation list when shown.
pub const SIDEBAR_WIDTH: u16 = 28;

/// Below this width the sidebar is dropped to leave room for messages.
pub const MIN_WIDTH_FOR_SIDEBAR: u16 = 60;

const HEADER_HEIGHT: u16 = 3;
const INPUT_HEIGHT: u16 = 3;
const STATUS_HEIGHT: u16 = 1;

/// Screen areas for the main layout
#[derive(Debug, Clone, Copy)]
pub struct ScreenAreas {
    pub header: Rect,
    /// Conversation list; `None` when hidden
    pub sidebar: Option<Rect>,
    pub messages: Rect,
    pub input: Rect,
    pub status: Rect,
}

/// Split `area` into the chat view's panes.
pub fn create(area: Rect, show_sidebar: bool) -> ScreenAreas {
    let [header, body, status] = Layout::vertical([
        Constraint::Length(HEADER_HEIGHT),
        Constraint::Min(INPUT_HEIGHT + 2),
        Constraint::Length(STATUS_HEIGHT),
    ])
    .areas(area);

    let (sidebar, main) = if show_sidebar && area.width >= MIN_WIDTH_FOR_SIDEBAR {
        let [sidebar, main] =
            Layout::horizontal([Constraint::Length(SIDEBAR_WIDTH), Constraint::Min(1)])
                .areas(body);
        (Some(sidebar), main)
    } else {
        (None, body)
    };

    let [messages, input] =
        Layout::vertical([Constraint::Min(1), Constraint::Length(INPUT_HEIGHT)]).areas(main);

    ScreenAreas {
        header,
        sidebar,
        messages,
        input,
        status,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_with_sidebar() {
        let layout = create(Rect::new(0, 0, 80, 24), true);

        assert_eq!(layout.header.height, 3);
        assert_eq!(layout.status.height, 1);
        assert_eq!(layout.status.y, 23);

        let sidebar = layout.sidebar.expect("sidebar shown");
        assert_eq!(sidebar.width, SIDEBAR_WIDTH);
        assert_eq!(layout.messages.x, SIDEBAR_WIDTH);
        assert_eq!(layout.messages.width, 80 - SIDEBAR_WIDTH);
        assert_eq!(layout.input.height, 3);
        assert_eq!(layout.messages.height + layout.input.height, 20);
    }

    #[test]
    fn test_layout_without_sidebar() {
        let layout = create(Rect::new(0, 0, 80, 24), false);
        assert!(layout.sidebar.is_none());
        assert_eq!(layout.messages.width, 80);
        assert_eq!(layout.input.width, 80);
    }

    #[test]
    fn test_narrow_terminal_drops_sidebar() {
        let layout = create(Rect::new(0, 0, 50, 24), true);
        assert!(layout.sidebar.is_none());
    }

    #[test]
    fn test_areas_are_contiguous() {
        let area = Rect::new(0, 0, 100, 30);
        let layout = create(area, true);
        assert_eq!(
            layout.header.height
                + layout.messages.height
                + layout.input.height
                + layout.status.height,
            area.height
        );
        assert_eq!(layout.input.y, layout.messages.y + layout.messages.height);
    }
}
