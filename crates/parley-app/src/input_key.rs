//! Abstract input key event, independent of terminal library.
//!
//! The TUI converts crossterm key events into [`InputKey`] at its boundary so
//! the handler layer (and headless mode) never depend on crossterm.

/// Abstract input key event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputKey {
    /// Regular character key
    Char(char),
    /// Character with Ctrl modifier (Ctrl+a, Ctrl+c, etc.)
    CharCtrl(char),

    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    PageUp,
    PageDown,

    Enter,
    Esc,
    Tab,
    BackTab,
    Backspace,
    Delete,
}

impl InputKey {
    /// `true` for Ctrl+C, the unconditional quit chord.
    pub fn is_interrupt(&self) -> bool {
        matches!(self, InputKey::CharCtrl('c'))
    }
}
