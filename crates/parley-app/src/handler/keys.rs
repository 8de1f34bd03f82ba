//! Key event handlers for different UI modes

use crate::input_key::InputKey;
use crate::message::Message;
use crate::state::{AppState, Focus, UiMode};

/// Convert key events to messages based on current UI mode
pub fn handle_key(state: &AppState, key: InputKey) -> Option<Message> {
    if key.is_interrupt() {
        return Some(Message::Quit);
    }

    match state.ui_mode {
        UiMode::Normal => handle_key_normal(state, key),
        UiMode::AttachPrompt => handle_key_attach_prompt(key),
        UiMode::ConfirmDelete { .. } => handle_key_confirm_delete(key),
    }
}

fn handle_key_confirm_delete(key: InputKey) -> Option<Message> {
    match key {
        InputKey::Char('y' | 'Y') | InputKey::Enter => Some(Message::ConfirmDelete),
        InputKey::Char('n' | 'N') | InputKey::Esc => Some(Message::CancelDelete),
        _ => None,
    }
}

fn handle_key_attach_prompt(key: InputKey) -> Option<Message> {
    match key {
        InputKey::Esc => Some(Message::CancelAttachPrompt),
        InputKey::Enter => Some(Message::ConfirmAttachPrompt),
        other => editing_key(other),
    }
}

fn handle_key_normal(state: &AppState, key: InputKey) -> Option<Message> {
    // Global chords, regardless of focus
    match key {
        InputKey::CharCtrl('q') => return Some(Message::Quit),
        InputKey::Tab | InputKey::BackTab => return Some(Message::FocusNext),
        InputKey::CharCtrl('o') => return Some(Message::OpenAttachPrompt),
        InputKey::CharCtrl('x') => return Some(Message::RemoveAttachment),
        InputKey::CharCtrl('n') => return Some(Message::NewChat),
        InputKey::CharCtrl('r') => return Some(Message::RefreshChats),
        InputKey::CharCtrl('t') => return Some(Message::ScrollToTop),
        InputKey::CharCtrl('b') => return Some(Message::ScrollToBottom),
        InputKey::PageUp => return Some(Message::PageUp),
        InputKey::PageDown => return Some(Message::PageDown),
        _ => {}
    }

    match state.focus {
        Focus::ChatList => handle_key_chat_list(state, key),
        Focus::Input => handle_key_composer(key),
    }
}

fn handle_key_chat_list(state: &AppState, key: InputKey) -> Option<Message> {
    let cursor = state.chat_list.cursor();
    match key {
        InputKey::Up | InputKey::Char('k') => Some(Message::ChatCursorUp),
        InputKey::Down | InputKey::Char('j') => Some(Message::ChatCursorDown),
        InputKey::Enter => Some(Message::SelectChat { index: cursor }),
        InputKey::Char('d') | InputKey::Delete => {
            Some(Message::RequestDeleteChat { index: cursor })
        }
        InputKey::Char('X') => Some(Message::ClearAllChats),
        InputKey::Esc => Some(Message::FocusNext),
        _ => None,
    }
}

fn handle_key_composer(key: InputKey) -> Option<Message> {
    match key {
        InputKey::Enter => Some(Message::Submit),
        InputKey::Up => Some(Message::ScrollUp),
        InputKey::Down => Some(Message::ScrollDown),
        other => editing_key(other),
    }
}

/// Keys that edit a single-line text buffer.
fn editing_key(key: InputKey) -> Option<Message> {
    match key {
        InputKey::Char(c) => Some(Message::InputChar(c)),
        InputKey::Backspace => Some(Message::InputBackspace),
        InputKey::Delete => Some(Message::InputDelete),
        InputKey::CharCtrl('w') => Some(Message::InputDeleteWord),
        InputKey::Left => Some(Message::InputLeft),
        InputKey::Right => Some(Message::InputRight),
        InputKey::Home => Some(Message::InputHome),
        InputKey::End => Some(Message::InputEnd),
        _ => None,
    }
}
