//! Conversation list actions.
//!
//! Every request built here addresses conversations by their position in
//! the current snapshot.

use crate::state::{AppState, UiMode};
use parley_transport::{ClientAction, ClientRequest};

use super::UpdateResult;

/// Queue `action` with a fresh request id, or explain why not.
fn send_chat_action(state: &mut AppState, action: ClientAction) -> UpdateResult {
    if state.is_http() {
        state.set_status("HTTP backends have no conversation list");
        return UpdateResult::none();
    }
    let request_id = state.pending.next_id();
    UpdateResult::send(ClientRequest::with_id(action, request_id))
}

pub fn handle_select(state: &mut AppState, index: usize) -> UpdateResult {
    match state.chat_list.select(index) {
        Some(action) => send_chat_action(state, action),
        None => {
            state.set_status(format!("No conversation #{}", index + 1));
            UpdateResult::none()
        }
    }
}

pub fn handle_request_delete(state: &mut AppState, index: usize) -> UpdateResult {
    if index >= state.chat_list.len() {
        return UpdateResult::none();
    }
    state.ui_mode = UiMode::ConfirmDelete {
        index,
        generation: state.chat_list.generation(),
    };
    UpdateResult::none()
}

pub fn handle_confirm_delete(state: &mut AppState) -> UpdateResult {
    let UiMode::ConfirmDelete { index, generation } = state.ui_mode else {
        return UpdateResult::none();
    };
    state.ui_mode = UiMode::Normal;

    if generation != state.chat_list.generation() {
        state.set_status("Chat list changed; delete cancelled");
        return UpdateResult::none();
    }
    handle_delete(state, index)
}

pub fn handle_delete(state: &mut AppState, index: usize) -> UpdateResult {
    match state.chat_list.delete(index) {
        Some(action) => send_chat_action(state, action),
        None => {
            state.set_status(format!("No conversation #{}", index + 1));
            UpdateResult::none()
        }
    }
}

pub fn handle_new_chat(state: &mut AppState) -> UpdateResult {
    send_chat_action(state, ClientAction::NewChat)
}

pub fn handle_clear_all(state: &mut AppState) -> UpdateResult {
    send_chat_action(state, ClientAction::ClearAll)
}

pub fn handle_refresh(state: &mut AppState) -> UpdateResult {
    send_chat_action(state, ClientAction::GetChats)
}
