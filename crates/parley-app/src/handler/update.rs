//! Main update function - handles state transitions (TEA pattern)

use std::path::PathBuf;

use crate::message::Message;
use crate::state::{AppState, Focus, UiMode};
use parley_core::prelude::*;

use super::{chats, keys::handle_key, submit, transport, UpdateAction, UpdateResult};

/// Process a message and update state
/// Returns optional follow-up message and/or action
pub fn update(state: &mut AppState, message: Message) -> UpdateResult {
    match message {
        Message::Quit => {
            state.request_quit();
            UpdateResult::none()
        }

        Message::Key(key) => match handle_key(state, key) {
            Some(msg) => UpdateResult::message(msg),
            None => UpdateResult::none(),
        },

        Message::Tick => {
            state.tick = state.tick.wrapping_add(1);
            UpdateResult::none()
        }

        Message::Transport(event) => transport::handle_transport_event(state, event),

        // ─────────────────────────────────────────────────────────
        // Composer
        // ─────────────────────────────────────────────────────────
        Message::InputChar(c) => {
            active_input(state).insert_char(c);
            UpdateResult::none()
        }
        Message::InputBackspace => {
            active_input(state).backspace();
            UpdateResult::none()
        }
        Message::InputDelete => {
            active_input(state).delete();
            UpdateResult::none()
        }
        Message::InputDeleteWord => {
            active_input(state).delete_word();
            UpdateResult::none()
        }
        Message::InputLeft => {
            active_input(state).move_left();
            UpdateResult::none()
        }
        Message::InputRight => {
            active_input(state).move_right();
            UpdateResult::none()
        }
        Message::InputHome => {
            active_input(state).move_home();
            UpdateResult::none()
        }
        Message::InputEnd => {
            active_input(state).move_end();
            UpdateResult::none()
        }

        Message::Submit => submit::handle_submit(state),

        Message::SubmitText { text } => {
            state.input.set(text);
            UpdateResult::message(Message::Submit)
        }

        Message::AttachmentEncoded {
            request_id,
            filename,
            mime_type,
            data,
            text,
        } => submit::handle_attachment_encoded(request_id, filename, mime_type, data, text),

        Message::AttachmentEncodeFailed { request_id, error } => {
            submit::handle_attachment_encode_failed(state, request_id, error)
        }

        Message::HttpReplyReceived { request_id, reply } => {
            submit::handle_http_reply(state, request_id, reply)
        }

        Message::HttpReplyFailed { request_id, error } => {
            submit::handle_http_failure(state, request_id, error)
        }

        // ─────────────────────────────────────────────────────────
        // Attachments
        // ─────────────────────────────────────────────────────────
        Message::OpenAttachPrompt => {
            if !state.attachments_enabled() {
                state.set_status("Attachments are not supported by HTTP backends");
                return UpdateResult::none();
            }
            state.attach_prompt.clear();
            state.ui_mode = UiMode::AttachPrompt;
            UpdateResult::none()
        }

        Message::CancelAttachPrompt => {
            state.attach_prompt.clear();
            state.ui_mode = UiMode::Normal;
            UpdateResult::none()
        }

        Message::ConfirmAttachPrompt => {
            let raw = state.attach_prompt.text().trim().to_string();
            state.attach_prompt.clear();
            state.ui_mode = UiMode::Normal;
            if raw.is_empty() {
                return UpdateResult::none();
            }
            UpdateResult::message(Message::StageAttachment {
                path: expand_home(&raw),
            })
        }

        Message::StageAttachment { path } => {
            if !state.attachments_enabled() {
                state.set_status("Attachments are not supported by HTTP backends");
                return UpdateResult::none();
            }
            state.loading_attachment = true;
            UpdateResult::action(UpdateAction::LoadAttachment {
                path,
                max_bytes: state.settings.attachments.max_bytes,
            })
        }

        Message::AttachmentLoaded { file } => {
            state.loading_attachment = false;
            let filename = file.filename.clone();
            match state.staging.stage(file) {
                Ok(pending) => {
                    let kind = pending.kind().map(|k| k.label()).unwrap_or("file");
                    let status = format!("Attached {} ({})", filename, kind);
                    state.set_status(status);
                }
                Err(e) => {
                    warn!("Rejected attachment {}: {}", filename, e);
                    state.set_status(e.to_string());
                }
            }
            UpdateResult::none()
        }

        Message::AttachmentLoadFailed { error } => {
            state.loading_attachment = false;
            state.set_status(error);
            UpdateResult::none()
        }

        Message::RemoveAttachment => {
            if state.staging.clear() {
                state.set_status("Attachment removed");
            }
            UpdateResult::none()
        }

        // ─────────────────────────────────────────────────────────
        // Conversations
        // ─────────────────────────────────────────────────────────
        Message::SelectChat { index } => chats::handle_select(state, index),
        Message::RequestDeleteChat { index } => chats::handle_request_delete(state, index),
        Message::ConfirmDelete => chats::handle_confirm_delete(state),
        Message::CancelDelete => {
            state.ui_mode = UiMode::Normal;
            UpdateResult::none()
        }
        Message::DeleteChat { index } => chats::handle_delete(state, index),
        Message::NewChat => chats::handle_new_chat(state),
        Message::ClearAllChats => chats::handle_clear_all(state),
        Message::RefreshChats => chats::handle_refresh(state),

        Message::ChatCursorUp => {
            state.chat_list.cursor_up();
            UpdateResult::none()
        }
        Message::ChatCursorDown => {
            state.chat_list.cursor_down();
            UpdateResult::none()
        }

        Message::FocusNext => {
            state.focus = match state.focus {
                Focus::Input if state.sidebar_visible() => Focus::ChatList,
                _ => Focus::Input,
            };
            UpdateResult::none()
        }

        // ─────────────────────────────────────────────────────────
        // Scroll
        // ─────────────────────────────────────────────────────────
        Message::ScrollUp => {
            state.log.scroll.scroll_up(1);
            UpdateResult::none()
        }
        Message::ScrollDown => {
            state.log.scroll.scroll_down(1);
            UpdateResult::none()
        }
        Message::PageUp => {
            state.log.scroll.page_up();
            UpdateResult::none()
        }
        Message::PageDown => {
            state.log.scroll.page_down();
            UpdateResult::none()
        }
        Message::ScrollToTop => {
            state.log.scroll.scroll_to_top();
            UpdateResult::none()
        }
        Message::ScrollToBottom => {
            state.log.scroll.scroll_to_bottom();
            UpdateResult::none()
        }
    }
}

/// The buffer that editing keys apply to in the current mode.
fn active_input(state: &mut AppState) -> &mut crate::input::InputBuffer {
    match state.ui_mode {
        UiMode::AttachPrompt => &mut state.attach_prompt,
        _ => &mut state.input,
    }
}

/// Expand a leading `~/` to the home directory.
fn expand_home(raw: &str) -> PathBuf {
    match (raw.strip_prefix("~/"), dirs::home_dir()) {
        (Some(rest), Some(home)) => home.join(rest),
        _ => PathBuf::from(raw),
    }
}
