//! Composing and dispatching user submissions.

use crate::input::{compose, Submission};
use crate::state::{AppState, ConnectionStatus, UiMode};
use parley_core::prelude::*;
use parley_core::{ChatMessage, FileRef, UPSTREAM_APOLOGY};
use parley_transport::{ClientAction, ClientRequest};

use super::{UpdateAction, UpdateResult};

/// Send the composer text and/or staged attachment.
///
/// The user message is rendered immediately, before the backend confirms
/// anything. The composer and staging slot are empty afterwards.
pub fn handle_submit(state: &mut AppState) -> UpdateResult {
    if state.ui_mode != UiMode::Normal {
        return UpdateResult::none();
    }

    let Some(submission) = compose(&mut state.input, &mut state.staging) else {
        return UpdateResult::none();
    };

    let optimistic = match &submission {
        Submission::Text { text } => ChatMessage::user(text.clone()),
        Submission::File { file, text } => ChatMessage::user(text.clone()).with_file(FileRef {
            filename: file.filename.clone(),
            mime_type: Some(file.mime_type.clone()),
        }),
    };
    state.log.push(optimistic);
    state.log.scroll.scroll_to_bottom();
    state.status_message = None;

    let request_id = if matches!(state.connection, ConnectionStatus::Disconnected { .. }) {
        state.set_status("Not connected; the message was not delivered");
        state.pending.next_id()
    } else {
        state.pending.begin()
    };

    match submission {
        Submission::Text { text } if state.is_http() => {
            UpdateResult::action(UpdateAction::AskHttp { request_id, text })
        }
        Submission::Text { text } => UpdateResult::send(ClientRequest::with_id(
            ClientAction::SendMessage { text },
            request_id,
        )),
        Submission::File { file, text } => UpdateResult::action(UpdateAction::EncodeAndSendFile {
            request_id,
            file,
            text,
        }),
    }
}

/// Encoding finished: dispatch the `send_file` request.
pub fn handle_attachment_encoded(
    request_id: u64,
    filename: String,
    mime_type: String,
    data: String,
    text: String,
) -> UpdateResult {
    UpdateResult::send(ClientRequest::with_id(
        ClientAction::SendFile {
            filename,
            mime_type,
            data,
            text,
        },
        request_id,
    ))
}

pub fn handle_attachment_encode_failed(
    state: &mut AppState,
    request_id: u64,
    error: String,
) -> UpdateResult {
    warn!("Attachment for request {} could not be encoded: {}", request_id, error);
    state.pending.resolve(Some(request_id));
    state.log.push_notice(format!("File was not sent: {error}"));
    UpdateResult::none()
}

pub fn handle_http_reply(state: &mut AppState, request_id: u64, reply: String) -> UpdateResult {
    state.pending.resolve(Some(request_id));
    state.log.push(ChatMessage::bot(reply));
    UpdateResult::none()
}

/// Upstream failures render a fixed apology as a bot message and otherwise
/// leave the conversation alone.
pub fn handle_http_failure(state: &mut AppState, request_id: u64, error: String) -> UpdateResult {
    warn!("HTTP backend failed for request {}: {}", request_id, error);
    state.pending.resolve(Some(request_id));
    state.log.push(ChatMessage::bot(UPSTREAM_APOLOGY));
    UpdateResult::none()
}
