//! Inbound frames and connection status from the WebSocket channel.

use crate::state::{AppState, ConnectionStatus, UiMode};
use parley_core::prelude::*;
use parley_transport::{InboundFrame, ServerEvent, TransportEvent};

use super::UpdateResult;

pub fn handle_transport_event(state: &mut AppState, event: TransportEvent) -> UpdateResult {
    match event {
        TransportEvent::Connected => {
            info!("Connected to chat backend");
            state.connection = ConnectionStatus::Connected;
            state.set_status("Connected");
        }

        TransportEvent::Reconnecting {
            attempt,
            max_attempts,
        } => {
            // Replies owed by the dropped socket will never arrive.
            state.pending.clear();
            state.connection = ConnectionStatus::Reconnecting {
                attempt,
                max_attempts,
            };
        }

        TransportEvent::Disconnected { reason } => {
            state.pending.clear();
            if let Some(reason) = &reason {
                state.log.push_notice(format!("Disconnected: {reason}"));
            }
            state.connection = ConnectionStatus::Disconnected { reason };
        }

        TransportEvent::Malformed(reason) => {
            warn!("Ignoring malformed frame: {}", reason);
            state.set_status("Ignored a malformed message from the server");
        }

        TransportEvent::Frame(frame) => handle_frame(state, frame),
    }
    UpdateResult::none()
}

fn handle_frame(state: &mut AppState, frame: InboundFrame) {
    let InboundFrame { event, request_id } = frame;

    if event.ends_wait() {
        state.pending.resolve(request_id);
    }

    match event {
        ServerEvent::Chats { data } => {
            debug!("Chat list refreshed ({} conversations)", data.len());
            state.chat_list.replace(data);
            if let UiMode::ConfirmDelete { generation, .. } = state.ui_mode {
                if generation != state.chat_list.generation() {
                    state.ui_mode = UiMode::Normal;
                    state.set_status("Chat list changed; delete cancelled");
                }
            }
        }

        ServerEvent::Chat(snapshot) | ServerEvent::ChatSwitched(snapshot) => {
            let title_generated = snapshot.has_smart_title();
            state.log.load_snapshot(snapshot.messages, title_generated);
        }

        ServerEvent::NewMessage(message) => {
            state.log.push(message);
        }

        ServerEvent::MessageSent(message) => {
            // Already rendered optimistically at submit time.
            trace!("Backend acknowledged upload ({} chars)", message.content.len());
        }

        ServerEvent::Error { message } => {
            warn!("Backend error: {}", message);
            state.log.push_notice(message);
        }
    }
}
