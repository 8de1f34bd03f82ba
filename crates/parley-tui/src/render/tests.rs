//! Full-screen rendering tests

use super::*;
use crate::test_utils::TestTerminal;
use parley_app::attachment::AttachmentFile;
use parley_app::config::{BackendMode, Settings};
use parley_app::handler::update;
use parley_app::message::Message;
use parley_core::{ChatMessage, Conversation};
use parley_transport::{ChatSnapshot, InboundFrame, ServerEvent, TransportEvent};

fn inbound(event: ServerEvent) -> Message {
    Message::Transport(TransportEvent::Frame(InboundFrame {
        event,
        request_id: None,
    }))
}

fn connected_state() -> AppState {
    let mut state = AppState::default();
    update(&mut state, Message::Transport(TransportEvent::Connected));
    state.status_message = None;
    state
}

fn render(state: &mut AppState) -> TestTerminal {
    let mut term = TestTerminal::new();
    term.draw_with(|frame| view(frame, state));
    term
}

#[test]
fn test_empty_session_layout() {
    let mut state = connected_state();
    let term = render(&mut state);

    assert!(term.buffer_contains("Parley"));
    assert!(term.buffer_contains(DEFAULT_CHAT_TITLE));
    assert!(term.buffer_contains("Chats (0)"));
    assert!(term.buffer_contains("No messages yet"));
    assert!(term.buffer_contains("Type a message"));
    assert!(term.buffer_contains("● Connected"));
}

#[test]
fn test_conversation_rendered_with_labels() {
    let mut state = connected_state();
    update(
        &mut state,
        inbound(ServerEvent::Chats {
            data: vec![Conversation::new("x").with_smart_title("سلام و احوالپرسی")],
        }),
    );
    update(&mut state, Message::SelectChat { index: 0 });
    update(
        &mut state,
        inbound(ServerEvent::ChatSwitched(ChatSnapshot {
            messages: vec![ChatMessage::user("سلام"), ChatMessage::bot("سلام دوست من")],
            smart_title: Some("سلام و احوالپرسی".to_string()),
            title: None,
        })),
    );

    let term = render(&mut state);

    assert!(term.buffer_contains("شما"));
    assert!(term.buffer_contains("مربی"));
    assert!(term.buffer_contains("سلام دوست من"));
    // Header shows the active chat's smart title
    assert!(term.line_contains(1, "سلام و احوالپرسی"));
    assert_eq!(state.log.scroll.total_lines, 5);
}

#[test]
fn test_typing_indicator_after_submit() {
    let mut state = connected_state();
    update(
        &mut state,
        Message::SubmitText {
            text: "hi".to_string(),
        },
    );
    update(&mut state, Message::Submit);

    let term = render(&mut state);
    assert!(term.buffer_contains("is typing"));
}

#[test]
fn test_staged_attachment_shown_in_composer() {
    let mut state = connected_state();
    update(
        &mut state,
        Message::AttachmentLoaded {
            file: AttachmentFile::new("photo.png", "image/png", vec![1, 2, 3]),
        },
    );

    let term = render(&mut state);
    assert!(term.buffer_contains("photo.png"));
    assert!(term.buffer_contains("Attached photo.png (image)"));
}

#[test]
fn test_attach_prompt_overlay() {
    let mut state = connected_state();
    update(&mut state, Message::OpenAttachPrompt);
    update(&mut state, Message::InputChar('a'));

    let term = render(&mut state);
    assert!(term.buffer_contains("Attach image or video"));
}

#[test]
fn test_confirm_delete_overlay() {
    let mut state = connected_state();
    update(
        &mut state,
        inbound(ServerEvent::Chats {
            data: vec![Conversation::new("old chat")],
        }),
    );
    update(&mut state, Message::RequestDeleteChat { index: 0 });

    let term = render(&mut state);
    assert!(term.buffer_contains("Delete conversation"));
    assert!(term.buffer_contains("old chat"));
}

#[test]
fn test_http_mode_hides_sidebar() {
    let mut settings = Settings::default();
    settings.server.mode = BackendMode::Http;
    let mut state = AppState::new(settings);

    let term = render(&mut state);
    assert!(!term.buffer_contains("Chats ("));
    assert!(term.buffer_contains("HTTP"));
}

#[test]
fn test_disconnect_notice_in_log() {
    let mut state = connected_state();
    update(
        &mut state,
        Message::Transport(TransportEvent::Disconnected {
            reason: Some("connection reset".to_string()),
        }),
    );

    let term = render(&mut state);
    assert!(term.buffer_contains("• Disconnected: connection reset"));
}
