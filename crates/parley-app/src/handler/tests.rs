//! Tests for handler module

use base64::{engine::general_purpose::STANDARD, Engine as _};

use super::*;
use crate::actions::encode_file_message;
use crate::attachment::AttachmentFile;
use crate::config::{BackendMode, Settings};
use crate::input_key::InputKey;
use crate::message::Message;
use crate::pending::TypingIndicator;
use crate::state::{AppState, ConnectionStatus, Focus, UiMode};
use parley_core::{ChatMessage, Conversation, FileRef, Role, UPSTREAM_APOLOGY};
use parley_transport::{
    ChatSnapshot, ClientAction, ClientRequest, InboundFrame, ServerEvent, TransportEvent,
};

fn connected_state() -> AppState {
    let mut state = AppState::default();
    update(&mut state, Message::Transport(TransportEvent::Connected));
    state
}

fn http_state() -> AppState {
    let mut settings = Settings::default();
    settings.server.mode = BackendMode::Http;
    AppState::new(settings)
}

fn inbound(event: ServerEvent) -> Message {
    Message::Transport(TransportEvent::Frame(InboundFrame {
        event,
        request_id: None,
    }))
}

fn inbound_with_id(event: ServerEvent, request_id: u64) -> Message {
    Message::Transport(TransportEvent::Frame(InboundFrame {
        event,
        request_id: Some(request_id),
    }))
}

fn type_text(state: &mut AppState, text: &str) {
    for c in text.chars() {
        update(state, Message::InputChar(c));
    }
}

fn sent_request(result: &UpdateResult) -> &ClientRequest {
    match &result.action {
        Some(UpdateAction::Send(request)) => request,
        other => panic!("Expected Send action, got {:?}", other),
    }
}

/// Run a message and any follow-up messages, collecting actions.
fn run(state: &mut AppState, message: Message) -> Vec<UpdateAction> {
    let mut actions = Vec::new();
    let mut msg = Some(message);
    while let Some(m) = msg {
        let result = update(state, m);
        actions.extend(result.action);
        msg = result.message;
    }
    actions
}

// ─────────────────────────────────────────────────────────
// Chat list
// ─────────────────────────────────────────────────────────

#[test]
fn test_chat_list_mirrors_most_recent_snapshot() {
    let mut state = connected_state();
    let snapshots = vec![
        vec![Conversation::new("a"), Conversation::new("b")],
        vec![],
        vec![
            Conversation::new("x").with_smart_title("برنامه غذایی"),
            Conversation::new("y"),
            Conversation::new("z"),
        ],
    ];

    for snapshot in snapshots {
        update(
            &mut state,
            inbound(ServerEvent::Chats {
                data: snapshot.clone(),
            }),
        );
        let mirrored: Vec<Conversation> = state.chat_list.iter().cloned().collect();
        assert_eq!(mirrored, snapshot);
    }
    assert_eq!(state.chat_list.display_title(0), Some("برنامه غذایی"));
}

#[test]
fn test_select_chat_sends_switch_with_index() {
    let mut state = connected_state();
    update(
        &mut state,
        inbound(ServerEvent::Chats {
            data: vec![Conversation::new("a"), Conversation::new("b")],
        }),
    );

    let result = update(&mut state, Message::SelectChat { index: 1 });
    let request = sent_request(&result);
    assert_eq!(request.action, ClientAction::SwitchChat { index: 1 });
    assert!(request.request_id.is_some());
}

#[test]
fn test_select_out_of_range_sends_nothing() {
    let mut state = connected_state();
    let result = update(&mut state, Message::SelectChat { index: 3 });
    assert!(result.action.is_none());
    assert!(state.status_message.is_some());
}

#[test]
fn test_active_chat_tracked_across_reordered_snapshot() {
    let mut state = connected_state();
    update(
        &mut state,
        inbound(ServerEvent::Chats {
            data: vec![
                Conversation::new("A"),
                Conversation::new("B"),
                Conversation::new("C"),
            ],
        }),
    );
    update(&mut state, Message::SelectChat { index: 2 });

    // Backend re-sorts by last update after a reply.
    update(
        &mut state,
        inbound(ServerEvent::Chats {
            data: vec![
                Conversation::new("C"),
                Conversation::new("A"),
                Conversation::new("B"),
            ],
        }),
    );

    let active = state.chat_list.active();
    assert_eq!(active, Some(0));
    assert_eq!(
        active.and_then(|i| state.chat_list.display_title(i)),
        Some("C")
    );
}

#[test]
fn test_delete_requires_confirmation() {
    let mut state = connected_state();
    update(
        &mut state,
        inbound(ServerEvent::Chats {
            data: vec![Conversation::new("a"), Conversation::new("b")],
        }),
    );

    let result = update(&mut state, Message::RequestDeleteChat { index: 1 });
    assert!(result.action.is_none());
    assert!(matches!(state.ui_mode, UiMode::ConfirmDelete { index: 1, .. }));

    let result = update(&mut state, Message::ConfirmDelete);
    assert_eq!(
        sent_request(&result).action,
        ClientAction::DeleteChat { index: 1 }
    );
    assert_eq!(state.ui_mode, UiMode::Normal);
}

#[test]
fn test_delete_cancelled_when_list_refreshes_before_confirm() {
    let mut state = connected_state();
    update(
        &mut state,
        inbound(ServerEvent::Chats {
            data: vec![Conversation::new("a"), Conversation::new("b")],
        }),
    );
    update(&mut state, Message::RequestDeleteChat { index: 0 });

    update(
        &mut state,
        inbound(ServerEvent::Chats {
            data: vec![Conversation::new("new"), Conversation::new("a")],
        }),
    );

    assert_eq!(state.ui_mode, UiMode::Normal);
    let result = update(&mut state, Message::ConfirmDelete);
    assert!(result.action.is_none());
}

#[test]
fn test_new_chat_and_clear_all_actions() {
    let mut state = connected_state();
    let result = update(&mut state, Message::NewChat);
    assert_eq!(sent_request(&result).action, ClientAction::NewChat);

    let result = update(&mut state, Message::ClearAllChats);
    assert_eq!(sent_request(&result).action, ClientAction::ClearAll);

    let result = update(&mut state, Message::RefreshChats);
    assert_eq!(sent_request(&result).action, ClientAction::GetChats);
}

#[test]
fn test_chat_actions_ignored_in_http_mode() {
    let mut state = http_state();
    let result = update(&mut state, Message::NewChat);
    assert!(result.action.is_none());
}

// ─────────────────────────────────────────────────────────
// Message log
// ─────────────────────────────────────────────────────────

#[test]
fn test_chat_switched_fully_replaces_log() {
    let mut state = connected_state();
    update(
        &mut state,
        inbound(ServerEvent::NewMessage(ChatMessage::bot("previous chat"))),
    );

    update(
        &mut state,
        inbound(ServerEvent::ChatSwitched(ChatSnapshot {
            messages: vec![ChatMessage::user("hi"), ChatMessage::bot("hello")],
            smart_title: Some("Greeting".to_string()),
            title: None,
        })),
    );

    let contents: Vec<_> = state.log.messages().iter().map(|m| m.content.as_str()).collect();
    assert_eq!(contents, vec!["hi", "hello"]);
    assert!(state.log.title_generated());
    assert!(state.log.scroll.auto_scroll);
}

#[test]
fn test_chat_snapshot_without_smart_title() {
    let mut state = connected_state();
    update(
        &mut state,
        inbound(ServerEvent::Chat(ChatSnapshot {
            messages: vec![ChatMessage::bot("x")],
            smart_title: None,
            title: Some("raw".to_string()),
        })),
    );
    assert!(!state.log.title_generated());
}

#[test]
fn test_new_message_appends_without_forcing_scroll() {
    let mut state = connected_state();
    state.log.scroll.update_content_size(100, 10);
    update(&mut state, Message::ScrollToTop);

    update(
        &mut state,
        inbound(ServerEvent::NewMessage(ChatMessage::bot("later"))),
    );

    assert_eq!(state.log.len(), 1);
    assert!(!state.log.scroll.auto_scroll);
    assert_eq!(state.log.scroll.offset, 0);
}

#[test]
fn test_message_sent_echo_is_not_appended() {
    let mut state = connected_state();
    type_text(&mut state, "hi");
    update(&mut state, Message::Submit);

    update(
        &mut state,
        inbound(ServerEvent::MessageSent(ChatMessage::user("hi"))),
    );

    assert_eq!(state.log.len(), 1);
    assert_eq!(state.typing_indicator(), TypingIndicator::AwaitingReply);
}

#[test]
fn test_error_event_appends_notice_and_clears_typing() {
    let mut state = connected_state();
    type_text(&mut state, "hi");
    update(&mut state, Message::Submit);

    update(
        &mut state,
        inbound(ServerEvent::Error {
            message: "آپلود فایل ناموفق بود".to_string(),
        }),
    );

    let last = state.log.last().unwrap();
    assert_eq!(last.role, Role::System);
    assert_eq!(last.content, "آپلود فایل ناموفق بود");
    assert_eq!(state.typing_indicator(), TypingIndicator::Idle);
}

// ─────────────────────────────────────────────────────────
// Submit
// ─────────────────────────────────────────────────────────

#[test]
fn test_empty_submit_is_noop() {
    let mut state = connected_state();
    type_text(&mut state, "   ");
    let result = update(&mut state, Message::Submit);

    assert!(result.action.is_none());
    assert!(state.log.is_empty());
    assert_eq!(state.typing_indicator(), TypingIndicator::Idle);
}

#[test]
fn test_text_submit_sends_one_message_and_renders_optimistically() {
    let mut state = connected_state();
    type_text(&mut state, "hello");

    let actions = run(&mut state, Message::Submit);

    assert_eq!(actions.len(), 1);
    match &actions[0] {
        UpdateAction::Send(request) => {
            assert_eq!(
                request.action,
                ClientAction::SendMessage {
                    text: "hello".to_string()
                }
            );
        }
        other => panic!("Expected Send, got {:?}", other),
    }
    assert_eq!(state.log.len(), 1);
    assert_eq!(state.log.messages()[0], ChatMessage::user("hello"));
    assert!(state.input.is_empty());
}

#[test]
fn test_persian_greeting_scenario() {
    let mut state = connected_state();
    type_text(&mut state, "سلام");
    update(&mut state, Message::Submit);

    assert_eq!(state.log.messages()[0].role, Role::User);
    assert_eq!(state.log.messages()[0].content, "سلام");
    assert_eq!(state.typing_indicator(), TypingIndicator::AwaitingReply);

    update(
        &mut state,
        inbound(ServerEvent::NewMessage(ChatMessage::bot("سلام دوست من"))),
    );

    assert_eq!(state.log.len(), 2);
    assert_eq!(state.log.messages()[1].role, Role::Bot);
    assert_eq!(state.log.messages()[1].content, "سلام دوست من");
    assert_eq!(state.typing_indicator(), TypingIndicator::Idle);
}

#[test]
fn test_photo_with_caption_scenario() {
    let mut state = connected_state();
    let bytes: Vec<u8> = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 255];

    update(
        &mut state,
        Message::AttachmentLoaded {
            file: AttachmentFile::new("photo.png", "image/png", bytes.clone()),
        },
    );
    assert_eq!(state.staging.live_previews(), 1);
    type_text(&mut state, "نگاه کن");

    let result = update(&mut state, Message::Submit);

    // Slot is empty and the preview was released before anything is sent.
    assert!(state.staging.is_empty());
    assert_eq!(state.staging.live_previews(), 0);
    assert!(state.input.is_empty());

    let optimistic = state.log.last().unwrap();
    assert_eq!(optimistic.content, "نگاه کن");
    assert_eq!(
        optimistic.file.as_ref().map(|f| f.filename.as_str()),
        Some("photo.png")
    );

    let (request_id, file, text) = match result.action {
        Some(UpdateAction::EncodeAndSendFile {
            request_id,
            file,
            text,
        }) => (request_id, file, text),
        other => panic!("Expected EncodeAndSendFile, got {:?}", other),
    };

    let encoded = encode_file_message(request_id, file, text);
    let result = update(&mut state, encoded);
    let request = sent_request(&result);
    assert_eq!(request.request_id, Some(request_id));

    match &request.action {
        ClientAction::SendFile {
            filename,
            mime_type,
            data,
            text,
        } => {
            assert_eq!(filename, "photo.png");
            assert_eq!(mime_type, "image/png");
            assert_eq!(text, "نگاه کن");
            assert_eq!(STANDARD.decode(data).unwrap(), bytes);
        }
        other => panic!("Expected SendFile, got {:?}", other),
    }
}

#[test]
fn test_correlated_reply_clears_only_matching_request() {
    let mut state = connected_state();

    type_text(&mut state, "one");
    let first = sent_request(&update(&mut state, Message::Submit))
        .request_id
        .unwrap();
    type_text(&mut state, "two");
    update(&mut state, Message::Submit);

    update(
        &mut state,
        inbound_with_id(ServerEvent::NewMessage(ChatMessage::bot("re: one")), first),
    );
    assert_eq!(state.typing_indicator(), TypingIndicator::AwaitingReply);

    update(
        &mut state,
        inbound(ServerEvent::NewMessage(ChatMessage::bot("re: two"))),
    );
    assert_eq!(state.typing_indicator(), TypingIndicator::Idle);
}

#[test]
fn test_chats_refresh_ends_the_wait() {
    let mut state = connected_state();
    type_text(&mut state, "hi");
    update(&mut state, Message::Submit);
    assert_eq!(state.typing_indicator(), TypingIndicator::AwaitingReply);

    update(
        &mut state,
        inbound(ServerEvent::Chats {
            data: vec![Conversation::new("A")],
        }),
    );
    assert_eq!(state.typing_indicator(), TypingIndicator::Idle);
}

#[test]
fn test_malformed_frame_does_not_clear_typing() {
    let mut state = connected_state();
    type_text(&mut state, "hi");
    update(&mut state, Message::Submit);

    update(
        &mut state,
        Message::Transport(TransportEvent::Malformed("invalid JSON".to_string())),
    );
    assert_eq!(state.typing_indicator(), TypingIndicator::AwaitingReply);
}

#[test]
fn test_disconnect_clears_typing_and_adds_notice() {
    let mut state = connected_state();
    type_text(&mut state, "hi");
    update(&mut state, Message::Submit);

    update(
        &mut state,
        Message::Transport(TransportEvent::Disconnected {
            reason: Some("connection reset".to_string()),
        }),
    );

    assert_eq!(state.typing_indicator(), TypingIndicator::Idle);
    assert!(matches!(
        state.connection,
        ConnectionStatus::Disconnected { .. }
    ));
    assert_eq!(state.log.last().unwrap().role, Role::System);
}

#[test]
fn test_submit_while_disconnected_does_not_wait() {
    let mut state = connected_state();
    update(
        &mut state,
        Message::Transport(TransportEvent::Disconnected { reason: None }),
    );
    type_text(&mut state, "hi");
    let result = update(&mut state, Message::Submit);

    assert!(result.action.is_some());
    assert_eq!(state.typing_indicator(), TypingIndicator::Idle);
}

#[test]
fn test_reconnecting_updates_status() {
    let mut state = connected_state();
    update(
        &mut state,
        Message::Transport(TransportEvent::Reconnecting {
            attempt: 2,
            max_attempts: 5,
        }),
    );
    assert_eq!(state.connection.label(), "Reconnecting (2/5)");
}

// ─────────────────────────────────────────────────────────
// Attachments
// ─────────────────────────────────────────────────────────

#[test]
fn test_unsupported_attachment_leaves_slot_unchanged() {
    let mut state = connected_state();
    update(
        &mut state,
        Message::AttachmentLoaded {
            file: AttachmentFile::new("a.png", "image/png", vec![1]),
        },
    );
    update(
        &mut state,
        Message::AttachmentLoaded {
            file: AttachmentFile::new("doc.pdf", "application/pdf", vec![2]),
        },
    );

    assert_eq!(state.staging.pending().unwrap().filename, "a.png");
    assert!(state
        .status_message
        .as_deref()
        .unwrap()
        .contains("application/pdf"));
}

#[test]
fn test_attach_prompt_flow() {
    let mut state = connected_state();
    update(&mut state, Message::OpenAttachPrompt);
    assert_eq!(state.ui_mode, UiMode::AttachPrompt);

    type_text(&mut state, "/tmp/photo.png");
    assert!(state.input.is_empty());

    let actions = run(&mut state, Message::ConfirmAttachPrompt);
    assert_eq!(state.ui_mode, UiMode::Normal);
    assert!(state.loading_attachment);
    assert_eq!(
        actions,
        vec![UpdateAction::LoadAttachment {
            path: "/tmp/photo.png".into(),
            max_bytes: state.settings.attachments.max_bytes,
        }]
    );
}

#[test]
fn test_remove_attachment_releases_preview() {
    let mut state = connected_state();
    update(
        &mut state,
        Message::AttachmentLoaded {
            file: AttachmentFile::new("a.mp4", "video/mp4", vec![1]),
        },
    );
    update(&mut state, Message::RemoveAttachment);
    assert!(state.staging.is_empty());
    assert_eq!(state.staging.live_previews(), 0);
}

#[test]
fn test_encode_failure_renders_notice() {
    let mut state = connected_state();
    update(
        &mut state,
        Message::AttachmentLoaded {
            file: AttachmentFile::new("a.png", "image/png", vec![1]),
        },
    );
    let result = update(&mut state, Message::Submit);
    let Some(UpdateAction::EncodeAndSendFile { request_id, .. }) = result.action else {
        panic!("Expected EncodeAndSendFile");
    };

    update(
        &mut state,
        Message::AttachmentEncodeFailed {
            request_id,
            error: "task panicked".to_string(),
        },
    );
    assert_eq!(state.typing_indicator(), TypingIndicator::Idle);
    assert_eq!(state.log.last().unwrap().role, Role::System);
}

#[test]
fn test_attachments_disabled_in_http_mode() {
    let mut state = http_state();
    update(&mut state, Message::OpenAttachPrompt);
    assert_eq!(state.ui_mode, UiMode::Normal);

    let result = update(
        &mut state,
        Message::StageAttachment {
            path: "photo.png".into(),
        },
    );
    assert!(result.action.is_none());
}

// ─────────────────────────────────────────────────────────
// HTTP mode
// ─────────────────────────────────────────────────────────

#[test]
fn test_http_submit_asks_backend() {
    let mut state = http_state();
    type_text(&mut state, "سلام");
    let result = update(&mut state, Message::Submit);

    match result.action {
        Some(UpdateAction::AskHttp { text, .. }) => assert_eq!(text, "سلام"),
        other => panic!("Expected AskHttp, got {:?}", other),
    }
    assert_eq!(state.typing_indicator(), TypingIndicator::AwaitingReply);
}

#[test]
fn test_http_reply_renders_bot_message() {
    let mut state = http_state();
    type_text(&mut state, "سلام");
    let Some(UpdateAction::AskHttp { request_id, .. }) = update(&mut state, Message::Submit).action
    else {
        panic!("Expected AskHttp");
    };

    update(
        &mut state,
        Message::HttpReplyReceived {
            request_id,
            reply: "سلام دوست من".to_string(),
        },
    );

    assert_eq!(state.log.last().unwrap(), &ChatMessage::bot("سلام دوست من"));
    assert_eq!(state.typing_indicator(), TypingIndicator::Idle);
}

#[test]
fn test_http_failure_renders_apology() {
    let mut state = http_state();
    type_text(&mut state, "hi");
    let Some(UpdateAction::AskHttp { request_id, .. }) = update(&mut state, Message::Submit).action
    else {
        panic!("Expected AskHttp");
    };

    update(
        &mut state,
        Message::HttpReplyFailed {
            request_id,
            error: "500".to_string(),
        },
    );

    assert_eq!(state.log.len(), 2);
    assert_eq!(state.log.last().unwrap(), &ChatMessage::bot(UPSTREAM_APOLOGY));
    assert_eq!(state.typing_indicator(), TypingIndicator::Idle);
}

// ─────────────────────────────────────────────────────────
// Keys
// ─────────────────────────────────────────────────────────

#[test]
fn test_ctrl_c_quits_in_every_mode() {
    let mut state = AppState::default();
    assert!(matches!(
        handle_key(&state, InputKey::CharCtrl('c')),
        Some(Message::Quit)
    ));
    state.ui_mode = UiMode::AttachPrompt;
    assert!(matches!(
        handle_key(&state, InputKey::CharCtrl('c')),
        Some(Message::Quit)
    ));

    update(&mut state, Message::Key(InputKey::CharCtrl('c')));
    let result = update(&mut state, Message::Quit);
    assert!(result.action.is_none());
    assert!(state.should_quit);
}

#[test]
fn test_enter_in_composer_submits() {
    let state = AppState::default();
    assert!(matches!(
        handle_key(&state, InputKey::Enter),
        Some(Message::Submit)
    ));
}

#[test]
fn test_typing_q_goes_to_composer() {
    let state = AppState::default();
    assert!(matches!(
        handle_key(&state, InputKey::Char('q')),
        Some(Message::InputChar('q'))
    ));
}

#[test]
fn test_chat_list_keys() {
    let mut state = connected_state();
    update(
        &mut state,
        inbound(ServerEvent::Chats {
            data: vec![Conversation::new("a"), Conversation::new("b")],
        }),
    );
    update(&mut state, Message::FocusNext);
    assert_eq!(state.focus, Focus::ChatList);

    run(&mut state, Message::Key(InputKey::Down));
    assert_eq!(state.chat_list.cursor(), 1);

    let actions = run(&mut state, Message::Key(InputKey::Enter));
    match actions.as_slice() {
        [UpdateAction::Send(request)] => {
            assert_eq!(request.action, ClientAction::SwitchChat { index: 1 })
        }
        other => panic!("Expected one Send, got {:?}", other),
    }
}

#[test]
fn test_focus_stays_on_input_when_sidebar_hidden() {
    let mut state = http_state();
    update(&mut state, Message::FocusNext);
    assert_eq!(state.focus, Focus::Input);
}

#[test]
fn test_confirm_delete_keys() {
    let mut state = AppState::default();
    state.ui_mode = UiMode::ConfirmDelete {
        index: 0,
        generation: 0,
    };
    assert!(matches!(
        handle_key(&state, InputKey::Char('y')),
        Some(Message::ConfirmDelete)
    ));
    assert!(matches!(
        handle_key(&state, InputKey::Esc),
        Some(Message::CancelDelete)
    ));
}

#[test]
fn test_optimistic_file_message_keeps_mime_type() {
    let mut state = connected_state();
    update(
        &mut state,
        Message::AttachmentLoaded {
            file: AttachmentFile::new("clip.mp4", "video/mp4", vec![1, 2]),
        },
    );
    update(&mut state, Message::Submit);

    assert_eq!(
        state.log.last().unwrap().file,
        Some(FileRef {
            filename: "clip.mp4".to_string(),
            mime_type: Some("video/mp4".to_string()),
        })
    );
}
