//! Headless event loop
//!
//! Reads commands from stdin on a plain thread, runs them through the
//! shared [`ChatSession`], and turns state changes into NDJSON events.

use std::path::PathBuf;

use tokio::sync::mpsc;

use parley_app::config::Settings;
use parley_app::pending::TypingIndicator;
use parley_app::{AppState, ChatSession, Message};
use parley_core::prelude::*;
use parley_transport::{ServerEvent, TransportEvent};

use super::{ChatEntry, HeadlessEvent};

/// Run in headless mode: NDJSON on stdout instead of the TUI.
pub async fn run_headless(settings: Settings) -> Result<()> {
    info!("═══════════════════════════════════════════════════════");
    info!("Parley starting in HEADLESS mode");
    if settings.is_http() {
        info!("Backend: {} (HTTP)", settings.server.http_endpoint);
    } else {
        info!("Backend: {}", settings.server.url);
    }
    info!("═══════════════════════════════════════════════════════");

    let mut session = ChatSession::open(settings).await;

    let stdin_tx = session.msg_sender();
    std::thread::spawn(move || read_stdin_commands(stdin_tx));

    if session.state.is_http() {
        // No connection handshake in HTTP mode.
        HeadlessEvent::connected().emit();
    }

    let mut observer = StateObserver::new(&session.state);
    while !session.should_quit() {
        let Some(msg) = session.recv().await else {
            info!("Message channel closed");
            break;
        };

        observer.before(&msg);
        let loaded_snapshot = is_snapshot(&msg);
        session.process_message(msg);
        observer.after(&session.state, loaded_snapshot);
    }

    session.shutdown().await;
    info!("Parley headless mode exiting");
    Ok(())
}

fn is_snapshot(msg: &Message) -> bool {
    matches!(
        msg,
        Message::Transport(TransportEvent::Frame(frame))
            if matches!(frame.event, ServerEvent::Chat(_) | ServerEvent::ChatSwitched(_))
    )
}

/// Tracks what has already been emitted so each change is reported once.
struct StateObserver {
    emitted_messages: usize,
    chat_generation: u64,
    awaiting: bool,
    status: Option<String>,
}

impl StateObserver {
    fn new(state: &AppState) -> Self {
        Self {
            emitted_messages: state.log.len(),
            chat_generation: state.chat_list.generation(),
            awaiting: state.pending.is_awaiting(),
            status: state.status_message.clone(),
        }
    }

    /// Events that come straight from the message, before it is processed.
    fn before(&self, msg: &Message) {
        let Message::Transport(event) = msg else {
            return;
        };

        match event {
            TransportEvent::Connected => HeadlessEvent::connected().emit(),
            TransportEvent::Reconnecting {
                attempt,
                max_attempts,
            } => HeadlessEvent::reconnecting(*attempt, *max_attempts).emit(),
            TransportEvent::Disconnected { reason } => {
                HeadlessEvent::disconnected(reason.clone()).emit()
            }
            TransportEvent::Malformed(raw) => {
                HeadlessEvent::error(format!("Malformed frame: {raw}"), false).emit()
            }
            TransportEvent::Frame(frame) => {
                if let ServerEvent::Error { message } = &frame.event {
                    HeadlessEvent::error(message.clone(), false).emit();
                }
            }
        }
    }

    /// Events derived from what processing changed.
    fn after(&mut self, state: &AppState, loaded_snapshot: bool) {
        if state.chat_list.generation() != self.chat_generation {
            self.chat_generation = state.chat_list.generation();
            HeadlessEvent::chats(chat_entries(state), state.chat_list.active()).emit();
        }

        if loaded_snapshot {
            HeadlessEvent::chat_loaded(state.log.len(), state.log.title_generated()).emit();
            self.emitted_messages = 0;
        } else if self.emitted_messages > state.log.len() {
            // Log was cleared locally
            self.emitted_messages = 0;
        }

        for message in state.log.messages().iter().skip(self.emitted_messages) {
            HeadlessEvent::message(message).emit();
        }
        self.emitted_messages = state.log.len();

        let awaiting = state.typing_indicator() == TypingIndicator::AwaitingReply;
        if awaiting != self.awaiting {
            self.awaiting = awaiting;
            HeadlessEvent::typing(awaiting).emit();
        }

        if state.status_message != self.status {
            self.status = state.status_message.clone();
            if let Some(status) = &self.status {
                HeadlessEvent::status(status.clone()).emit();
            }
        }
    }
}

fn chat_entries(state: &AppState) -> Vec<ChatEntry> {
    state
        .chat_list
        .iter()
        .enumerate()
        .map(|(index, chat)| ChatEntry {
            index,
            title: chat.display_title().to_string(),
        })
        .collect()
}

/// Parse one line of stdin.
///
/// Returns `Ok(None)` for blank lines and `Err` with a usage hint for
/// unknown or malformed commands. Anything not starting with `/` is a
/// message to send.
fn parse_command(line: &str) -> std::result::Result<Option<Message>, String> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let Some(command) = trimmed.strip_prefix('/') else {
        return Ok(Some(Message::SubmitText {
            text: trimmed.to_string(),
        }));
    };

    let (name, arg) = match command.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, arg.trim()),
        None => (command, ""),
    };

    let msg = match name {
        "attach" if !arg.is_empty() => Message::StageAttachment {
            path: PathBuf::from(arg),
        },
        "attach" => return Err("usage: /attach <path>".to_string()),
        "detach" => Message::RemoveAttachment,
        "switch" => Message::SelectChat {
            index: parse_index(name, arg)?,
        },
        "delete" => Message::DeleteChat {
            index: parse_index(name, arg)?,
        },
        "new" => Message::NewChat,
        "clear" => Message::ClearAllChats,
        "chats" => Message::RefreshChats,
        "quit" | "exit" => Message::Quit,
        other => return Err(format!("unknown command: /{other}")),
    };
    Ok(Some(msg))
}

fn parse_index(name: &str, arg: &str) -> std::result::Result<usize, String> {
    arg.parse()
        .map_err(|_| format!("usage: /{name} <index>"))
}

/// Forward stdin lines to the session until EOF or the session goes away.
fn read_stdin_commands(msg_tx: mpsc::Sender<Message>) {
    use std::io::BufRead;

    let stdin = std::io::stdin();
    for line in stdin.lock().lines() {
        let line = match line {
            Ok(line) => line,
            Err(e) => {
                warn!("Stdin read error: {}", e);
                break;
            }
        };

        match parse_command(&line) {
            Ok(Some(msg)) => {
                if msg_tx.blocking_send(msg).is_err() {
                    break;
                }
            }
            Ok(None) => {}
            Err(hint) => HeadlessEvent::error(hint, false).emit(),
        }
    }
    info!("Stdin closed");
}
