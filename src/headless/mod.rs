//! Headless mode: NDJSON events on stdout, commands on stdin
//!
//! Every event is one JSON object per line with an `event` tag and a
//! millisecond `timestamp`, so scripts can drive a chat backend without
//! the TUI.

pub mod runner;

use serde::Serialize;
use std::io::Write;

use parley_core::ChatMessage;

/// One line of headless output.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum HeadlessEvent {
    Connected {
        timestamp: i64,
    },

    Reconnecting {
        attempt: u32,
        max_attempts: u32,
        timestamp: i64,
    },

    Disconnected {
        #[serde(skip_serializing_if = "Option::is_none")]
        reason: Option<String>,
        timestamp: i64,
    },

    /// The conversation list was replaced.
    Chats {
        chats: Vec<ChatEntry>,
        #[serde(skip_serializing_if = "Option::is_none")]
        active: Option<usize>,
        timestamp: i64,
    },

    /// A full conversation snapshot replaced the log. Its messages follow
    /// as `message` events.
    ChatLoaded {
        message_count: usize,
        title_generated: bool,
        timestamp: i64,
    },

    Message {
        role: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        file: Option<String>,
        timestamp: i64,
    },

    Typing {
        awaiting: bool,
        timestamp: i64,
    },

    /// Transient feedback (attachment staged, nothing to send, ...).
    Status {
        message: String,
        timestamp: i64,
    },

    Error {
        message: String,
        fatal: bool,
        timestamp: i64,
    },
}

/// A conversation as listed in a `chats` event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChatEntry {
    pub index: usize,
    pub title: String,
}

impl HeadlessEvent {
    /// Write this event to stdout as one line and flush.
    pub fn emit(&self) {
        match serde_json::to_string(self) {
            Ok(json) => {
                let mut stdout = std::io::stdout().lock();
                let _ = writeln!(stdout, "{json}");
                let _ = stdout.flush();
            }
            Err(e) => tracing::error!("Failed to serialize headless event: {}", e),
        }
    }

    fn now() -> i64 {
        chrono::Utc::now().timestamp_millis()
    }

    pub fn connected() -> Self {
        Self::Connected {
            timestamp: Self::now(),
        }
    }

    pub fn reconnecting(attempt: u32, max_attempts: u32) -> Self {
        Self::Reconnecting {
            attempt,
            max_attempts,
            timestamp: Self::now(),
        }
    }

    pub fn disconnected(reason: Option<String>) -> Self {
        Self::Disconnected {
            reason,
            timestamp: Self::now(),
        }
    }

    pub fn chats(chats: Vec<ChatEntry>, active: Option<usize>) -> Self {
        Self::Chats {
            chats,
            active,
            timestamp: Self::now(),
        }
    }

    pub fn chat_loaded(message_count: usize, title_generated: bool) -> Self {
        Self::ChatLoaded {
            message_count,
            title_generated,
            timestamp: Self::now(),
        }
    }

    pub fn message(message: &ChatMessage) -> Self {
        Self::Message {
            role: message.role.as_str().to_string(),
            content: message.content.clone(),
            file: message.file.as_ref().map(|f| f.filename.clone()),
            timestamp: Self::now(),
        }
    }

    pub fn typing(awaiting: bool) -> Self {
        Self::Typing {
            awaiting,
            timestamp: Self::now(),
        }
    }

    pub fn status(message: String) -> Self {
        Self::Status {
            message,
            timestamp: Self::now(),
        }
    }

    pub fn error(message: String, fatal: bool) -> Self {
        Self::Error {
            message,
            fatal,
            timestamp: Self::now(),
        }
    }
}
