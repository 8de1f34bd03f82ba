//! Application state (Model in TEA pattern)

use crate::attachment::AttachmentStaging;
use crate::chat_list::ChatListStore;
use crate::config::Settings;
use crate::input::InputBuffer;
use crate::message_log::MessageLog;
use crate::pending::{PendingReplies, TypingIndicator};

/// Current UI mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiMode {
    /// Chat view: typing goes to the input bar or the chat list
    #[default]
    Normal,

    /// Capturing a file path to attach
    AttachPrompt,

    /// Asking the user to confirm deleting a conversation.
    ///
    /// `generation` is the chat list snapshot the index was read from; a
    /// refresh in between invalidates the request.
    ConfirmDelete { index: usize, generation: u64 },
}

/// Which pane receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Input,
    ChatList,
}

/// Backend connection status for display.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    #[default]
    Connecting,
    Connected,
    Reconnecting {
        attempt: u32,
        max_attempts: u32,
    },
    Disconnected {
        reason: Option<String>,
    },
}

impl ConnectionStatus {
    /// Short label for the status bar, e.g. `"Reconnecting (2/5)"`.
    pub fn label(&self) -> String {
        match self {
            ConnectionStatus::Connecting => "Connecting".to_string(),
            ConnectionStatus::Connected => "Connected".to_string(),
            ConnectionStatus::Reconnecting {
                attempt,
                max_attempts,
            } => format!("Reconnecting ({attempt}/{max_attempts})"),
            ConnectionStatus::Disconnected { .. } => "Disconnected".to_string(),
        }
    }

    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

/// Complete application state (the Model in TEA)
#[derive(Debug)]
pub struct AppState {
    pub settings: Settings,

    /// Backend conversation list (empty in HTTP mode)
    pub chat_list: ChatListStore,

    /// Active conversation's messages
    pub log: MessageLog,

    /// The single staged attachment
    pub staging: AttachmentStaging,

    /// Message composer
    pub input: InputBuffer,

    /// File path typed in [`UiMode::AttachPrompt`]
    pub attach_prompt: InputBuffer,

    /// Submits still awaiting a reply
    pub pending: PendingReplies,

    pub connection: ConnectionStatus,

    pub focus: Focus,

    pub ui_mode: UiMode,

    /// One-line feedback shown in the status bar until the next action
    pub status_message: Option<String>,

    /// A file is being read from disk
    pub loading_attachment: bool,

    /// Animation frame counter for the typing indicator
    pub tick: u64,

    pub should_quit: bool,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        let connection = if settings.is_http() {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Connecting
        };

        Self {
            settings,
            chat_list: ChatListStore::new(),
            log: MessageLog::new(),
            staging: AttachmentStaging::new(),
            input: InputBuffer::new(),
            attach_prompt: InputBuffer::new(),
            pending: PendingReplies::new(),
            connection,
            focus: Focus::Input,
            ui_mode: UiMode::Normal,
            status_message: None,
            loading_attachment: false,
            tick: 0,
            should_quit: false,
        }
    }

    pub fn is_http(&self) -> bool {
        self.settings.is_http()
    }

    /// The chat list pane is only meaningful against a WebSocket backend.
    pub fn sidebar_visible(&self) -> bool {
        self.settings.ui.show_sidebar && !self.is_http()
    }

    /// HTTP backends only accept text.
    pub fn attachments_enabled(&self) -> bool {
        !self.is_http()
    }

    pub fn typing_indicator(&self) -> TypingIndicator {
        self.pending.indicator()
    }

    pub fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
    }

    pub fn request_quit(&mut self) {
        self.should_quit = true;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}
