//! Message types for the application (TEA pattern)

use std::path::PathBuf;

use crate::attachment::AttachmentFile;
use crate::input_key::InputKey;
use parley_transport::TransportEvent;

/// All possible messages/actions in the application
#[derive(Debug, Clone)]
pub enum Message {
    /// Keyboard event from terminal
    Key(InputKey),

    /// Tick event for periodic updates (typing indicator animation)
    Tick,

    /// Quit immediately
    Quit,

    /// Connection status or inbound frame from the WebSocket channel
    Transport(TransportEvent),

    // ─────────────────────────────────────────────────────────
    // Composer
    // ─────────────────────────────────────────────────────────
    InputChar(char),
    InputBackspace,
    InputDelete,
    InputDeleteWord,
    InputLeft,
    InputRight,
    InputHome,
    InputEnd,

    /// Send whatever is in the composer and staging slot
    Submit,

    /// Replace the composer text and submit (headless mode)
    SubmitText { text: String },

    // ─────────────────────────────────────────────────────────
    // Attachments
    // ─────────────────────────────────────────────────────────
    /// Open the file path prompt
    OpenAttachPrompt,
    CancelAttachPrompt,
    /// Stage the path typed into the prompt
    ConfirmAttachPrompt,

    /// Read and stage a file
    StageAttachment { path: PathBuf },

    /// Background read finished
    AttachmentLoaded { file: AttachmentFile },

    /// Background read failed
    AttachmentLoadFailed { error: String },

    /// Drop the staged attachment
    RemoveAttachment,

    /// Base64 encoding of a submitted file finished; ready to send
    AttachmentEncoded {
        request_id: u64,
        filename: String,
        mime_type: String,
        data: String,
        text: String,
    },

    AttachmentEncodeFailed { request_id: u64, error: String },

    // ─────────────────────────────────────────────────────────
    // Conversations
    // ─────────────────────────────────────────────────────────
    SelectChat { index: usize },

    /// Ask for confirmation before deleting
    RequestDeleteChat { index: usize },
    ConfirmDelete,
    CancelDelete,

    /// Delete without confirmation (headless mode)
    DeleteChat { index: usize },

    NewChat,
    ClearAllChats,
    RefreshChats,

    ChatCursorUp,
    ChatCursorDown,

    /// Toggle focus between composer and chat list
    FocusNext,

    // ─────────────────────────────────────────────────────────
    // HTTP backend
    // ─────────────────────────────────────────────────────────
    HttpReplyReceived { request_id: u64, reply: String },
    HttpReplyFailed { request_id: u64, error: String },

    // ─────────────────────────────────────────────────────────
    // Scroll
    // ─────────────────────────────────────────────────────────
    ScrollUp,
    ScrollDown,
    PageUp,
    PageDown,
    ScrollToTop,
    ScrollToBottom,
}
