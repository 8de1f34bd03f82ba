//! Handler module - TEA update function and event handlers
//!
//! Organized into submodules:
//! - `update`: Main update() function and message dispatch
//! - `keys`: Key event handlers for UI modes
//! - `transport`: Inbound frames and connection status
//! - `submit`: Composing and dispatching user submissions
//! - `chats`: Conversation list actions

pub(crate) mod chats;
pub(crate) mod keys;
pub(crate) mod submit;
pub(crate) mod transport;
pub(crate) mod update;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use crate::attachment::AttachmentFile;
use crate::message::Message;
use parley_transport::ClientRequest;

// Re-export main entry point
pub use update::update;

#[cfg(test)]
pub(crate) use keys::handle_key;

/// Actions that the event loop should perform after update
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateAction {
    /// Queue a request on the WebSocket channel
    Send(ClientRequest),

    /// Read a file from disk for staging (blocking I/O, run off the loop)
    LoadAttachment { path: PathBuf, max_bytes: u64 },

    /// Base64-encode a submitted file, then send it as `send_file`
    EncodeAndSendFile {
        request_id: u64,
        file: AttachmentFile,
        text: String,
    },

    /// Ask the HTTP backend for a reply
    AskHttp { request_id: u64, text: String },
}

/// Result of processing a message
#[derive(Debug, Default)]
pub struct UpdateResult {
    /// Optional follow-up message to process
    pub message: Option<Message>,
    /// Optional action for the event loop to perform
    pub action: Option<UpdateAction>,
}

impl UpdateResult {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn message(msg: Message) -> Self {
        Self {
            message: Some(msg),
            action: None,
        }
    }

    pub fn action(action: UpdateAction) -> Self {
        Self {
            message: None,
            action: Some(action),
        }
    }

    /// Shorthand for queueing one request on the channel.
    pub fn send(request: ClientRequest) -> Self {
        Self::action(UpdateAction::Send(request))
    }
}
