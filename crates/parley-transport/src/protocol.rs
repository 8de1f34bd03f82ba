//! Wire protocol for the chat backend WebSocket.
//!
//! Outbound frames are JSON objects tagged by an `action` field; inbound
//! frames are JSON objects tagged by a `type` field. Either direction may
//! carry a `request_id`: the client attaches one to every user-initiated
//! request, and backends that echo it let replies be matched to requests.
//! Backends that do not echo it still work; their replies simply arrive
//! without correlation.
//!
//! Outbound:
//! ```json
//! {"action":"get_chats"}
//! {"action":"switch_chat","index":2,"request_id":7}
//! {"action":"send_file","filename":"photo.png","mimeType":"image/png","data":"iVBO...","text":""}
//! ```
//!
//! Inbound:
//! ```json
//! {"type":"chats","data":[{"title":"...","smart_title":null}]}
//! {"type":"chat_switched","messages":[{"role":"user","content":"..."}],"smart_title":"..."}
//! {"type":"new_message","role":"bot","content":"..."}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use parley_core::prelude::*;
use parley_core::types::null_as_default;
use parley_core::{ChatMessage, Conversation};

/// Name of the optional correlation field on both directions.
pub const REQUEST_ID_FIELD: &str = "request_id";

/// Inbound `type` values this client understands.
const KNOWN_EVENT_TYPES: &[&str] = &[
    "chats",
    "chat",
    "chat_switched",
    "new_message",
    "message_sent",
    "error",
];

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

/// A request the client sends to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum ClientAction {
    /// Ask for the conversation list (`chats` reply).
    GetChats,
    /// Ask for the backend's current conversation (`chat` reply).
    GetChat,
    /// Create a fresh conversation.
    NewChat,
    /// Delete every conversation.
    ClearAll,
    /// Make the conversation at `index` active (`chat_switched` reply).
    SwitchChat { index: usize },
    /// Delete the conversation at `index`.
    DeleteChat { index: usize },
    /// Send a text message to the active conversation.
    SendMessage { text: String },
    /// Send a file (base64 `data`) plus accompanying text.
    SendFile {
        filename: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
        data: String,
        text: String,
    },
}

impl ClientAction {
    /// The wire name of this action.
    pub fn name(&self) -> &'static str {
        match self {
            ClientAction::GetChats => "get_chats",
            ClientAction::GetChat => "get_chat",
            ClientAction::NewChat => "new_chat",
            ClientAction::ClearAll => "clear_all",
            ClientAction::SwitchChat { .. } => "switch_chat",
            ClientAction::DeleteChat { .. } => "delete_chat",
            ClientAction::SendMessage { .. } => "send_message",
            ClientAction::SendFile { .. } => "send_file",
        }
    }
}

/// An outbound action plus its optional correlation id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientRequest {
    pub action: ClientAction,
    pub request_id: Option<u64>,
}

impl ClientRequest {
    /// A request without a correlation id (e.g. the automatic `get_chats`).
    pub fn new(action: ClientAction) -> Self {
        Self {
            action,
            request_id: None,
        }
    }

    pub fn with_id(action: ClientAction, request_id: u64) -> Self {
        Self {
            action,
            request_id: Some(request_id),
        }
    }

    /// Serialize to the JSON text frame sent over the socket.
    pub fn to_json(&self) -> Result<String> {
        let mut value = serde_json::to_value(&self.action)?;
        if let (Some(id), Some(obj)) = (self.request_id, value.as_object_mut()) {
            obj.insert(REQUEST_ID_FIELD.to_string(), Value::from(id));
        }
        Ok(serde_json::to_string(&value)?)
    }
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// Full message-log snapshot for one conversation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ChatSnapshot {
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<ChatMessage>,
    /// Set when the backend has already generated a title for this chat.
    #[serde(default)]
    pub smart_title: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

impl ChatSnapshot {
    pub fn has_smart_title(&self) -> bool {
        self.smart_title
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }
}

/// An event pushed by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Conversation list snapshot; replaces the whole list.
    Chats {
        #[serde(default, deserialize_with = "null_as_default")]
        data: Vec<Conversation>,
    },
    /// Reply to `get_chat`.
    Chat(ChatSnapshot),
    /// Reply to `switch_chat`.
    ChatSwitched(ChatSnapshot),
    /// One message appended to the active conversation.
    NewMessage(ChatMessage),
    /// Backend echo of an uploaded user message.
    MessageSent(ChatMessage),
    /// Backend-side failure description.
    Error {
        #[serde(default, deserialize_with = "null_as_default")]
        message: String,
    },
}

impl ServerEvent {
    /// The wire `type` of this event.
    pub fn kind(&self) -> &'static str {
        match self {
            ServerEvent::Chats { .. } => "chats",
            ServerEvent::Chat(_) => "chat",
            ServerEvent::ChatSwitched(_) => "chat_switched",
            ServerEvent::NewMessage(_) => "new_message",
            ServerEvent::MessageSent(_) => "message_sent",
            ServerEvent::Error { .. } => "error",
        }
    }

    /// Whether this event counts as a reply that ends an "awaiting reply" wait.
    ///
    /// `message_sent` is only an upload acknowledgement; the actual reply
    /// follows as `new_message`.
    pub fn ends_wait(&self) -> bool {
        !matches!(self, ServerEvent::MessageSent(_))
    }
}

/// A parsed inbound event with its optional correlation id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundFrame {
    pub event: ServerEvent,
    pub request_id: Option<u64>,
}

/// The result of parsing one raw inbound text frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedFrame {
    /// A recognized event.
    Event(InboundFrame),
    /// Valid JSON with a `type` this client does not handle. Ignored.
    Unknown(String),
    /// Not valid JSON, or a known `type` with an invalid body.
    Malformed(String),
}

/// Parse a raw WebSocket text frame into a [`ParsedFrame`].
///
/// Dispatch logic:
/// - Not JSON, or JSON that is not an object → [`ParsedFrame::Malformed`].
/// - Missing or unrecognized `type` → [`ParsedFrame::Unknown`].
/// - Recognized `type` whose body fails to deserialize → [`ParsedFrame::Malformed`].
pub fn parse_server_frame(text: &str) -> ParsedFrame {
    let value: Value = match serde_json::from_str(text) {
        Ok(v) => v,
        Err(err) => return ParsedFrame::Malformed(format!("invalid JSON: {err}")),
    };

    if !value.is_object() {
        return ParsedFrame::Malformed("frame is not a JSON object".to_string());
    }

    let kind = value
        .get("type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    if !KNOWN_EVENT_TYPES.contains(&kind.as_str()) {
        return ParsedFrame::Unknown(kind);
    }

    let request_id = value.get(REQUEST_ID_FIELD).and_then(Value::as_u64);

    match serde_json::from_value::<ServerEvent>(value) {
        Ok(event) => ParsedFrame::Event(InboundFrame { event, request_id }),
        Err(err) => ParsedFrame::Malformed(format!("invalid '{kind}' event: {err}")),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
