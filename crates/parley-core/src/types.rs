//! Chat domain types shared by the transport, app, and TUI layers.
//!
//! These mirror what the backend pushes: the client never invents
//! conversations, it only holds the latest snapshot it was sent.

use serde::{Deserialize, Deserializer, Serialize};

/// Placeholder title for a conversation with neither a smart nor a raw title.
pub const DEFAULT_CHAT_TITLE: &str = "چت جدید";

/// Fixed reply rendered when an HTTP backend fails.
pub const UPSTREAM_APOLOGY: &str = "انگار مشکلی پیش اومده متاسفم دوست من!";

// ─────────────────────────────────────────────────────────────────────────────
// Role
// ─────────────────────────────────────────────────────────────────────────────

/// Author of a chat message.
///
/// Parsed leniently: any role string the client does not know is treated as
/// a bot reply, matching backends that omit or vary the field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum Role {
    User,
    #[default]
    Bot,
    /// Locally generated notice (backend `error` events, upstream failures).
    System,
}

impl From<String> for Role {
    fn from(value: String) -> Self {
        Role::from(value.as_str())
    }
}

impl From<&str> for Role {
    fn from(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "user" => Role::User,
            "system" => Role::System,
            _ => Role::Bot,
        }
    }
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Bot => "bot",
            Role::System => "system",
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────────────────────────────────────

/// Reference to a file that was sent with a message.
///
/// Only the filename survives in history; the bytes are never retained.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRef {
    pub filename: String,
    #[serde(
        default,
        rename = "mimeType",
        skip_serializing_if = "Option::is_none"
    )]
    pub mime_type: Option<String>,
}

impl FileRef {
    pub fn new(filename: impl Into<String>) -> Self {
        Self {
            filename: filename.into(),
            mime_type: None,
        }
    }
}

/// A single message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub role: Role,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<FileRef>,
}

impl ChatMessage {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            file: None,
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content)
    }

    pub fn bot(content: impl Into<String>) -> Self {
        Self::new(Role::Bot, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(Role::System, content)
    }

    pub fn with_file(mut self, file: FileRef) -> Self {
        self.file = Some(file);
        self
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Conversations
// ─────────────────────────────────────────────────────────────────────────────

/// One entry of the backend's conversation list.
///
/// Conversations carry no stable identifier: they are addressed by their
/// position in the snapshot they arrived in.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Conversation {
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default)]
    pub smart_title: Option<String>,
    /// Position reported by the backend, if any. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,
}

impl Conversation {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            smart_title: None,
            index: None,
        }
    }

    pub fn with_smart_title(mut self, smart_title: impl Into<String>) -> Self {
        self.smart_title = Some(smart_title.into());
        self
    }

    /// Smart title if present, else raw title, else [`DEFAULT_CHAT_TITLE`].
    ///
    /// Blank strings count as absent.
    pub fn display_title(&self) -> &str {
        self.smart_title
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| Some(self.title.as_str()).filter(|t| !t.trim().is_empty()))
            .unwrap_or(DEFAULT_CHAT_TITLE)
    }

    pub fn has_smart_title(&self) -> bool {
        self.smart_title
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }
}

/// Deserialize `null` as the type's default value.
///
/// Backends built on dynamic languages send `null` where a string or list is
/// expected; treat both `null` and a missing field the same way.
pub fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
