//! Configuration types for Parley
//!
//! Defines `Settings` and its sections. Every field has a default so a
//! partial (or empty) config file is valid.

use serde::{Deserialize, Serialize};

use parley_core::prelude::*;
use parley_transport::{PromptField, DEFAULT_MAX_RECONNECT_ATTEMPTS};

/// Default attachment size limit: 20 MiB.
pub const DEFAULT_MAX_ATTACHMENT_BYTES: u64 = 20 * 1024 * 1024;

/// Which kind of backend the session talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendMode {
    /// Persistent WebSocket with conversation list and history.
    #[default]
    Websocket,
    /// Stateless request/reply over HTTP POST.
    Http,
}

/// Global application settings from config.toml
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerSettings,

    #[serde(default)]
    pub attachments: AttachmentSettings,

    #[serde(default)]
    pub ui: UiSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerSettings {
    /// WebSocket URL of the chat backend
    #[serde(default = "default_url")]
    pub url: String,

    #[serde(default)]
    pub mode: BackendMode,

    /// POST endpoint used in HTTP mode
    #[serde(default = "default_http_endpoint")]
    pub http_endpoint: String,

    /// Body field carrying the user's text in HTTP mode
    #[serde(default)]
    pub http_field: PromptField,

    /// Reconnection attempts after the socket drops (0 disables)
    #[serde(default = "default_max_reconnect_attempts")]
    pub max_reconnect_attempts: u32,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            url: default_url(),
            mode: BackendMode::default(),
            http_endpoint: default_http_endpoint(),
            http_field: PromptField::default(),
            max_reconnect_attempts: default_max_reconnect_attempts(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct AttachmentSettings {
    /// Files larger than this are rejected before staging
    #[serde(default = "default_max_bytes")]
    pub max_bytes: u64,
}

impl Default for AttachmentSettings {
    fn default() -> Self {
        Self {
            max_bytes: default_max_bytes(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct UiSettings {
    /// Show the conversation list beside the log
    #[serde(default = "default_true")]
    pub show_sidebar: bool,

    /// Label rendered above user messages
    #[serde(default = "default_user_label")]
    pub user_label: String,

    /// Label rendered above bot messages
    #[serde(default = "default_bot_label")]
    pub bot_label: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            show_sidebar: true,
            user_label: default_user_label(),
            bot_label: default_bot_label(),
        }
    }
}

fn default_url() -> String {
    "ws://127.0.0.1:8000/ws".to_string()
}

fn default_http_endpoint() -> String {
    "http://127.0.0.1:8000/chat".to_string()
}

fn default_max_reconnect_attempts() -> u32 {
    DEFAULT_MAX_RECONNECT_ATTEMPTS
}

fn default_max_bytes() -> u64 {
    DEFAULT_MAX_ATTACHMENT_BYTES
}

fn default_true() -> bool {
    true
}

fn default_user_label() -> String {
    "شما".to_string()
}

fn default_bot_label() -> String {
    "مربی".to_string()
}

impl Settings {
    /// Reject settings the session cannot start with.
    ///
    /// # Errors
    ///
    /// [`Error::ConfigInvalid`] when the URL for the selected mode does not
    /// parse or uses the wrong scheme.
    pub fn validate(&self) -> Result<()> {
        match self.server.mode {
            BackendMode::Websocket => {
                check_url(&self.server.url, &["ws", "wss"])?;
            }
            BackendMode::Http => {
                check_url(&self.server.http_endpoint, &["http", "https"])?;
            }
        }
        if self.attachments.max_bytes == 0 {
            return Err(Error::config_invalid("attachments.max_bytes must be > 0"));
        }
        Ok(())
    }

    pub fn is_http(&self) -> bool {
        self.server.mode == BackendMode::Http
    }
}

fn check_url(raw: &str, schemes: &[&str]) -> Result<()> {
    let parsed = url::Url::parse(raw)
        .map_err(|e| Error::config_invalid(format!("invalid URL '{raw}': {e}")))?;
    if !schemes.contains(&parsed.scheme()) {
        return Err(Error::config_invalid(format!(
            "URL '{raw}' must use one of: {}",
            schemes.join(", ")
        )));
    }
    Ok(())
}
