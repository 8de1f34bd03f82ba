//! # parley-transport - Chat Backend Transports
//!
//! Owns the wire: the persistent WebSocket connection to a chat backend and
//! the plain HTTP request/reply variant used by simpler backends.
//!
//! Depends on [`parley_core`] for domain types and error handling.
//!
//! ## Public API
//!
//! ### Wire Protocol (`protocol`)
//! - [`ClientAction`] - Outbound `action`-tagged requests
//! - [`ClientRequest`] - An action plus its optional correlation id
//! - [`ServerEvent`] - Inbound `type`-tagged events
//! - [`parse_server_frame()`] - Parse one inbound text frame
//!
//! ### WebSocket Channel (`client`)
//! - [`ChatClient`] - Connects and spawns the background I/O task
//! - [`ChannelHandle`] - Clonable, non-blocking sender for [`ClientRequest`]s
//! - [`TransportEvent`] - Frames and connection status delivered to the app
//!
//! ### HTTP Variant (`http`)
//! - [`PromptClient`] - `POST {message|prompt}` -> `{reply|response}`
//! - [`ReplyBackend`] - Async trait seam over request/reply backends

pub mod client;
pub mod http;
pub mod protocol;

pub use client::{
    ChannelHandle, ChatClient, ConnectOptions, ConnectionState, TransportEvent,
    DEFAULT_MAX_RECONNECT_ATTEMPTS,
};
#[cfg(any(test, feature = "test-helpers"))]
pub use client::SentRequests;
pub use http::{LocalReplyBackend, PromptClient, PromptField, ReplyBackend};
pub use protocol::{
    parse_server_frame, ChatSnapshot, ClientAction, ClientRequest, InboundFrame, ParsedFrame,
    ServerEvent,
};
