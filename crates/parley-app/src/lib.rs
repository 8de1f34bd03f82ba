//! parley-app - Application state and orchestration for Parley
//!
//! This crate implements the TEA (The Elm Architecture) pattern for the chat
//! session: state stores, the pure `update` function, and the action layer
//! that talks to the transport. Rendering lives in `parley-tui`.

pub mod actions;
pub mod attachment;
pub mod chat_list;
pub mod config;
pub mod handler;
pub mod input;
pub mod input_key;
pub mod message;
pub mod message_log;
pub mod pending;
pub mod process;
pub mod session;
pub mod state;

// Re-export primary types
pub use handler::{UpdateAction, UpdateResult};
pub use message::Message;
pub use session::ChatSession;
pub use state::AppState;
