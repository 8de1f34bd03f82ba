//! # parley-core - Core Domain Types
//!
//! Foundation crate for Parley. Provides the chat domain types, the error
//! taxonomy shared by every layer, and logging setup.
//!
//! This crate has **zero internal dependencies** -- it only depends on external
//! crates (serde, thiserror, tracing).
//!
//! ## Public API
//!
//! ### Domain Types (`types`)
//! - [`Conversation`] - One entry of the backend's conversation list
//! - [`ChatMessage`] - A single message in the active conversation
//! - [`Role`] - Author of a message (user, bot, or a local system notice)
//! - [`FileRef`] - Filename reference attached to a message
//!
//! ### Error Handling (`error`)
//! - [`Error`] - Custom error enum with `fatal` vs `recoverable` classification
//! - [`Result`] - Type alias for `std::result::Result<T, Error>`
//! - [`ResultExt`] - Extension trait for adding error context
//!
//! ## Prelude
//!
//! Import commonly used types with:
//! ```rust
//! use parley_core::prelude::*;
//! ```

pub mod error;
pub mod logging;
pub mod prelude;
pub mod types;

pub use error::{Error, Result, ResultExt};
pub use types::{
    ChatMessage, Conversation, FileRef, Role, DEFAULT_CHAT_TITLE, UPSTREAM_APOLOGY,
};
