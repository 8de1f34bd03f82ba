//! Configuration file parsing for Parley
//!
//! Supports:
//! - `.parley/config.toml` in the working directory
//! - `<config dir>/parley/config.toml` (e.g. `~/.config/parley/config.toml`)
//!
//! The first file found wins; missing or invalid files fall back to defaults.

pub mod settings;
pub mod types;

pub use settings::{load_settings, load_settings_from, user_config_path};
pub use types::*;
