//! Settings loader for .parley/config.toml

use std::path::{Path, PathBuf};

use super::types::Settings;
use parley_core::prelude::*;

const CONFIG_FILENAME: &str = "config.toml";
const PARLEY_DIR: &str = ".parley";
const APP_NAME: &str = "parley";

/// Per-user config file, e.g. `~/.config/parley/config.toml`.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_NAME).join(CONFIG_FILENAME))
}

/// Load settings for a session started in `project_path`.
///
/// Looks for `.parley/config.toml` under `project_path` first, then the
/// per-user config file. Returns defaults when neither exists.
pub fn load_settings(project_path: &Path) -> Settings {
    let local = project_path.join(PARLEY_DIR).join(CONFIG_FILENAME);
    if local.exists() {
        return load_settings_from(&local);
    }

    match user_config_path() {
        Some(path) if path.exists() => load_settings_from(&path),
        _ => {
            debug!("No config file found, using defaults");
            Settings::default()
        }
    }
}

/// Load settings from an explicit file.
///
/// Read and parse failures are logged and yield defaults; the client
/// should still start against the default backend.
pub fn load_settings_from(config_path: &Path) -> Settings {
    if !config_path.exists() {
        warn!("Config file {:?} does not exist, using defaults", config_path);
        return Settings::default();
    }

    match std::fs::read_to_string(config_path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(settings) => {
                debug!("Loaded settings from {:?}", config_path);
                settings
            }
            Err(e) => {
                warn!("Failed to parse {:?}: {}", config_path, e);
                Settings::default()
            }
        },
        Err(e) => {
            warn!("Failed to read {:?}: {}", config_path, e);
            Settings::default()
        }
    }
}
