//! Persisted frontend settings: window scale and audio volume. Stored as
//! TOML in the platform config directory, read at startup and written
//! back on exit so command-line flags only need to override, not repeat,
//! the user's last choice.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct Settings {
    pub scale: u32,
    pub volume: f32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            scale: 2,
            volume: 1.0,
        }
    }
}

fn settings_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("v32").join("settings.toml"))
}

impl Settings {
    /// Loads settings from the platform config directory, falling back
    /// to defaults if the file is missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = settings_path() else {
            return Settings::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(text) => toml::from_str(&text).unwrap_or_default(),
            Err(_) => Settings::default(),
        }
    }

    /// Writes settings back to the platform config directory, creating
    /// it if necessary. Failures are non-fatal: losing the settings file
    /// just means the next run starts from defaults again.
    pub fn save(&self) {
        let Some(path) = settings_path() else {
            return;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        if let Ok(text) = toml::to_string_pretty(self) {
            let _ = std::fs::write(&path, text);
        }
    }
}
