//! Persistent settings
//!
//! Optional TOML settings file with the knobs that are not per-run: the stop
//! key, the input poll interval and the timeout notification. CLI arguments
//! always describe the run itself; these settings only change defaults.
//!
//! Locations: `~/.config/ethocount/config.toml` on Linux,
//! `~/Library/Application Support/ethocount/config.toml` on macOS,
//! `%APPDATA%\ethocount\config.toml` on Windows.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not determine config directory")]
    NoConfigDir,
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Returns the path to the settings file, creating the app config directory
/// if needed.
pub fn config_path() -> Result<PathBuf, SettingsError> {
    let config_dir = dirs::config_dir().ok_or(SettingsError::NoConfigDir)?;
    let app_dir = config_dir.join("ethocount");
    if !app_dir.exists() {
        fs::create_dir_all(&app_dir)?;
    }
    Ok(app_dir.join("config.toml"))
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    pub capture: CaptureSettings,
    pub feedback: FeedbackSettings,
}

/// Capture loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureSettings {
    /// Key that ends the session manually (case-sensitive).
    pub stop_key: char,
    /// Input poll interval in milliseconds.
    pub poll_interval_ms: u64,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            stop_key: 'P',
            poll_interval_ms: 10,
        }
    }
}

/// Timeout notification settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedbackSettings {
    /// Ring the terminal bell when the observation time runs out.
    pub bell_on_timeout: bool,
    /// Flash the notice in reverse video when the observation time runs out.
    pub flash_on_timeout: bool,
}

impl Default for FeedbackSettings {
    fn default() -> Self {
        Self {
            bell_on_timeout: true,
            flash_on_timeout: true,
        }
    }
}

impl Settings {
    /// Load settings from the default file, falling back to defaults when the
    /// file does not exist.
    pub fn load() -> Result<Self, SettingsError> {
        let path = config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load settings from a specific path.
    pub fn load_from(path: &PathBuf) -> Result<Self, SettingsError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &PathBuf) -> Result<(), SettingsError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.capture.poll_interval_ms)
    }
}
