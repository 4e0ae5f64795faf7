use std::fs;
use std::io;
use std::path::Path;

use serde_json::{json, Value};

/// Persisted user preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub sound_enabled: bool,
}

#[derive(thiserror::Error, Debug)]
pub enum SettingsError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("settings root is not an object")]
    NotAnObject,
    #[error("`sound_enabled` is not a boolean")]
    SoundEnabledType,
}

impl Default for Settings {
    fn default() -> Self {
        Settings { sound_enabled: true }
    }
}

impl Settings {
    /// Load settings from `path`. A missing file yields the defaults; keys
    /// absent from the file keep their default value.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let mut settings = Settings::default();
        if !path.try_exists()? {
            return Ok(settings);
        }
        let text = fs::read_to_string(path)?;
        let root: Value = serde_json::from_str(&text)?;
        let obj = root.as_object().ok_or(SettingsError::NotAnObject)?;
        if let Some(v) = obj.get("sound_enabled") {
            settings.sound_enabled = v.as_bool().ok_or(SettingsError::SoundEnabledType)?;
        }
        Ok(settings)
    }

    /// Write settings as pretty JSON, creating parent directories.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), SettingsError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let root = json!({ "sound_enabled": self.sound_enabled });
        let mut text = serde_json::to_string_pretty(&root)?;
        text.push('\n');
        fs::write(path, text)?;
        Ok(())
    }

    pub fn toggle_sound(&mut self) {
        self.sound_enabled = !self.sound_enabled;
    }
}
