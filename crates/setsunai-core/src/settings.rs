//! Application settings management
//!
//! Stores non-sensitive configuration in a plain JSON file next to the note
//! store. Missing files and missing fields fall back to defaults.
//!
//! The PBKDF2 iteration count is not a setting. Changing it makes every
//! existing envelope unopenable.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{NotesError, Result};

const SETTINGS_VERSION: u32 = 1;

/// Application settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Settings file version
    pub version: u32,
    /// Where the file store keeps its data (defaults to the platform data dir)
    pub data_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            data_dir: None,
        }
    }
}

/// Settings manager
pub struct SettingsManager {
    settings_file: PathBuf,
    settings: Settings,
}

impl SettingsManager {
    /// Load settings from `settings.json` in `dir`, or use defaults
    pub fn new(dir: &Path) -> Result<Self> {
        let settings_file = dir.join("settings.json");
        let settings = Self::load_from_file(&settings_file)?;

        Ok(Self {
            settings_file,
            settings,
        })
    }

    fn load_from_file(path: &Path) -> Result<Settings> {
        if !path.exists() {
            debug!("No settings file found, using defaults");
            return Ok(Settings::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&contents)?;
        if settings.version != SETTINGS_VERSION {
            return Err(NotesError::MalformedRecord(format!(
                "Unsupported settings version: {}",
                settings.version
            )));
        }

        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// Save settings to file
    pub async fn save(&self) -> Result<()> {
        let contents = serde_json::to_string_pretty(&self.settings)?;

        if let Some(parent) = self.settings_file.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write atomically using temp file
        let temp_path = self.settings_file.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents).await?;
        tokio::fs::rename(&temp_path, &self.settings_file).await?;

        debug!("Saved settings to {:?}", self.settings_file);
        Ok(())
    }

    /// Get current settings
    pub fn get(&self) -> &Settings {
        &self.settings
    }

    /// Update settings and save
    pub async fn update(&mut self, settings: Settings) -> Result<()> {
        self.settings = settings;
        self.save().await
    }
}
