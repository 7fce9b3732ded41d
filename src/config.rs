use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use pastebox_core::view::{DEFAULT_IMAGE_PLACEHOLDER, DEFAULT_TEXT_PLACEHOLDER};
use pastebox_core::Placeholders;

/// Presentation preferences. Never holds pasted content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub text_placeholder: String,
    pub image_placeholder: String,
    pub log_level: String,
    /// Relative paths typed into the file chooser resolve against this.
    pub chooser_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            text_placeholder: DEFAULT_TEXT_PLACEHOLDER.to_string(),
            image_placeholder: DEFAULT_IMAGE_PLACEHOLDER.to_string(),
            log_level: "warn".to_string(),
            chooser_dir: None,
        }
    }
}

impl Settings {
    pub fn placeholders(&self) -> Placeholders {
        Placeholders {
            text: self.text_placeholder.clone(),
            image: self.image_placeholder.clone(),
        }
    }
}

pub fn parse_level(level: &str) -> Result<tracing::Level> {
    level
        .parse()
        .with_context(|| format!("invalid log level: {:?}", level))
}

/// Settings file location and persistence.
pub struct SettingsStore {
    base_dir: PathBuf,
}

impl SettingsStore {
    pub fn new(base_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&base_dir)
            .with_context(|| format!("failed to create config dir: {:?}", base_dir))?;
        Ok(Self { base_dir })
    }

    /// Default store location.
    pub fn default_location() -> Result<Self> {
        let dir = directories::ProjectDirs::from("com", "pastebox", "Pastebox")
            .context("could not determine config directory")?;
        Self::new(dir.config_dir().to_path_buf())
    }

    pub fn path(&self) -> PathBuf {
        self.base_dir.join("settings.json")
    }

    /// Load settings, falling back to defaults when none were saved.
    pub fn load(&self) -> Result<Settings> {
        let path = self.path();
        if !path.exists() {
            return Ok(Settings::default());
        }
        let data =
            fs::read_to_string(&path).with_context(|| format!("failed to read {:?}", path))?;
        let settings =
            serde_json::from_str(&data).with_context(|| format!("failed to parse {:?}", path))?;
        Ok(settings)
    }

    pub fn save(&self, settings: &Settings) -> Result<()> {
        let json = serde_json::to_string_pretty(settings)?;
        fs::write(self.path(), json)?;
        Ok(())
    }
}
