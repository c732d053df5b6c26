// SPDX-License-Identifier: GPL-3.0-only

use crate::backends::camera::types::{LensFacing, Rotation};
use crate::constants::{BitratePreset, media};
use crate::errors::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{error, info};

/// Current configuration schema version
pub const CONFIG_VERSION: u32 = 1;

/// Persistent settings, stored as JSON in `$XDG_CONFIG_HOME/viewfinder/config.json`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Schema version
    pub version: u32,
    /// Where stills and videos are written (None = app-specific files directory)
    pub media_dir: Option<PathBuf>,
    /// Which sensor the session binds to
    pub lens_facing: LensFacing,
    /// Accept external (USB) cameras when no sensor with the requested facing exists
    pub allow_external_fallback: bool,
    /// Rotation of the display the viewfinder is shown on
    pub display_rotation: Rotation,
    /// Record audio with video (requires microphone permission)
    pub record_audio: bool,
    /// Video encoder bitrate preset (Low, Medium, High)
    pub bitrate_preset: BitratePreset,
    /// JPEG quality for stills (1-100)
    pub jpeg_quality: u8,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            media_dir: None,
            lens_facing: LensFacing::Back,
            allow_external_fallback: true,
            display_rotation: Rotation::Deg0,
            record_audio: true,
            bitrate_preset: BitratePreset::default(),
            jpeg_quality: 92,
        }
    }
}

impl Config {
    /// Path of the config file
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(media::APP_DIR).join("config.json"))
    }

    /// Load the config, falling back to defaults on any error
    pub fn load() -> Self {
        let Some(path) = Self::path() else {
            error!("No config directory available, using defaults");
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(err) => {
                error!(%err, path = %path.display(), "Errors loading config");
                Self::default()
            }
        }
    }

    /// Load the config from a specific file
    pub fn load_from(path: &std::path::Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    /// Parse a config document; missing fields take their defaults
    pub fn from_json(json: &str) -> AppResult<Self> {
        let mut config: Config =
            serde_json::from_str(json).map_err(|e| AppError::Config(e.to_string()))?;
        config.jpeg_quality = config.jpeg_quality.clamp(1, 100);
        Ok(config)
    }

    /// Save the config to its default location
    pub fn save(&self) -> AppResult<()> {
        let path = Self::path().ok_or_else(|| AppError::Config("No config directory".into()))?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json =
            serde_json::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(&path, json)?;
        info!(path = %path.display(), "Config saved");
        Ok(())
    }

    /// Resolved media directory
    pub fn media_directory(&self) -> PathBuf {
        self.media_dir
            .clone()
            .unwrap_or_else(crate::storage::default_media_directory)
    }
}
