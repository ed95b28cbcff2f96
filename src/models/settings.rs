//! Gameplay settings loaded from TOML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Failure while loading or saving settings.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(toml::de::Error),
    Serialize(toml::ser::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Settings I/O error: {}", e),
            ConfigError::Parse(e) => write!(f, "Invalid settings file: {}", e),
            ConfigError::Serialize(e) => write!(f, "Failed to serialize settings: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Tunables of the judgement engine that are not part of the chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameplaySettings {
    /// Time after the last object's end before the run is over (ms).
    pub end_grace_ms: f64,
    /// Score awarded for every full spinner revolution.
    pub spinner_spin_bonus: u32,
    /// Slider follow radius as a multiple of the circle radius.
    pub slider_capture_factor: f64,
    /// Whether pointer motion is appended to the replay.
    pub record_motion: bool,
    /// Nominal frame length HP drain is normalized to (ms).
    pub frame_ms: f64,
    /// Clock start offset before chart time 0 (ms).
    pub lead_in_ms: f64,
}

impl Default for GameplaySettings {
    fn default() -> Self {
        Self {
            end_grace_ms: 2000.0,
            spinner_spin_bonus: 1000,
            slider_capture_factor: 2.5,
            record_motion: true,
            frame_ms: 1000.0 / 60.0,
            lead_in_ms: 0.0,
        }
    }
}

impl GameplaySettings {
    /// Loads settings, falling back to defaults when the file does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("CONFIG: {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
        toml::from_str(&content).map_err(|e| {
            log::error!("CONFIG: Failed to parse {:?}: {}", path, e);
            ConfigError::Parse(e)
        })
    }

    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        fs::write(path, content).map_err(ConfigError::Io)
    }
}
