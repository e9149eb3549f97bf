//! Game settings and preferences
//!
//! Persisted as JSON alongside the counters in local storage.

use serde::{Deserialize, Serialize};

use crate::persistence::KeyValueStore;
use crate::tuning::ConfigError;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    /// Maximum live particles for this preset
    pub fn max_particles(&self) -> usize {
        match self {
            QualityPreset::Low => 45,
            QualityPreset::Medium => 150,
            QualityPreset::High => 600,
        }
    }

    /// Whether entities and the player get drop shadows
    pub fn shadows_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Graphics quality preset
    pub quality: QualityPreset,
    /// Canvas shake when a pollutant is caught
    pub screen_shake: bool,
    /// Particle bursts on catches
    pub particles: bool,
    /// Reduced motion (suppresses shake)
    pub reduced_motion: bool,
    /// Show the how-to-play panel while idle
    pub show_tutorial: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            quality: QualityPreset::Medium,
            screen_shake: true,
            particles: true,
            reduced_motion: false,
            show_tutorial: true,
        }
    }
}

impl Settings {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "carbonGameSettings";

    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Effective particle count cap
    pub fn max_particles(&self) -> usize {
        if !self.particles {
            0
        } else {
            self.quality.max_particles()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load settings, falling back to defaults on a missing or broken entry
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get_item(Self::STORAGE_KEY) {
            Ok(Some(json)) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    settings
                }
                Err(e) => {
                    log::warn!("Discarding stored settings: {}", e);
                    Self::default()
                }
            },
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Could not read settings: {}", e);
                Self::default()
            }
        }
    }

    pub fn save(&self, store: &dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => match store.set_item(Self::STORAGE_KEY, &json) {
                Ok(()) => log::info!("Settings saved"),
                Err(e) => log::warn!("Could not save settings: {}", e),
            },
            Err(e) => log::warn!("Could not encode settings: {}", e),
        }
    }
}
