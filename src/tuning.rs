//! Data-driven game balance
//!
//! Every knob defaults to the value in [`crate::consts`]. A tuning file only
//! needs the fields it overrides.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading a tuning or settings document
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("{field} out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },
    #[error("player ({player}px) does not fit in a {field}px wide field")]
    PlayerTooWide { player: f32, field: f32 },
}

/// Game balance parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub field_width: f32,
    pub field_height: f32,

    pub player_start_x: f32,
    pub player_y: f32,
    pub player_size: f32,
    pub player_speed: f32,

    pub entity_size: f32,
    pub base_fall_speed: f32,
    pub reference_frame_ms: f32,
    pub difficulty_per_second: f32,
    pub max_frame_ms: f32,

    pub spawn_interval_ms: u32,

    pub starting_lives: u8,
    pub speed_at_two_lives: f32,
    pub speed_at_one_life: f32,

    pub burst_size: usize,
    pub particle_life: u32,

    pub shake_ms: f32,
    pub shake_offset: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            player_start_x: PLAYER_START_X,
            player_y: PLAYER_Y,
            player_size: PLAYER_SIZE,
            player_speed: PLAYER_SPEED,
            entity_size: ENTITY_SIZE,
            base_fall_speed: BASE_FALL_SPEED,
            reference_frame_ms: REFERENCE_FRAME_MS,
            difficulty_per_second: DIFFICULTY_PER_SECOND,
            max_frame_ms: MAX_FRAME_MS,
            spawn_interval_ms: SPAWN_INTERVAL_MS,
            starting_lives: STARTING_LIVES,
            speed_at_two_lives: SPEED_AT_TWO_LIVES,
            speed_at_one_life: SPEED_AT_ONE_LIFE,
            burst_size: BURST_SIZE,
            particle_life: PARTICLE_LIFE,
            shake_ms: SHAKE_MS,
            shake_offset: SHAKE_OFFSET,
        }
    }
}

impl Tuning {
    /// Parse and validate a tuning document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), ConfigError> {
        fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(ConfigError::OutOfRange {
                    field,
                    value: value as f64,
                })
            }
        }

        positive("field_width", self.field_width)?;
        positive("field_height", self.field_height)?;
        positive("player_size", self.player_size)?;
        positive("player_speed", self.player_speed)?;
        positive("entity_size", self.entity_size)?;
        positive("base_fall_speed", self.base_fall_speed)?;
        positive("reference_frame_ms", self.reference_frame_ms)?;
        positive("max_frame_ms", self.max_frame_ms)?;

        if self.player_size > self.field_width || self.entity_size >= self.field_width {
            return Err(ConfigError::PlayerTooWide {
                player: self.player_size.max(self.entity_size),
                field: self.field_width,
            });
        }
        if self.spawn_interval_ms == 0 {
            return Err(ConfigError::OutOfRange {
                field: "spawn_interval_ms",
                value: 0.0,
            });
        }
        if self.starting_lives == 0 {
            return Err(ConfigError::OutOfRange {
                field: "starting_lives",
                value: 0.0,
            });
        }
        if self.particle_life == 0 {
            return Err(ConfigError::OutOfRange {
                field: "particle_life",
                value: 0.0,
            });
        }
        if !self.difficulty_per_second.is_finite() || self.difficulty_per_second < 0.0 {
            return Err(ConfigError::OutOfRange {
                field: "difficulty_per_second",
                value: self.difficulty_per_second as f64,
            });
        }
        Ok(())
    }

    /// Largest x the player's left edge may take
    pub fn player_max_x(&self) -> f32 {
        self.field_width - self.player_size
    }
}
