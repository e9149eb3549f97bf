//! Carbon Catcher - catch eco-friendly items, dodge pollutants
//!
//! Core modules:
//! - `sim`: Round simulation (entities, particles, collisions, lives/score)
//! - `controller`: Round lifecycle and ownership of the frame/spawn tasks
//! - `input`: Keyboard mapping for player movement and basket modes
//! - `renderer`: Backend-independent draw lists (+ Canvas 2D backend on web)
//! - `platform`: Scheduling, key listeners and navigation abstraction
//! - `persistence`: Key-value storage and persisted counters (points ledger)
//! - `settings` / `tuning`: Player preferences and game balance

pub mod controller;
pub mod highscores;
pub mod input;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use controller::RoundController;
pub use highscores::HighScore;
pub use persistence::{KeyValueStore, MemoryStore, PersistedCounter, PointsLedger};
pub use settings::{QualityPreset, Settings};
pub use tuning::Tuning;

/// Game configuration constants (defaults for [`Tuning`])
pub mod consts {
    /// Play field dimensions (canvas pixels)
    pub const FIELD_WIDTH: f32 = 500.0;
    pub const FIELD_HEIGHT: f32 = 500.0;

    /// Player basket
    pub const PLAYER_START_X: f32 = 200.0;
    pub const PLAYER_Y: f32 = 450.0;
    pub const PLAYER_SIZE: f32 = 60.0;
    /// Pixels moved per key event
    pub const PLAYER_SPEED: f32 = 9.0;

    /// Falling entities are square
    pub const ENTITY_SIZE: f32 = 40.0;
    /// Fall speed in pixels per reference frame
    pub const BASE_FALL_SPEED: f32 = 2.5;
    /// Reference frame length (60 fps) used to normalize motion
    pub const REFERENCE_FRAME_MS: f32 = 16.67;
    /// Difficulty growth per whole second of round time
    pub const DIFFICULTY_PER_SECOND: f32 = 0.01;
    /// Largest frame delta fed to the simulation (tab switches, stalls)
    pub const MAX_FRAME_MS: f32 = 100.0;

    /// Milliseconds between entity spawns
    pub const SPAWN_INTERVAL_MS: u32 = 400;

    /// Lives at round start
    pub const STARTING_LIVES: u8 = 3;
    /// Fall speed multiplier once two lives remain
    pub const SPEED_AT_TWO_LIVES: f32 = 0.8;
    /// Fall speed multiplier once one life remains
    pub const SPEED_AT_ONE_LIFE: f32 = 0.6;

    /// Particles per collision burst
    pub const BURST_SIZE: usize = 15;
    /// Particle lifetime in frames
    pub const PARTICLE_LIFE: u32 = 30;

    /// Cosmetic shake after catching a harmful item
    pub const SHAKE_MS: f32 = 100.0;
    pub const SHAKE_OFFSET: f32 = 5.0;
}
