//! Round simulation module
//!
//! All gameplay logic lives here. This module must stay platform-free:
//! - Caller supplies frame deltas (no clocks)
//! - Seeded RNG only
//! - Stable iteration order (entities by spawn id)
//! - No rendering or platform dependencies

pub mod collision;
pub mod state;
pub mod tick;

pub use collision::Aabb;
pub use state::{
    Color, EntityKind, FallingEntity, GameEvent, GamePhase, GameState, Particle, Player,
    PlayerMode, RoundState,
};
pub use tick::{advance_particles, emit_burst, lose_life, spawn_entity, tick};
