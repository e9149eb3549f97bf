//! Keyboard input
//!
//! Arrow keys nudge the basket by its speed (key repeat gives continuous
//! movement), number keys pick the basket style.

use crate::sim::{GameState, PlayerMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Left,
    Right,
    Mode(PlayerMode),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value
    pub fn from_dom(key: &str) -> Option<Key> {
        match key {
            "ArrowLeft" => Some(Key::Left),
            "ArrowRight" => Some(Key::Right),
            "1" => Some(Key::Mode(PlayerMode::Tree)),
            "2" => Some(Key::Mode(PlayerMode::Solar)),
            "3" => Some(Key::Mode(PlayerMode::Turbine)),
            _ => None,
        }
    }
}

/// Apply a key press to the player
pub fn apply_key(state: &mut GameState, key: Key) {
    let max_x = state.tuning.player_max_x();
    match key {
        Key::Left => state.player.step(-1.0, max_x),
        Key::Right => state.player.step(1.0, max_x),
        Key::Mode(mode) => state.player.mode = mode,
    }
}
