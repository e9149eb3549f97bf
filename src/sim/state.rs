//! Game state and core simulation types
//!
//! Everything a round mutates lives in [`GameState`]: the player, the falling
//! entities, the cosmetic particles and the lives/score bookkeeping.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::Aabb;
use crate::tuning::Tuning;

/// Current phase of a round
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// No round in progress (tutorial may be showing)
    Idle,
    /// Frame loop and spawner active
    Running,
    /// Frozen in place, timers cancelled
    Paused,
    /// Lives ran out
    GameOver,
}

/// An RGBA colour (alpha 0-1)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f32,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// CSS `rgba(...)` string
    pub fn css(&self) -> String {
        format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
    }

    pub const POSITIVE: Color = Color::rgb(0x00, 0xFF, 0x00);
    pub const NEGATIVE: Color = Color::rgb(0xFF, 0x00, 0x00);
}

/// Cosmetic basket style (rendering only)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayerMode {
    #[default]
    Tree,
    Solar,
    Turbine,
}

impl PlayerMode {
    pub const ALL: [PlayerMode; 3] = [PlayerMode::Tree, PlayerMode::Solar, PlayerMode::Turbine];

    pub fn glyph(&self) -> &'static str {
        match self {
            PlayerMode::Tree => "🌳",
            PlayerMode::Solar => "☀",
            PlayerMode::Turbine => "🌬",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            PlayerMode::Tree => "Tree",
            PlayerMode::Solar => "Solar",
            PlayerMode::Turbine => "Turbine",
        }
    }

    pub fn fill(&self) -> Color {
        match self {
            PlayerMode::Tree => Color::rgba(50, 205, 50, 0.8),
            PlayerMode::Solar => Color::rgba(255, 215, 0, 0.8),
            PlayerMode::Turbine => Color::rgba(100, 149, 237, 0.8),
        }
    }
}

/// The player's basket
#[derive(Debug, Clone)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub size: f32,
    /// Pixels per key press
    pub speed: f32,
    pub mode: PlayerMode,
}

impl Player {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            pos: Vec2::new(tuning.player_start_x, tuning.player_y),
            size: tuning.player_size,
            speed: tuning.player_speed,
            mode: PlayerMode::default(),
        }
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::splat(self.size))
    }

    pub fn center(&self) -> Vec2 {
        self.pos + Vec2::splat(self.size / 2.0)
    }

    /// Move horizontally by `steps` speed units, clamped to `[0, max_x]`
    pub fn step(&mut self, steps: f32, max_x: f32) {
        self.pos.x = (self.pos.x + steps * self.speed).clamp(0.0, max_x.max(0.0));
    }
}

/// Falling entity categories
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    /// Eco-friendly: catch for a point, missing it costs a life
    Beneficial,
    /// Pollutant: catching it costs a life
    Harmful,
}

impl EntityKind {
    pub fn glyphs(&self) -> &'static [&'static str] {
        match self {
            EntityKind::Beneficial => &["♻", "🚴", "☀", "🌳"],
            EntityKind::Harmful => &["🏭", "🛍", "🚗", "✈️"],
        }
    }
}

/// An object falling from the top of the field
#[derive(Debug, Clone)]
pub struct FallingEntity {
    pub id: u32,
    pub kind: EntityKind,
    /// Index into `kind.glyphs()`
    pub glyph: usize,
    /// Top-left corner
    pub pos: Vec2,
    pub size: f32,
}

impl FallingEntity {
    pub fn glyph(&self) -> &'static str {
        let glyphs = self.kind.glyphs();
        glyphs[self.glyph % glyphs.len()]
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::new(self.pos, Vec2::splat(self.size))
    }
}

/// A particle for visual effects
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    /// Pixels per frame
    pub vel: Vec2,
    pub color: Color,
    /// Frames left
    pub life: u32,
    pub max_life: u32,
    pub size: f32,
}

impl Particle {
    /// Opacity proportional to remaining life
    pub fn alpha(&self) -> f32 {
        if self.max_life == 0 {
            0.0
        } else {
            self.life as f32 / self.max_life as f32
        }
    }
}

/// Lives/score bookkeeping for one round
#[derive(Debug, Clone, PartialEq)]
pub struct RoundState {
    pub score: u64,
    pub lives: u8,
    /// Simulated time in the round (excludes pauses)
    pub elapsed_ms: f64,
    /// Fall speed scale, lowered as lives are lost
    pub speed_multiplier: f32,
    /// Points for this round have been handed to the ledger
    pub completed: bool,
}

impl RoundState {
    pub fn new(tuning: &Tuning) -> Self {
        Self {
            score: 0,
            lives: tuning.starting_lives,
            elapsed_ms: 0.0,
            speed_multiplier: 1.0,
            completed: false,
        }
    }

    /// Whole seconds played
    pub fn elapsed_secs(&self) -> u64 {
        (self.elapsed_ms / 1000.0) as u64
    }

    /// Time-based difficulty; grows by a fixed step per whole second
    pub fn difficulty(&self, tuning: &Tuning) -> f32 {
        1.0 + self.elapsed_secs() as f32 * tuning.difficulty_per_second
    }

    /// Take one life and apply the rubber-band slowdown.
    ///
    /// Returns the lives left, or `None` when there were none to lose.
    pub fn lose_life(&mut self, tuning: &Tuning) -> Option<u8> {
        if self.lives == 0 {
            return None;
        }
        self.lives -= 1;
        match self.lives {
            2 => self.speed_multiplier = tuning.speed_at_two_lives,
            1 => self.speed_multiplier = tuning.speed_at_one_life,
            _ => {}
        }
        Some(self.lives)
    }
}

/// Things that happened during a tick, drained by the controller
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Spawned { id: u32, kind: EntityKind },
    Caught { id: u32, kind: EntityKind },
    Missed { id: u32 },
    ScoreChanged { score: u64 },
    LifeLost { remaining: u8 },
    GameOver { score: u64 },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    pub tuning: Tuning,
    pub phase: GamePhase,
    pub round: RoundState,
    pub player: Player,
    /// Live falling entities (spawn order = id order)
    pub entities: Vec<FallingEntity>,
    /// Visual particles (not gameplay-affecting)
    pub particles: Vec<Particle>,
    /// Particle cap from settings
    pub max_particles: usize,
    /// Remaining cosmetic shake
    pub shake_ms: f32,
    /// Events since the last drain
    pub events: Vec<GameEvent>,
    pub rng: Pcg32,
    /// Next entity ID (never reset, ids stay unique across rounds)
    next_id: u32,
}

impl GameState {
    pub fn new(tuning: Tuning, seed: u64) -> Self {
        Self {
            phase: GamePhase::Idle,
            round: RoundState::new(&tuning),
            player: Player::new(&tuning),
            entities: Vec::new(),
            particles: Vec::new(),
            max_particles: usize::MAX,
            shake_ms: 0.0,
            events: Vec::new(),
            rng: Pcg32::seed_from_u64(seed),
            next_id: 0,
            tuning,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Zero the round: score, lives, speed, entities, particles, player x.
    /// The basket mode is a preference and survives.
    pub fn reset(&mut self) {
        self.phase = GamePhase::Idle;
        self.round = RoundState::new(&self.tuning);
        self.player.pos = Vec2::new(self.tuning.player_start_x, self.tuning.player_y);
        self.entities.clear();
        self.particles.clear();
        self.shake_ms = 0.0;
        self.events.clear();
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
