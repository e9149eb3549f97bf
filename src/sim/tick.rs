//! Per-frame simulation step
//!
//! Advances particles and falling entities, resolves catches and misses and
//! applies life loss. Spawning is driven separately by the spawn timer.

use glam::Vec2;
use rand::Rng;

use super::state::{Color, EntityKind, FallingEntity, GameEvent, GamePhase, GameState, Particle};

/// What happened to an entity during the motion pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Caught { id: u32, kind: EntityKind },
    Escaped { id: u32, kind: EntityKind },
}

impl Outcome {
    fn id(&self) -> u32 {
        match *self {
            Outcome::Caught { id, .. } | Outcome::Escaped { id, .. } => id,
        }
    }
}

/// Advance the round by one frame of `dt_ms` milliseconds.
///
/// Does nothing unless the round is running. `dt_ms` is clamped to
/// `[0, tuning.max_frame_ms]`.
pub fn tick(state: &mut GameState, dt_ms: f32) {
    if state.phase != GamePhase::Running {
        return;
    }

    let dt_ms = if dt_ms.is_finite() {
        dt_ms.clamp(0.0, state.tuning.max_frame_ms)
    } else {
        0.0
    };
    state.round.elapsed_ms += dt_ms as f64;
    state.shake_ms = (state.shake_ms - dt_ms).max(0.0);

    advance_particles(&mut state.particles);

    let tuning = &state.tuning;
    let fall = tuning.base_fall_speed
        * state.round.difficulty(tuning)
        * state.round.speed_multiplier
        * (dt_ms / tuning.reference_frame_ms);
    let player_box = state.player.bounds();
    let bottom = tuning.field_height;

    // Move everything first, remove afterwards
    let mut outcomes = Vec::new();
    for entity in state.entities.iter_mut() {
        entity.pos.y += fall;
        if entity.bounds().overlaps(&player_box) {
            outcomes.push(Outcome::Caught {
                id: entity.id,
                kind: entity.kind,
            });
        } else if entity.pos.y > bottom {
            outcomes.push(Outcome::Escaped {
                id: entity.id,
                kind: entity.kind,
            });
        }
    }
    if outcomes.is_empty() {
        return;
    }
    state
        .entities
        .retain(|e| !outcomes.iter().any(|o| o.id() == e.id));

    for outcome in outcomes {
        resolve(state, outcome);
    }
}

/// Apply the gameplay effect of a catch or miss. Ignored once the round ended.
fn resolve(state: &mut GameState, outcome: Outcome) {
    if state.phase != GamePhase::Running {
        return;
    }
    let center = state.player.center();
    match outcome {
        Outcome::Caught {
            id,
            kind: EntityKind::Beneficial,
        } => {
            state.round.score += 1;
            state.events.push(GameEvent::Caught {
                id,
                kind: EntityKind::Beneficial,
            });
            state.events.push(GameEvent::ScoreChanged {
                score: state.round.score,
            });
            emit_burst(state, center, Color::POSITIVE);
        }
        Outcome::Caught {
            id,
            kind: EntityKind::Harmful,
        } => {
            state.events.push(GameEvent::Caught {
                id,
                kind: EntityKind::Harmful,
            });
            lose_life(state);
            emit_burst(state, center, Color::NEGATIVE);
            state.shake_ms = state.tuning.shake_ms;
        }
        Outcome::Escaped { id, kind } => {
            state.events.push(GameEvent::Missed { id });
            if kind == EntityKind::Beneficial {
                lose_life(state);
            }
        }
    }
}

/// Take a life; the last one ends the round
pub fn lose_life(state: &mut GameState) {
    let Some(remaining) = state.round.lose_life(&state.tuning) else {
        return;
    };
    state.events.push(GameEvent::LifeLost { remaining });
    log::debug!(
        "Life lost, {} left (speed x{})",
        remaining,
        state.round.speed_multiplier
    );
    if remaining == 0 {
        state.phase = GamePhase::GameOver;
        state.events.push(GameEvent::GameOver {
            score: state.round.score,
        });
    }
}

/// Spawn one entity at a random x along the top edge. Returns its id, or
/// `None` when the round is not running.
pub fn spawn_entity(state: &mut GameState) -> Option<u32> {
    if state.phase != GamePhase::Running {
        return None;
    }
    let size = state.tuning.entity_size;
    let span = state.tuning.field_width - size;
    let x = if span > 0.0 {
        state.rng.random_range(0.0..span)
    } else {
        0.0
    };
    let kind = if state.rng.random_bool(0.5) {
        EntityKind::Beneficial
    } else {
        EntityKind::Harmful
    };
    let glyph = state.rng.random_range(0..kind.glyphs().len());
    let id = state.next_entity_id();
    state.entities.push(FallingEntity {
        id,
        kind,
        glyph,
        pos: Vec2::new(x, -size),
        size,
    });
    state.events.push(GameEvent::Spawned { id, kind });
    Some(id)
}

/// Burst of particles around `origin`, limited by the particle cap
pub fn emit_burst(state: &mut GameState, origin: Vec2, color: Color) {
    let room = state.max_particles.saturating_sub(state.particles.len());
    let count = state.tuning.burst_size.min(room);
    let life = state.tuning.particle_life;
    for _ in 0..count {
        let vel = Vec2::new(
            state.rng.random_range(-2.0..2.0),
            state.rng.random_range(-2.0..2.0),
        );
        let size = state.rng.random_range(2.0..6.0);
        state.particles.push(Particle {
            pos: origin,
            vel,
            color,
            life,
            max_life: life,
            size,
        });
    }
}

/// Move particles one frame and drop the expired ones
pub fn advance_particles(particles: &mut Vec<Particle>) {
    for particle in particles.iter_mut() {
        particle.pos += particle.vel;
        particle.life = particle.life.saturating_sub(1);
    }
    particles.retain(|p| p.life > 0);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;

    fn running() -> GameState {
        let mut state = GameState::new(Tuning::default(), 12345);
        state.phase = GamePhase::Running;
        state
    }

    fn place(state: &mut GameState, kind: EntityKind, x: f32, y: f32) -> u32 {
        let id = state.next_entity_id();
        state.entities.push(FallingEntity {
            id,
            kind,
            glyph: 0,
            pos: Vec2::new(x, y),
            size: state.tuning.entity_size,
        });
        id
    }

    #[test]
    fn test_zero_dt_does_not_move() {
        let mut state = running();
        place(&mut state, EntityKind::Harmful, 0.0, 100.0);
        tick(&mut state, 0.0);
        assert_eq!(state.entities[0].pos.y, 100.0);
    }

    #[test]
    fn test_fall_distance_scales() {
        let mut state = running();
        place(&mut state, EntityKind::Harmful, 0.0, 0.0);
        tick(&mut state, 16.67);
        assert!((state.entities[0].pos.y - 2.5).abs() < 1e-4);

        let mut state = running();
        state.round.elapsed_ms = 10_000.0;
        state.round.speed_multiplier = 0.6;
        place(&mut state, EntityKind::Harmful, 0.0, 0.0);
        tick(&mut state, 16.67);
        assert!((state.entities[0].pos.y - 2.5 * 1.1 * 0.6).abs() < 1e-4);
    }

    #[test]
    fn test_frame_delta_is_clamped() {
        let mut state = running();
        place(&mut state, EntityKind::Harmful, 0.0, 0.0);
        tick(&mut state, 10_000.0);
        let expected = 2.5 * (100.0 / 16.67);
        assert!((state.entities[0].pos.y - expected).abs() < 1e-3);
        assert_eq!(state.round.elapsed_ms, 100.0);
    }

    #[test]
    fn test_catch_beneficial_scores() {
        let mut state = running();
        let id = place(&mut state, EntityKind::Beneficial, 210.0, 440.0);
        tick(&mut state, 0.0);
        assert_eq!(state.round.score, 1);
        assert_eq!(state.round.lives, 3);
        assert!(state.entities.is_empty());
        assert_eq!(state.particles.len(), 15);
        assert!(state.particles.iter().all(|p| p.color == Color::POSITIVE));
        assert_eq!(
            state.drain_events(),
            vec![
                GameEvent::Caught {
                    id,
                    kind: EntityKind::Beneficial
                },
                GameEvent::ScoreChanged { score: 1 },
            ]
        );
    }

    #[test]
    fn test_catch_harmful_costs_life_and_shakes() {
        let mut state = running();
        place(&mut state, EntityKind::Harmful, 210.0, 440.0);
        tick(&mut state, 0.0);
        assert_eq!(state.round.score, 0);
        assert_eq!(state.round.lives, 2);
        assert_eq!(state.round.speed_multiplier, 0.8);
        assert_eq!(state.shake_ms, 100.0);
        assert!(state.particles.iter().all(|p| p.color == Color::NEGATIVE));
    }

    #[test]
    fn test_missed_beneficial_costs_life_missed_harmful_does_not() {
        let mut state = running();
        place(&mut state, EntityKind::Harmful, 0.0, 501.0);
        tick(&mut state, 0.0);
        assert_eq!(state.round.lives, 3);
        assert!(state.entities.is_empty());

        place(&mut state, EntityKind::Beneficial, 0.0, 501.0);
        tick(&mut state, 0.0);
        assert_eq!(state.round.lives, 2);
        assert!(state.entities.is_empty());
    }

    #[test]
    fn test_entity_at_bottom_edge_stays() {
        let mut state = running();
        place(&mut state, EntityKind::Beneficial, 0.0, 500.0);
        tick(&mut state, 0.0);
        assert_eq!(state.entities.len(), 1);
    }

    #[test]
    fn test_adjacent_removals_in_one_frame() {
        let mut state = running();
        let keep = place(&mut state, EntityKind::Harmful, 0.0, 10.0);
        place(&mut state, EntityKind::Harmful, 0.0, 600.0);
        place(&mut state, EntityKind::Harmful, 50.0, 600.0);
        let last = place(&mut state, EntityKind::Harmful, 100.0, 20.0);
        tick(&mut state, 0.0);
        let ids: Vec<u32> = state.entities.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![keep, last]);
    }

    #[test]
    fn test_adjacent_expiring_particles_both_removed() {
        let particle = |life| Particle {
            pos: Vec2::ZERO,
            vel: Vec2::new(1.0, 0.0),
            color: Color::POSITIVE,
            life,
            max_life: 30,
            size: 2.0,
        };
        let mut particles = vec![particle(5), particle(1), particle(1), particle(3)];
        advance_particles(&mut particles);
        let lives: Vec<u32> = particles.iter().map(|p| p.life).collect();
        assert_eq!(lives, vec![4, 2]);
        assert!(particles.iter().all(|p| p.pos.x == 1.0));
    }

    #[test]
    fn test_last_life_ends_round_once() {
        let mut state = running();
        state.round.lives = 1;
        place(&mut state, EntityKind::Harmful, 210.0, 440.0);
        place(&mut state, EntityKind::Harmful, 215.0, 440.0);
        place(&mut state, EntityKind::Beneficial, 220.0, 440.0);
        tick(&mut state, 0.0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!(state.round.lives, 0);
        assert_eq!(state.round.score, 0);
        let events = state.drain_events();
        let overs = events
            .iter()
            .filter(|e| matches!(e, GameEvent::GameOver { .. }))
            .count();
        assert_eq!(overs, 1);

        // Further ticks are inert
        place(&mut state, EntityKind::Beneficial, 0.0, 600.0);
        tick(&mut state, 16.0);
        assert_eq!(state.entities.len(), 1);
        assert!(state.drain_events().is_empty());
    }

    #[test]
    fn test_spawn_at_top_within_field() {
        let mut state = running();
        let mut last = None;
        for _ in 0..200 {
            let id = spawn_entity(&mut state).expect("running");
            if let Some(prev) = last {
                assert!(id > prev);
            }
            last = Some(id);
        }
        for entity in &state.entities {
            assert!(entity.pos.x >= 0.0 && entity.pos.x < 460.0);
            assert_eq!(entity.pos.y, -40.0);
            assert!(entity.kind.glyphs().contains(&entity.glyph()));
        }
        assert!(state.entities.iter().any(|e| e.kind == EntityKind::Beneficial));
        assert!(state.entities.iter().any(|e| e.kind == EntityKind::Harmful));
    }

    #[test]
    fn test_spawn_requires_running() {
        let mut state = GameState::new(Tuning::default(), 1);
        assert_eq!(spawn_entity(&mut state), None);
        assert!(state.entities.is_empty());
    }

    #[test]
    fn test_particle_cap() {
        let mut state = running();
        state.max_particles = 20;
        emit_burst(&mut state, Vec2::ZERO, Color::POSITIVE);
        emit_burst(&mut state, Vec2::ZERO, Color::POSITIVE);
        assert_eq!(state.particles.len(), 20);
    }

    #[test]
    fn test_determinism() {
        let mut a = running();
        let mut b = running();
        for _ in 0..50 {
            spawn_entity(&mut a);
            spawn_entity(&mut b);
            tick(&mut a, 16.0);
            tick(&mut b, 16.0);
        }
        let pos_a: Vec<_> = a.entities.iter().map(|e| (e.id, e.pos)).collect();
        let pos_b: Vec<_> = b.entities.iter().map(|e| (e.id, e.pos)).collect();
        assert_eq!(pos_a, pos_b);
        assert_eq!(a.round, b.round);
    }
}
