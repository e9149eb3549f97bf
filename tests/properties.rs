use std::cell::RefCell;
use std::rc::Rc;

use carbon_catcher::Tuning;
use carbon_catcher::controller::{RoundController, RoundEvent};
use carbon_catcher::input::Key;
use carbon_catcher::persistence::{MemoryStore, PointsLedger};
use carbon_catcher::platform::ManualPlatform;
use carbon_catcher::sim::{EntityKind, FallingEntity, GamePhase, PlayerMode};
use glam::Vec2;
use proptest::prelude::*;

#[derive(Debug, Clone, Copy)]
enum Op {
    Frame(u8),
    CatchGood,
    CatchBad,
    MissGood,
    MissBad,
    Key(Key),
    Pause,
    Resume,
    Exit,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (1u8..50).prop_map(Op::Frame),
        3 => Just(Op::CatchGood),
        2 => Just(Op::CatchBad),
        2 => Just(Op::MissGood),
        1 => Just(Op::MissBad),
        2 => prop_oneof![
            Just(Key::Left),
            Just(Key::Right),
            Just(Key::Mode(PlayerMode::Solar)),
        ]
        .prop_map(Op::Key),
        1 => Just(Op::Pause),
        1 => Just(Op::Resume),
        1 => Just(Op::Exit),
    ]
}

fn game() -> RoundController<ManualPlatform> {
    let store = Rc::new(MemoryStore::new());
    let ledger = Rc::new(RefCell::new(PointsLedger::load(store.clone())));
    // The spawner stays quiet so every catch and miss is scripted
    let tuning = Tuning {
        spawn_interval_ms: 1_000_000,
        ..Tuning::default()
    };
    RoundController::new(ManualPlatform::new(), tuning, 7, store, ledger)
}

fn place(game: &mut RoundController<ManualPlatform>, kind: EntityKind, pos: Vec2) {
    let state = game.state_mut();
    let id = state.next_entity_id();
    let size = state.tuning.entity_size;
    state.entities.push(FallingEntity {
        id,
        kind,
        glyph: 0,
        pos,
        size,
    });
}

fn frame(game: &mut RoundController<ManualPlatform>, ms: f64) {
    let wakes = game.platform_mut().advance(ms);
    for wake in wakes {
        game.handle(wake);
    }
}

fn apply(game: &mut RoundController<ManualPlatform>, op: Op) {
    let running = game.phase() == GamePhase::Running;
    let player = game.state().player.pos;
    let away_x = if player.x > 100.0 { 0.0 } else { 400.0 };
    match op {
        Op::Frame(ms) => frame(game, ms as f64),
        Op::CatchGood if running => {
            place(game, EntityKind::Beneficial, player + Vec2::new(10.0, -5.0));
            frame(game, 16.0);
        }
        Op::CatchBad if running => {
            place(game, EntityKind::Harmful, player + Vec2::new(10.0, -5.0));
            frame(game, 16.0);
        }
        Op::MissGood if running => {
            place(game, EntityKind::Beneficial, Vec2::new(away_x, 520.0));
            frame(game, 16.0);
        }
        Op::MissBad if running => {
            place(game, EntityKind::Harmful, Vec2::new(away_x, 520.0));
            frame(game, 16.0);
        }
        Op::CatchGood | Op::CatchBad | Op::MissGood | Op::MissBad => frame(game, 16.0),
        Op::Key(key) => {
            if let Some(wake) = game.platform().press(key) {
                game.handle(wake);
            }
        }
        Op::Pause => game.pause(),
        Op::Resume => game.resume(),
        Op::Exit => game.exit(),
    }
}

proptest! {
    #[test]
    fn round_invariants_hold(ops in proptest::collection::vec(op(), 0..80)) {
        let mut game = game();
        game.start();
        frame(&mut game, 16.0);

        let mut last_lives = game.state().round.lives;
        let mut last_score = 0u64;
        let mut max_score = 0u64;
        let mut awards = Vec::new();
        let mut game_overs = 0;

        for op in ops {
            apply(&mut game, op);
            let round = &game.state().round;

            prop_assert!(round.lives <= last_lives, "lives went up");
            prop_assert!(round.score >= last_score, "score went down");
            prop_assert!(round.score <= last_score + 1, "score jumped");
            prop_assert_eq!(round.lives == 0, game.phase() == GamePhase::GameOver);
            last_lives = round.lives;
            last_score = round.score;
            max_score = max_score.max(round.score);

            let x = game.state().player.pos.x;
            prop_assert!((0.0..=440.0).contains(&x));
            prop_assert!(game.high_score() >= max_score);

            let p = game.platform();
            prop_assert!(p.pending_frames() <= 1);
            prop_assert!(p.active_intervals() <= 1);
            prop_assert!(p.key_listeners() <= 1);
            if game.phase() != GamePhase::Running {
                prop_assert_eq!(p.pending_frames() + p.active_intervals() + p.key_listeners(), 0);
            }

            for event in game.drain_events() {
                match event {
                    RoundEvent::PointsAwarded { amount } => awards.push(amount),
                    RoundEvent::GameOver { .. } => game_overs += 1,
                    _ => {}
                }
            }
            prop_assert!(awards.len() <= 1, "awarded twice: {:?}", awards);
            prop_assert!(game_overs <= 1);
        }

        if game.phase() == GamePhase::GameOver {
            prop_assert_eq!(game_overs, 1);
            prop_assert_eq!(awards.len(), 1);
        }
        prop_assert_eq!(game.total_points(), awards.iter().sum::<u64>());
    }

    #[test]
    fn lives_never_underflow(losses in 0usize..20) {
        let mut game = game();
        game.start();
        frame(&mut game, 16.0);
        for _ in 0..losses {
            apply(&mut game, Op::CatchBad);
        }
        let lives = game.state().round.lives as usize;
        prop_assert_eq!(lives, 3usize.saturating_sub(losses));
        prop_assert_eq!(game.phase() == GamePhase::GameOver, losses >= 3);
    }

    #[test]
    fn double_reset_matches_single(ops in proptest::collection::vec(op(), 0..40)) {
        let mut game = game();
        game.start();
        for op in ops {
            apply(&mut game, op);
        }
        game.reset();
        let once = (game.state().round.clone(), game.state().player.pos, game.phase());
        game.reset();
        let twice = (game.state().round.clone(), game.state().player.pos, game.phase());
        prop_assert_eq!(once, twice);
        prop_assert!(game.state().entities.is_empty());
        prop_assert!(game.state().particles.is_empty());
    }
}
