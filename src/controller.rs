//! Round lifecycle controller
//!
//! Owns the game state, the two scheduled tasks (per-frame callback and spawn
//! interval) and the key listener, and talks to the points ledger and the
//! high score record.
//!
//! Phases: Idle -> Running -> (Paused <-> Running) -> GameOver, with reset
//! returning to Idle from anywhere. At most one frame request, one spawn
//! interval and one key listener exist at any time: every arm cancels the
//! previous handle first, and each arm bumps a generation counter so that a
//! callback already in flight for an old task is ignored.

use std::cell::RefCell;
use std::rc::Rc;

use crate::highscores::HighScore;
use crate::input::{Key, apply_key};
use crate::persistence::{KeyValueStore, PointsLedger};
use crate::platform::{Platform, TaskHandle, Wake};
use crate::renderer::build_frame;
use crate::settings::Settings;
use crate::sim::{GameEvent, GamePhase, GameState, PlayerMode, spawn_entity, tick};
use crate::tuning::Tuning;

/// Route the exit button navigates to
pub const EXIT_ROUTE: &str = "/games";

/// What the controller did that the surrounding page may want to show
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoundEvent {
    Started,
    Paused,
    Resumed,
    Reset,
    GameOver { score: u64 },
    PointsAwarded { amount: u64 },
    NewHighScore { score: u64 },
    Exited,
}

pub struct RoundController<P: Platform> {
    state: GameState,
    platform: P,
    settings: Settings,
    store: Rc<dyn KeyValueStore>,
    ledger: Rc<RefCell<PointsLedger>>,
    high_score: HighScore,
    generation: u64,
    frame_task: Option<TaskHandle>,
    spawn_task: Option<TaskHandle>,
    key_listener: Option<TaskHandle>,
    /// Timestamp of the previous frame; `None` until the first frame after arming
    last_frame_ms: Option<f64>,
    /// Points handed to the ledger for the current round
    awarded: Option<u64>,
    /// Tutorial panel still up for this visit
    tutorial_visible: bool,
    events: Vec<RoundEvent>,
}

impl<P: Platform> RoundController<P> {
    pub fn new(
        platform: P,
        tuning: Tuning,
        seed: u64,
        store: Rc<dyn KeyValueStore>,
        ledger: Rc<RefCell<PointsLedger>>,
    ) -> Self {
        let settings = Settings::load(store.as_ref());
        let high_score = HighScore::load(store.clone());
        let mut state = GameState::new(tuning, seed);
        state.max_particles = settings.max_particles();
        Self {
            state,
            platform,
            store,
            ledger,
            high_score,
            generation: 0,
            frame_task: None,
            spawn_task: None,
            key_listener: None,
            last_frame_ms: None,
            awarded: None,
            tutorial_visible: settings.show_tutorial,
            settings,
            events: Vec::new(),
        }
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Direct access for scripted scenarios and tools
    pub fn state_mut(&mut self) -> &mut GameState {
        &mut self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn platform_mut(&mut self) -> &mut P {
        &mut self.platform
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn high_score(&self) -> u64 {
        self.high_score.best()
    }

    pub fn total_points(&self) -> u64 {
        self.ledger.borrow().total_points()
    }

    /// Points awarded for the current round, once it has been awarded
    pub fn points_awarded(&self) -> Option<u64> {
        self.awarded
    }

    /// The tutorial shows on every visit until the first start or an
    /// explicit dismissal, unless turned off in settings
    pub fn show_tutorial(&self) -> bool {
        self.tutorial_visible
    }

    pub fn drain_events(&mut self) -> Vec<RoundEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start a fresh round. Ignored while a round is already running, so a
    /// double click cannot arm a second loop.
    pub fn start(&mut self) {
        if self.state.phase == GamePhase::Running {
            log::debug!("start ignored: round already running");
            return;
        }
        self.disarm();
        self.state.reset();
        self.awarded = None;
        self.state.phase = GamePhase::Running;
        self.dismiss_tutorial();
        self.arm();
        self.events.push(RoundEvent::Started);
        log::info!("Round started");
    }

    /// Freeze the round in place
    pub fn pause(&mut self) {
        if self.state.phase != GamePhase::Running {
            return;
        }
        self.disarm();
        self.state.phase = GamePhase::Paused;
        self.events.push(RoundEvent::Paused);
        self.redraw();
        log::info!("Round paused at score {}", self.state.round.score);
    }

    /// Continue a paused round where it stopped
    pub fn resume(&mut self) {
        if self.state.phase != GamePhase::Paused {
            return;
        }
        self.state.phase = GamePhase::Running;
        self.arm();
        self.events.push(RoundEvent::Resumed);
        log::info!("Round resumed");
    }

    /// Back to Idle with everything zeroed. Abandons the round without
    /// awarding points.
    pub fn reset(&mut self) {
        self.disarm();
        self.state.reset();
        self.awarded = None;
        self.events.push(RoundEvent::Reset);
        self.redraw();
        log::info!("Round reset");
    }

    /// Leave the game. An unfinished round (running or paused) is awarded
    /// its current score first; the round is left frozen.
    pub fn exit(&mut self) {
        if matches!(self.state.phase, GamePhase::Running | GamePhase::Paused) {
            self.award_once();
        }
        self.disarm();
        if self.state.phase == GamePhase::Running {
            self.state.phase = GamePhase::Paused;
        }
        self.events.push(RoundEvent::Exited);
        self.platform.navigate(EXIT_ROUTE);
        log::info!("Exited game");
    }

    /// Cancel every task (view going away)
    pub fn teardown(&mut self) {
        self.disarm();
    }

    /// Basket style can be picked from buttons at any time
    pub fn set_player_mode(&mut self, mode: PlayerMode) {
        self.state.player.mode = mode;
        if self.state.phase != GamePhase::Running {
            self.redraw();
        }
    }

    pub fn dismiss_tutorial(&mut self) {
        self.tutorial_visible = false;
    }

    pub fn update_settings(&mut self, settings: Settings) {
        self.state.max_particles = settings.max_particles();
        if !settings.show_tutorial {
            self.tutorial_visible = false;
        }
        settings.save(self.store.as_ref());
        self.settings = settings;
    }

    /// Dispatch a platform callback
    pub fn handle(&mut self, wake: Wake) {
        match wake {
            Wake::Frame {
                generation,
                timestamp_ms,
            } => self.on_frame(generation, timestamp_ms),
            Wake::Spawn { generation } => self.on_spawn(generation),
            Wake::Key { key } => self.on_key(key),
        }
    }

    /// Render the current state once, outside the loop
    pub fn redraw(&mut self) {
        let frame = build_frame(&self.state, &self.settings);
        if let Err(e) = self.platform.present(&frame) {
            log::warn!("Frame dropped: {}", e);
        }
    }

    fn on_frame(&mut self, generation: u64, timestamp_ms: f64) {
        if generation != self.generation || self.state.phase != GamePhase::Running {
            log::trace!("stale frame (generation {})", generation);
            return;
        }
        // The one-shot request has fired
        self.frame_task = None;

        let dt_ms = match self.last_frame_ms {
            Some(last) => (timestamp_ms - last).max(0.0) as f32,
            None => 0.0,
        };
        self.last_frame_ms = Some(timestamp_ms);

        tick(&mut self.state, dt_ms);
        self.process_events();
        self.redraw();

        if self.state.phase == GamePhase::Running {
            match self.platform.request_frame(self.generation) {
                Ok(handle) => self.frame_task = Some(handle),
                Err(e) => log::error!("Frame loop stopped: {}", e),
            }
        }
    }

    fn on_spawn(&mut self, generation: u64) {
        if generation != self.generation {
            log::trace!("stale spawn (generation {})", generation);
            return;
        }
        if spawn_entity(&mut self.state).is_some() {
            self.process_events();
        }
    }

    fn on_key(&mut self, key: Key) {
        if !self.state.is_running() {
            return;
        }
        apply_key(&mut self.state, key);
    }

    fn process_events(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::ScoreChanged { score } => {
                    if self.high_score.submit(score) {
                        self.events.push(RoundEvent::NewHighScore { score });
                    }
                }
                GameEvent::GameOver { score } => {
                    self.disarm();
                    self.award_once();
                    self.events.push(RoundEvent::GameOver { score });
                    log::info!("Game over, final score {}", score);
                }
                other => log::trace!("{:?}", other),
            }
        }
    }

    /// Hand the score to the ledger unless this round already did
    fn award_once(&mut self) {
        if self.state.round.completed {
            return;
        }
        let amount = self.state.round.score;
        self.ledger.borrow_mut().add_points(amount);
        self.state.round.completed = true;
        self.awarded = Some(amount);
        self.events.push(RoundEvent::PointsAwarded { amount });
    }

    /// Arm the frame request, spawn interval and key listener for a new
    /// generation
    fn arm(&mut self) {
        self.disarm();
        self.last_frame_ms = None;

        match self.platform.request_frame(self.generation) {
            Ok(handle) => self.frame_task = Some(handle),
            Err(e) => log::error!("Could not start frame loop: {}", e),
        }
        match self
            .platform
            .start_interval(self.state.tuning.spawn_interval_ms, self.generation)
        {
            Ok(handle) => self.spawn_task = Some(handle),
            Err(e) => log::error!("Could not start spawner: {}", e),
        }
        match self.platform.listen_keys() {
            Ok(handle) => self.key_listener = Some(handle),
            Err(e) => log::warn!("Keyboard input unavailable: {}", e),
        }
    }

    /// Cancel whatever is armed and invalidate callbacks in flight
    fn disarm(&mut self) {
        if let Some(handle) = self.frame_task.take() {
            self.platform.cancel_frame(handle);
        }
        if let Some(handle) = self.spawn_task.take() {
            self.platform.cancel_interval(handle);
        }
        if let Some(handle) = self.key_listener.take() {
            self.platform.unlisten_keys(handle);
        }
        self.generation += 1;
    }
}

impl<P: Platform> Drop for RoundController<P> {
    fn drop(&mut self) {
        self.disarm();
    }
}
