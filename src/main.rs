//! Carbon Catcher entry point
//!
//! The browser build wires the round controller to the page (canvas, HUD,
//! buttons). The native build plays a seeded headless round.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};

    use anyhow::{Result, anyhow};
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement};

    use carbon_catcher::controller::RoundEvent;
    use carbon_catcher::persistence::{KeyValueStore, LocalStore, MemoryStore, PointsLedger};
    use carbon_catcher::platform::web::Dispatch;
    use carbon_catcher::platform::{Wake, WebPlatform};
    use carbon_catcher::renderer::CanvasRenderer;
    use carbon_catcher::sim::{GamePhase, PlayerMode};
    use carbon_catcher::{RoundController, Tuning};

    /// Page-level game wrapper
    struct Game {
        controller: RoundController<WebPlatform>,
        document: Document,
        /// Points handed out for the round shown in the game-over panel
        last_award: Option<u64>,
    }

    impl Game {
        fn on_wake(&mut self, wake: Wake) {
            self.controller.handle(wake);
            self.after_action();
        }

        /// Fold controller events into page state and refresh the HUD
        fn after_action(&mut self) {
            for event in self.controller.drain_events() {
                match event {
                    RoundEvent::PointsAwarded { amount } => self.last_award = Some(amount),
                    RoundEvent::Started | RoundEvent::Reset => self.last_award = None,
                    RoundEvent::NewHighScore { score } => {
                        log::debug!("New high score {}", score);
                    }
                    _ => {}
                }
            }
            self.update_hud();
        }

        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_visible(&self, id: &str, visible: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let state = self.controller.state();
            let round = &state.round;
            let phase = state.phase;

            self.set_text("hud-score", &round.score.to_string());
            self.set_text("hud-time", &format!("{}s", round.elapsed_secs()));
            self.set_text("hud-best", &self.controller.high_score().to_string());
            self.set_text("hud-lives", &"❤️".repeat(round.lives as usize));
            self.set_text("hud-points", &self.controller.total_points().to_string());

            self.set_visible("tutorial", self.controller.show_tutorial() && phase == GamePhase::Idle);
            self.set_visible("start-btn", phase == GamePhase::Idle);
            self.set_visible("pause-btn", phase == GamePhase::Running);
            self.set_visible("resume-btn", phase == GamePhase::Paused);

            self.set_visible("game-over", phase == GamePhase::GameOver);
            if phase == GamePhase::GameOver {
                self.set_text("final-score", &round.score.to_string());
                let earned = self.last_award.unwrap_or(0);
                self.set_text("points-earned", &format!("+{} pts", earned));
            }

            for mode in PlayerMode::ALL {
                if let Some(el) = self.document.get_element_by_id(&mode_button_id(mode)) {
                    let class = if state.player.mode == mode {
                        "mode-btn active"
                    } else {
                        "mode-btn"
                    };
                    let _ = el.set_attribute("class", class);
                }
            }
        }
    }

    fn mode_button_id(mode: PlayerMode) -> String {
        format!("mode-{}", mode.label().to_lowercase())
    }

    fn open_store() -> Rc<dyn KeyValueStore> {
        match LocalStore::open() {
            Ok(store) => Rc::new(store),
            Err(e) => {
                log::warn!("localStorage unavailable ({}), progress will not be kept", e);
                Rc::new(MemoryStore::new())
            }
        }
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        if let Err(e) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {}", e).into());
        }

        log::info!("Carbon Catcher starting...");
        if let Err(e) = start() {
            log::error!("Carbon Catcher failed to start: {:#}", e);
        }
    }

    fn start() -> Result<()> {
        let window = web_sys::window().ok_or_else(|| anyhow!("Window not found"))?;
        let document = window
            .document()
            .ok_or_else(|| anyhow!("No Document Found"))?;
        let canvas = document
            .get_element_by_id("canvas")
            .ok_or_else(|| anyhow!("No Canvas Element found with ID 'canvas'"))?
            .dyn_into::<HtmlCanvasElement>()
            .map_err(|element| anyhow!("Error converting {:?} to HtmlCanvasElement", element))?;

        let tuning = Tuning::default();
        canvas.set_width(tuning.field_width as u32);
        canvas.set_height(tuning.field_height as u32);
        let renderer = CanvasRenderer::new(canvas)?;

        let store = open_store();
        let ledger = Rc::new(RefCell::new(PointsLedger::load(store.clone())));
        let seed = js_sys::Date::now() as u64;

        let game = Rc::new_cyclic(|weak: &Weak<RefCell<Game>>| {
            let weak = weak.clone();
            let dispatch: Dispatch = Rc::new(move |wake: Wake| {
                let Some(game) = weak.upgrade() else {
                    return;
                };
                match game.try_borrow_mut() {
                    Ok(mut game) => game.on_wake(wake),
                    Err(_) => log::warn!("Dropped {:?}: game busy", wake),
                }
            });
            let platform = WebPlatform::new(window.clone(), renderer, dispatch);
            RefCell::new(Game {
                controller: RoundController::new(platform, tuning, seed, store, ledger),
                document: document.clone(),
                last_award: None,
            })
        });

        setup_buttons(&document, &game);
        setup_auto_pause(&window, &document, &game);

        {
            let mut g = game.borrow_mut();
            g.controller.redraw();
            g.after_action();
        }

        log::info!("Carbon Catcher ready (seed {})", seed);
        Ok(())
    }

    fn on_click(
        document: &Document,
        id: &str,
        game: &Rc<RefCell<Game>>,
        action: impl Fn(&mut Game) + 'static,
    ) {
        let Some(btn) = document.get_element_by_id(id) else {
            log::warn!("No #{} button on the page", id);
            return;
        };
        let game = game.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
            if let Ok(mut g) = game.try_borrow_mut() {
                action(&mut *g);
                g.after_action();
            }
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, game: &Rc<RefCell<Game>>) {
        on_click(document, "start-btn", game, |g| g.controller.start());
        on_click(document, "play-again-btn", game, |g| g.controller.start());
        on_click(document, "pause-btn", game, |g| g.controller.pause());
        on_click(document, "resume-btn", game, |g| g.controller.resume());
        on_click(document, "reset-btn", game, |g| g.controller.reset());
        on_click(document, "exit-btn", game, |g| g.controller.exit());
        on_click(document, "game-over-exit-btn", game, |g| g.controller.exit());
        on_click(document, "tutorial-close", game, |g| {
            g.controller.dismiss_tutorial()
        });
        for mode in PlayerMode::ALL {
            on_click(document, &mode_button_id(mode), game, move |g| {
                g.controller.set_player_mode(mode)
            });
            if let Some(btn) = document.get_element_by_id(&mode_button_id(mode)) {
                btn.set_text_content(Some(&format!("{} {}", mode.glyph(), mode.label())));
            }
        }
    }

    fn setup_auto_pause(window: &web_sys::Window, document: &Document, game: &Rc<RefCell<Game>>) {
        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    if let Ok(mut g) = game.try_borrow_mut() {
                        if g.controller.phase() == GamePhase::Running {
                            g.controller.pause();
                            g.after_action();
                            log::info!("Auto-paused (tab hidden)");
                        }
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Leaving the page cancels every task
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if let Ok(mut g) = game.try_borrow_mut() {
                    g.controller.teardown();
                }
            });
            let _ =
                window.add_event_listener_with_callback("pagehide", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::cell::RefCell;
    use std::rc::Rc;

    use anyhow::{Context, Result};

    use carbon_catcher::controller::RoundEvent;
    use carbon_catcher::input::Key;
    use carbon_catcher::persistence::{KeyValueStore, MemoryStore, PointsLedger};
    use carbon_catcher::platform::ManualPlatform;
    use carbon_catcher::sim::{EntityKind, GamePhase, GameState};
    use carbon_catcher::{RoundController, Tuning};

    /// Virtual time cap for one headless round
    const MAX_ROUND_MS: f64 = 180_000.0;
    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Key presses the autopilot may issue per frame
    const PRESSES_PER_FRAME: usize = 2;

    pub struct Outcome {
        pub score: u64,
        pub seconds: u64,
        pub lives: u8,
        pub awarded: u64,
        pub game_over: bool,
    }

    pub fn load_tuning(path: Option<&str>) -> Result<Tuning> {
        let Some(path) = path else {
            return Ok(Tuning::default());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("reading tuning file {}", path))?;
        let tuning = Tuning::from_json(&json).with_context(|| format!("loading {}", path))?;
        log::info!("Loaded tuning from {}", path);
        Ok(tuning)
    }

    /// Move under the lowest beneficial item, away from a harmful one about
    /// to land
    fn steer(state: &GameState) -> Option<Key> {
        let player = &state.player;
        let center = player.center().x;
        let danger_y = player.pos.y - state.tuning.entity_size * 2.0;

        let (left, right) = (
            player.pos.x - player.speed,
            player.pos.x + player.size + player.speed,
        );
        let threat = state
            .entities
            .iter()
            .filter(|e| e.kind == EntityKind::Harmful && e.pos.y > danger_y)
            .find(|e| e.pos.x < right && e.pos.x + e.size > left);
        if let Some(threat) = threat {
            let threat_x = threat.pos.x + threat.size / 2.0;
            let max_x = state.tuning.player_max_x();
            // Dodge towards the side with room
            return Some(if (threat_x < center && player.pos.x < max_x) || player.pos.x <= 0.0 {
                Key::Right
            } else {
                Key::Left
            });
        }

        let target = state
            .entities
            .iter()
            .filter(|e| e.kind == EntityKind::Beneficial && e.pos.y < player.pos.y)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))?;
        let target_x = target.pos.x + target.size / 2.0;
        if target_x < center - player.speed {
            Some(Key::Left)
        } else if target_x > center + player.speed {
            Some(Key::Right)
        } else {
            None
        }
    }

    pub fn play(tuning: Tuning, seed: u64) -> Outcome {
        let store: Rc<dyn KeyValueStore> = Rc::new(MemoryStore::new());
        let ledger = Rc::new(RefCell::new(PointsLedger::load(store.clone())));
        let mut game = RoundController::new(ManualPlatform::new(), tuning, seed, store, ledger);

        let mut awarded = 0;
        let mut game_over = false;
        game.start();

        while game.phase() == GamePhase::Running && game.platform().now_ms() < MAX_ROUND_MS {
            for wake in game.platform_mut().advance(FRAME_MS) {
                game.handle(wake);
            }
            for _ in 0..PRESSES_PER_FRAME {
                let Some(key) = steer(game.state()) else {
                    break;
                };
                if let Some(wake) = game.platform().press(key) {
                    game.handle(wake);
                }
            }
            for event in game.drain_events() {
                match event {
                    RoundEvent::PointsAwarded { amount } => awarded = amount,
                    RoundEvent::GameOver { .. } => game_over = true,
                    RoundEvent::NewHighScore { score } => log::debug!("high score {}", score),
                    _ => {}
                }
            }
        }

        if game.phase() == GamePhase::Running {
            log::info!("Time cap reached, leaving the round");
            game.exit();
            for event in game.drain_events() {
                if let RoundEvent::PointsAwarded { amount } = event {
                    awarded = amount;
                }
            }
        }

        let round = &game.state().round;
        Outcome {
            score: round.score,
            seconds: round.elapsed_secs(),
            lives: round.lives,
            awarded,
            game_over,
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_headless_round_awards_its_score() {
            let outcome = play(Tuning::default(), 11);
            assert_eq!(outcome.awarded, outcome.score);
            assert_eq!(outcome.game_over, outcome.lives == 0);
        }

        #[test]
        fn test_missing_tuning_path_uses_defaults() {
            assert_eq!(load_tuning(None).unwrap(), Tuning::default());
            assert!(load_tuning(Some("/nonexistent/tuning.json")).is_err());
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    env_logger::init();
    log::info!("Carbon Catcher (native, headless) starting...");

    let args: Vec<String> = std::env::args().skip(1).collect();
    let tuning = headless::load_tuning(args.first().map(String::as_str))?;
    let seed = match args.get(1) {
        Some(seed) => seed.parse::<u64>()?,
        None => 2024,
    };

    let outcome = headless::play(tuning, seed);
    log::info!(
        "Round finished: score {}, {}s, {} lives left, {} points awarded{}",
        outcome.score,
        outcome.seconds,
        outcome.lives,
        outcome.awarded,
        if outcome.game_over { " (game over)" } else { "" }
    );
    println!(
        "score={} time={}s lives={} awarded={}",
        outcome.score, outcome.seconds, outcome.lives, outcome.awarded
    );
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
