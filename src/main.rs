//! Spellbound entry point
//!
//! On the web: wires the save layer to LocalStorage and the keyboard.
//! Natively: runs a short headless session against in-memory storage.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use spellbound::consts::DEFAULT_NAMESPACE;
    use spellbound::platform::{LocalStorage, MemoryStorage, SharedStorage, SystemClock};
    use spellbound::{Player, SaveManager, SceneState};

    const MOVE_STEP: f32 = 8.0;

    /// Game instance holding the save layer and the live scene
    struct Game {
        saves: SaveManager,
        scene: SceneState,
        last_time: f64,
    }

    impl Game {
        fn new(storage: SharedStorage) -> Self {
            let saves = SaveManager::new(storage, DEFAULT_NAMESPACE, Rc::new(SystemClock));
            let scene = SceneState::new("village")
                .with_player(Player::new("player").with_health_bar());
            Self {
                saves,
                scene,
                last_time: 0.0,
            }
        }

        fn nudge_player(&mut self, dx: f32, dy: f32) {
            if let Some(player) = self.scene.player.as_mut() {
                let pos = player.pos;
                player.set_position(pos.x + dx, pos.y + dy);
            }
        }

        fn update_hud(&self) {
            let Some(document) = web_sys::window().and_then(|w| w.document()) else {
                return;
            };
            if let Some(el) = document.get_element_by_id("toast") {
                let text = self
                    .saves
                    .notifications()
                    .latest()
                    .map(|t| t.text.as_str())
                    .unwrap_or("");
                el.set_text_content(Some(text));
            }
            if let Some(el) = document.get_element_by_id("slot-info") {
                let label = self
                    .saves
                    .slot_summary(false)
                    .map(|s| s.label(js_sys::Date::now()))
                    .unwrap_or_else(|| "No save".to_string());
                el.set_text_content(Some(&label));
            }
        }
    }

    fn open_storage() -> SharedStorage {
        match LocalStorage::open() {
            Some(storage) => Rc::new(storage),
            None => {
                log::warn!("LocalStorage unavailable, saves will not survive a reload");
                MemoryStorage::shared()
            }
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Spellbound starting...");

        let game = Rc::new(RefCell::new(Game::new(open_storage())));
        game.borrow().update_hud();

        setup_keyboard(game.clone());
        request_animation_frame(game);
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
            let mut g = game.borrow_mut();
            let g = &mut *g;
            match event.key().as_str() {
                "F5" => {
                    event.prevent_default();
                    g.saves.save_game(&g.scene, false);
                }
                "F9" => {
                    event.prevent_default();
                    g.saves.load_and_apply(&mut g.scene, false);
                }
                "F6" => {
                    event.prevent_default();
                    g.saves.load_and_apply(&mut g.scene, true);
                }
                "ArrowLeft" | "a" => g.nudge_player(-MOVE_STEP, 0.0),
                "ArrowRight" | "d" => g.nudge_player(MOVE_STEP, 0.0),
                "ArrowUp" | "w" => g.nudge_player(0.0, -MOVE_STEP),
                "ArrowDown" | "s" => g.nudge_player(0.0, MOVE_STEP),
                _ => {}
            }
        });
        let _ =
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();
            let g = &mut *g;

            let dt_ms = if g.last_time > 0.0 {
                time - g.last_time
            } else {
                0.0
            };
            g.last_time = time;

            g.saves.update(dt_ms, &g.scene);
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Spellbound (native) starting...");
    log::info!("Native mode runs a headless session - run with `trunk serve` for the web version");

    headless_session();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Walk one save/load cycle against in-memory storage
#[cfg(not(target_arch = "wasm32"))]
fn headless_session() {
    use std::rc::Rc;

    use spellbound::consts::DEFAULT_NAMESPACE;
    use spellbound::platform::{MemoryStorage, SystemClock};
    use spellbound::story::markers;
    use spellbound::{Player, SaveManager, SceneState};

    let storage = MemoryStorage::shared();
    let mut saves = SaveManager::new(storage, DEFAULT_NAMESPACE, Rc::new(SystemClock));
    let mut scene =
        SceneState::new("village").with_player(Player::new("player").with_health_bar());

    saves.set_flag(markers::BOSS_FROST_WARDEN_DEFEATED);
    if let Some(player) = scene.player.as_mut() {
        player.set_position(120.0, 64.0);
        player.add_item("potion", 2);
    }

    if !saves.save_game(&scene, false) {
        log::error!("Headless save failed");
        return;
    }

    if let Some(player) = scene.player.as_mut() {
        player.set_position(0.0, 0.0);
    }
    saves.load_and_apply(&mut scene, false);

    if let Some(player) = scene.player.as_ref() {
        println!("Player restored to ({}, {})", player.pos.x, player.pos.y);
    }
    println!("Spells: {}", saves.spells().unlocked().join(", "));
    if let Some(summary) = saves.slot_summary(false) {
        println!("Manual slot: {}", summary.label(summary.timestamp));
    }
}
