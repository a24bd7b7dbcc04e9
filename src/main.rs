//! Winter Run entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::{Rc, Weak};
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, KeyboardEvent};

    use winter_run::platform::{FrameHandle, RafScheduler, key_action};
    use winter_run::renderer::{AssetCatalog, CanvasSurface};
    use winter_run::scene::{self, DemoScene};
    use winter_run::settings::Settings;
    use winter_run::sim::{GameDriver, World};

    const ASSETS: &[(&str, &str)] = &[
        ("characters.player", "assets/player.png"),
        ("characters.snowman", "assets/snowman.png"),
        ("dialog.overlay", "assets/dialog.png"),
        ("platform.ground", "assets/ground.png"),
        ("platform.ledge", "assets/ledge.png"),
        ("platform.lift", "assets/lift.png"),
    ];

    /// Game instance holding all state
    struct Game {
        driver: GameDriver<RafScheduler>,
        surface: CanvasSurface,
        scene: DemoScene,
    }

    impl Game {
        fn frame(&mut self, handle: FrameHandle, time: f64) {
            self.driver.on_frame(handle, time, &mut self.surface);
        }

        fn toggle_pause(&mut self) {
            if self.driver.is_running() {
                self.driver.pause();
            } else {
                self.driver.start();
            }
        }
    }

    fn js_err(err: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&err.to_string())
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(err) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&js_err(err));
        }

        log::info!("Winter Run starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;

        let settings = Settings::load();
        canvas.set_width(settings.viewport_width as u32);
        canvas.set_height(settings.viewport_height as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or("no 2d context")?
            .dyn_into()?;
        let mut surface = CanvasSurface::new(
            ctx,
            settings.viewport_width as f64,
            settings.viewport_height as f64,
        );

        let mut assets = AssetCatalog::new();
        for (name, path) in ASSETS {
            let image = HtmlImageElement::new()?;
            image.set_src(path);
            assets.insert(*name, surface.register_image(image));
        }

        let seed = js_sys::Date::now() as u64;
        let mut world = World::new(settings);
        let scene = scene::build_demo(&mut world, &assets, seed, 0).map_err(js_err)?;
        log::info!("Game initialized with seed: {}", seed);

        let game = Rc::new_cyclic(|weak: &Weak<RefCell<Game>>| {
            let weak = weak.clone();
            let scheduler = RafScheduler::new(Rc::new(move |handle: FrameHandle, time: f64| {
                if let Some(game) = weak.upgrade() {
                    game.borrow_mut().frame(handle, time);
                }
            }));
            RefCell::new(Game {
                driver: GameDriver::new(world, scheduler),
                surface,
                scene,
            })
        });

        setup_keyboard(&window, &game);
        setup_auto_pause(&window, &game);

        game.borrow_mut().driver.start();
        log::info!("Winter Run running!");
        Ok(())
    }

    fn setup_keyboard(window: &web_sys::Window, game: &Rc<RefCell<Game>>) {
        for (kind, pressed) in [("keydown", true), ("keyup", false)] {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match (event.code().as_str(), pressed) {
                    ("Escape", true) => g.toggle_pause(),
                    ("Space", true) => g.driver.dismiss_overlay(),
                    (code, _) => {
                        if let Some(action) = key_action(code, pressed) {
                            // Presses are ignored while paused; releases still unlatch
                            if !g.driver.is_running() && !action.is_release() {
                                return;
                            }
                            let player = g.scene.player;
                            if let Err(err) = g.driver.world_mut().apply_action(player, action) {
                                log::warn!("Dropped {:?}: {}", action, err);
                            }
                        }
                    }
                }
            });
            let _ = window.add_event_listener_with_callback(kind, closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_auto_pause(window: &web_sys::Window, game: &Rc<RefCell<Game>>) {
        // Visibility change (tab switch, minimize)
        if let Some(document) = window.document() {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.driver.is_running() {
                        g.driver.pause();
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.driver.is_running() {
                    g.driver.pause();
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run()
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Winter Run (native) starting headless demo...");

    if let Err(err) = headless::run() {
        log::error!("Headless run failed: {}", err);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Scripted run of the demo scene without a browser
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use winter_run::SimResult;
    use winter_run::platform::ManualScheduler;
    use winter_run::renderer::{AssetCatalog, RecordingSurface};
    use winter_run::scene::build_demo;
    use winter_run::settings::Settings;
    use winter_run::sim::{Action, DriverMode, GameDriver, World};

    const FRAMES: u32 = 600;
    const FRAME_MS: f64 = 1000.0 / 60.0;

    pub fn run() -> SimResult<()> {
        let mut world = World::new(Settings::load());
        let scene = build_demo(&mut world, &AssetCatalog::new(), 42, 8)?;
        let mut driver = GameDriver::new(world, ManualScheduler::new());
        let mut surface = RecordingSurface::new();

        // Walk right, hop once on the way
        let script = [
            (60, Action::StartMoveRight),
            (120, Action::StartJump),
            (125, Action::StopJump),
            (330, Action::StopMoveRight),
        ];

        driver.start();
        for frame in 0..FRAMES {
            for (_, action) in script.iter().filter(|(at, _)| *at == frame) {
                driver.world_mut().apply_action(scene.player, *action)?;
            }

            let Some(handle) = driver.scheduler().pending() else {
                break;
            };
            driver.on_frame(handle, frame as f64 * FRAME_MS, &mut surface);

            if driver.mode() == DriverMode::SuspendedForOverlay {
                if let Some(overlay) = driver.overlay() {
                    log::info!("Frame {}: overlay \"{}\"", frame, overlay.text);
                }
                driver.dismiss_overlay();
            }
        }

        let world = driver.world();
        if let Some(player) = world.get(scene.player) {
            log::info!(
                "After {} ticks player at ({:.1}, {:.1}), resting on {:?}",
                world.ticks(),
                player.position.x,
                player.position.y,
                player.resting_platform()
            );
        }
        log::info!(
            "{} objects, {} draw calls in the last frame",
            world.len(),
            surface.last_frame().len()
        );
        Ok(())
    }
}
