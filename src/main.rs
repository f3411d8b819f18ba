//! Endless Runner entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlInputElement, KeyboardEvent, MouseEvent, TouchEvent};

    use endless_runner::persistence::{BrowserStorage, KeyValueStore, MemoryStorage};
    use endless_runner::platform::{AnimationFrameScheduler, FrameControl, FrameScheduler, TickHandle};
    use endless_runner::session::PendingReport;
    use endless_runner::sim::TickInput;
    use endless_runner::store::FirebaseRemote;
    use endless_runner::{DeviceId, GameOverReport, ScoreStore, Session, Settings};

    type WebStorage = Rc<dyn KeyValueStore>;
    type WebSession = Session<FirebaseRemote, WebStorage>;

    /// Game instance holding all state
    struct Game {
        session: WebSession,
        input: TickInput,
        scheduler: AnimationFrameScheduler,
        frame_loop: Option<TickHandle>,
    }

    impl Game {
        /// Start (or restart) a run and its frame loop
        fn start(game: &Rc<RefCell<Game>>) {
            let seed = js_sys::Date::now() as u64;
            let mut g = game.borrow_mut();
            if let Err(e) = g.session.start_run(seed) {
                log::error!("Cannot start run: {e}");
                return;
            }
            g.input = TickInput::default();

            set_visible("startScreen", false);
            set_visible("gameOverScreen", false);
            update_hud(0, 0.0);

            let looped = game.clone();
            let handle = g.scheduler.schedule(Box::new(move |_time| frame(&looped)));
            if let Some(previous) = g.frame_loop.replace(handle) {
                previous.cancel();
            }
        }

        /// Queue a jump for the next frame; ignored outside a live run
        fn request_jump(&mut self) {
            if self.session.is_running() {
                self.input.jump = true;
            }
        }
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            el.set_text_content(Some(text));
        }
    }

    fn set_visible(id: &str, visible: bool) {
        if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    fn update_hud(score: u64, distance: f64) {
        set_text("currentScore", &score.to_string());
        set_text("currentDistance", &format!("{}m", distance.floor()));
    }

    /// One display frame. Consumes the pending one-shot input.
    fn frame(game: &Rc<RefCell<Game>>) -> FrameControl {
        let mut g = game.borrow_mut();
        let input = std::mem::take(&mut g.input);
        let finished = g.session.frame(&input);

        if let Some(run) = g.session.run() {
            update_hud(run.score, run.distance);
        }

        let Some(result) = finished else {
            return FrameControl::Continue;
        };
        match g.session.report(result) {
            Ok(pending) => show_report(pending),
            Err(e) => log::error!("Run finished without a player: {e}"),
        }
        FrameControl::Stop
    }

    fn show_report(pending: PendingReport<FirebaseRemote, WebStorage>) {
        wasm_bindgen_futures::spawn_local(async move {
            let report = pending.resolve().await;
            render_report(&report);
        });
    }

    fn render_report(report: &GameOverReport) {
        set_text("finalScore", &report.score.to_string());
        set_text("finalDistance", &format!("{}m", report.distance.floor()));
        set_text(
            "playerRank",
            &report.rank.map_or_else(|| "-".to_string(), |r| format!("#{r}")),
        );

        if let Some(document) = document() {
            if let Some(list) = document.get_element_by_id("leaderboardList") {
                list.set_inner_html("");
                for (i, record) in report.leaderboard.iter().enumerate() {
                    let Ok(row) = document.create_element("li") else {
                        continue;
                    };
                    row.set_text_content(Some(&format!(
                        "{}. {} - {}",
                        i + 1,
                        record.username,
                        record.score
                    )));
                    let _ = list.append_child(&row);
                }
            }
        }

        set_visible("gameOverScreen", true);
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);

        log::info!("Endless Runner starting...");

        let storage: WebStorage = match BrowserStorage::local() {
            Ok(storage) => Rc::new(storage),
            Err(e) => {
                log::warn!("{e}; scores will not survive a reload");
                Rc::new(MemoryStorage::new())
            }
        };

        let settings = Settings::load(&storage);
        let device_id = DeviceId::load_or_create(&storage, &settings.device_id_key);
        let remote = settings.database_url.clone().map(FirebaseRemote::new);
        let store = ScoreStore::connect(remote, storage, &settings).await;

        let game = Rc::new(RefCell::new(Game {
            session: Session::new(Rc::new(store), device_id, settings),
            input: TickInput::default(),
            scheduler: AnimationFrameScheduler,
            frame_loop: None,
        }));

        setup_input_handlers(game.clone());
        setup_start_button(game.clone());
        setup_restart_button(game);

        set_visible("loading", false);
        set_visible("startScreen", true);

        log::info!("Endless Runner ready");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                if matches!(event.code().as_str(), "Space" | "ArrowUp") {
                    event.prevent_default();
                    game.borrow_mut().request_jump();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch (menus are hidden while a run is live)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: TouchEvent| {
                game.borrow_mut().request_jump();
            });
            let _ = window
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // On-screen jump button
        if let Some(btn) = document().and_then(|d| d.get_element_by_id("jumpBtn")) {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().request_jump();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_start_button(game: Rc<RefCell<Game>>) {
        let Some(document) = document() else {
            return;
        };
        let Some(btn) = document.get_element_by_id("startButton") else {
            return;
        };

        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            let raw = document
                .get_element_by_id("username")
                .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
                .map(|input| input.value())
                .unwrap_or_default();

            let claim = match game.borrow().session.begin_claim(&raw) {
                Ok(claim) => claim,
                Err(e) => {
                    set_text("usernameError", &e.to_string());
                    return;
                }
            };

            let game = game.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match claim.verify().await {
                    Ok(identity) => {
                        set_text("usernameError", "");
                        game.borrow_mut().session.set_identity(identity);
                        Game::start(&game);
                    }
                    Err(e) => set_text("usernameError", &e.to_string()),
                }
            });
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_restart_button(game: Rc<RefCell<Game>>) {
        let Some(btn) = document().and_then(|d| d.get_element_by_id("restartButton")) else {
            return;
        };
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
            Game::start(&game);
        });
        let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless demo: one autopilot run against file-backed local scores
#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::cell::RefCell;
    use std::error::Error;
    use std::rc::Rc;

    use endless_runner::consts::FRAME_MS;
    use endless_runner::persistence::FileStorage;
    use endless_runner::platform::{FrameControl, FrameScheduler, ManualScheduler, now_millis};
    use endless_runner::sim::{RunResult, TickInput};
    use endless_runner::{DeviceId, ScoreStore, Session, Settings};

    const DEFAULT_NAME: &str = "Runner";
    const DEFAULT_DATA_DIR: &str = ".endless-runner";
    /// Autopilot hands over after this many frames (one minute at 60 Hz)
    const AUTOPILOT_FRAMES: u32 = 3_600;

    pub async fn run() -> Result<(), Box<dyn Error>> {
        let mut args = std::env::args().skip(1);
        let name = args.next().unwrap_or_else(|| DEFAULT_NAME.to_string());
        let data_dir = args.next().unwrap_or_else(|| DEFAULT_DATA_DIR.to_string());

        let storage = Rc::new(FileStorage::open(&data_dir)?);
        // Written back so the data dir always holds an editable settings file
        let settings = Settings::load(&storage);
        if let Err(e) = settings.save(&storage) {
            log::warn!("Settings not saved: {e}");
        }
        let settings = settings.with_env_overrides();
        if settings.database_url.is_some() {
            log::warn!("Remote leaderboards are web-only, using local scores");
        }

        let device_id = DeviceId::load_or_create(&storage, &settings.device_id_key);
        let store = ScoreStore::local_only(storage, &settings);
        let session = Rc::new(RefCell::new(Session::new(
            Rc::new(store),
            device_id,
            settings,
        )));

        let claim = session.borrow().begin_claim(&name)?;
        let identity = claim.verify().await?;
        session.borrow_mut().set_identity(identity);
        session.borrow_mut().start_run(now_millis() as u64)?;

        let finished: Rc<RefCell<Option<RunResult>>> = Rc::default();
        let mut scheduler = ManualScheduler::new(FRAME_MS);
        {
            let session = session.clone();
            let finished = finished.clone();
            let mut frames = 0u32;
            scheduler.schedule(Box::new(move |_time| {
                frames += 1;
                let input = TickInput {
                    jump: false,
                    autopilot: frames <= AUTOPILOT_FRAMES,
                };
                match session.borrow_mut().frame(&input) {
                    Some(result) => {
                        *finished.borrow_mut() = Some(result);
                        FrameControl::Stop
                    }
                    None => FrameControl::Continue,
                }
            }));
        }
        while scheduler.is_active() {
            scheduler.advance(600);
        }

        let Some(result) = finished.borrow_mut().take() else {
            return Err("run ended without a result".into());
        };
        log::info!(
            "Run finished after {:.1}s of game time",
            scheduler.now_ms() / 1000.0
        );

        let pending = session.borrow().report(result)?;
        let report = pending.resolve().await;

        println!("Game over, {name}!");
        println!("  score:    {}", report.score);
        println!("  distance: {}m", report.distance.floor());
        match report.rank {
            Some(rank) => println!("  rank:     #{rank}"),
            None => println!("  rank:     -"),
        }
        if !report.submitted {
            println!("  (score was not saved)");
        }
        println!("Leaderboard:");
        for (i, record) in report.leaderboard.iter().enumerate() {
            println!("  {:>2}. {:<20} {:>6}", i + 1, record.username, record.score);
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[tokio::main(flavor = "current_thread")]
async fn main() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_secs()
        .try_init();

    if let Err(e) = native::run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
