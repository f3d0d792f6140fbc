//! Doodle Jump entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlInputElement, KeyboardEvent};

    use doodle_jump::api::{ApiClient, ApiConfig, LoginRequest, RegisterRequest, TOKEN_KEY};
    use doodle_jump::audio::AudioManager;
    use doodle_jump::consts::*;
    use doodle_jump::highscores::{BestScore, Leaderboard};
    use doodle_jump::persistence::{KeyValueStore, LocalStore, MemoryStore, StorageError};
    use doodle_jump::renderer::{CanvasSurface, render_scene};
    use doodle_jump::settings::Settings;
    use doodle_jump::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

    /// LocalStorage when the browser allows it, memory otherwise
    enum Store {
        Local(LocalStore),
        Memory(MemoryStore),
    }

    impl Store {
        fn open() -> Self {
            match LocalStore::open() {
                Ok(store) => Store::Local(store),
                Err(err) => {
                    log::warn!("{err}; progress will not be saved");
                    Store::Memory(MemoryStore::new())
                }
            }
        }
    }

    impl KeyValueStore for Store {
        fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
            match self {
                Store::Local(s) => s.get(key),
                Store::Memory(s) => s.get(key),
            }
        }

        fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
            match self {
                Store::Local(s) => s.set(key, value),
                Store::Memory(s) => s.set(key, value),
            }
        }

        fn remove(&mut self, key: &str) -> Result<(), StorageError> {
            match self {
                Store::Local(s) => s.remove(key),
                Store::Memory(s) => s.remove(key),
            }
        }
    }

    /// Held steering keys
    #[derive(Default)]
    struct Steering {
        left: bool,
        right: bool,
    }

    impl Steering {
        fn axis(&self) -> f32 {
            match (self.left, self.right) {
                (true, false) => -1.0,
                (false, true) => 1.0,
                _ => 0.0,
            }
        }
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        surface: CanvasSurface,
        last_time: f64,
        input: TickInput,
        steering: Steering,
        store: Store,
        settings: Settings,
        best: BestScore,
        audio: AudioManager,
        api: ApiClient,
        // FPS tracking
        frame_times: [f64; 60],
        frame_index: usize,
        fps: u32,
    }

    impl Game {
        fn new(seed: u64, surface: CanvasSurface) -> Self {
            let store = Store::open();
            let settings = Settings::load(&store);
            let best = BestScore::load(&store);
            let audio = AudioManager::new(&settings);
            Self {
                state: GameState::new(seed),
                surface,
                last_time: 0.0,
                input: TickInput::default(),
                steering: Steering::default(),
                store,
                settings,
                best,
                audio,
                api: ApiClient::new(ApiConfig::default()),
                frame_times: [0.0; 60],
                frame_index: 0,
                fps: 0,
            }
        }

        /// Run one simulation frame and react to what happened
        fn update(&mut self, dt: f32, time: f64) {
            self.input.horizontal = self.steering.axis();
            let events = tick(&mut self.state, &self.input, dt);

            // Clear one-shot inputs after processing
            self.input.start = false;
            self.input.pause = false;
            self.input.restart = false;

            self.audio.play_events(&events);
            for event in &events {
                if let GameEvent::GameOver { score, .. } = event {
                    self.on_game_over(*score);
                }
            }

            self.frame_times[self.frame_index] = time;
            self.frame_index = (self.frame_index + 1) % 60;
            let oldest_time = self.frame_times[self.frame_index];
            if oldest_time > 0.0 {
                let elapsed = time - oldest_time;
                if elapsed > 0.0 {
                    self.fps = (60000.0 / elapsed).round() as u32;
                }
            }
        }

        fn on_game_over(&mut self, score: u64) {
            match self.best.record(&mut self.store, score) {
                Ok(true) => set_text("final-best-label", "New best!"),
                Ok(false) => set_text("final-best-label", "Best"),
                Err(err) => log::error!("Could not save best score: {err}"),
            }
            refresh_leaderboard(self.api.clone(), Some(score));
        }

        fn toggle_mute(&mut self) {
            let muted = self.settings.toggle_mute();
            self.audio.apply_settings(&self.settings);
            if let Err(err) = self.settings.save(&mut self.store) {
                log::warn!("Could not save settings: {err}");
            }
            set_text("mute-btn", if muted { "Unmute" } else { "Mute" });
            log::info!("Muted: {}", muted);
        }

        fn render(&mut self) {
            render_scene(&self.state, &mut self.surface, self.settings.reduced_motion);
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let Some(document) = document() else { return };

            let best = self.best.value.max(self.state.score);
            set_text_in(&document, "#hud-score .hud-value", &self.state.score.to_string());
            set_text_in(&document, "#hud-best .hud-value", &best.to_string());
            set_text_in(
                &document,
                "#hud-level .hud-value",
                &self.state.difficulty.level.to_string(),
            );
            if self.settings.show_fps {
                set_text_in(&document, "#hud-fps .hud-value", &self.fps.to_string());
            }

            show(&document, "start-prompt", self.state.phase == GamePhase::NotStarted);
            show(&document, "pause-menu", self.state.phase == GamePhase::Paused);
            show(&document, "game-over", self.state.phase == GamePhase::GameOver);
            if self.state.phase == GamePhase::GameOver {
                set_text("final-score", &self.state.score.to_string());
                set_text("final-best", &self.best.value.to_string());
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

    fn set_text_in(document: &Document, selector: &str, text: &str) {
        if let Some(el) = document.query_selector(selector).ok().flatten() {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn show(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
        }
    }

    fn input_value(id: &str) -> String {
        document()
            .and_then(|d| d.get_element_by_id(id))
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
            .map(|input| input.value())
            .unwrap_or_default()
    }

    /// Fetch the user list and fill the leaderboard panel, sample data on failure.
    ///
    /// With a finished run's score, also shows where that score would place.
    fn refresh_leaderboard(api: ApiClient, final_score: Option<u64>) {
        wasm_bindgen_futures::spawn_local(async move {
            let board = Leaderboard::from_result(api.fetch_users().await);
            match board.top_score() {
                Some(top) => set_text("leaderboard-top", &format!("Top: {top}")),
                None => set_text("leaderboard-top", ""),
            }
            if let Some(score) = final_score {
                let rank = match board.potential_rank(score) {
                    Some(rank) => format!("Would rank #{rank}"),
                    None => "Outside the top 10".to_string(),
                };
                set_text("final-rank", &rank);
            }
            let Some(document) = document() else { return };
            let Some(list) = document.get_element_by_id("leaderboard") else {
                return;
            };
            list.set_inner_html("");
            for entry in &board.entries {
                if let Ok(row) = document.create_element("li") {
                    row.set_text_content(Some(&format!(
                        "{}. {} - {}",
                        entry.rank, entry.username, entry.score
                    )));
                    let _ = list.append_child(&row);
                }
            }
        });
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if let Err(err) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::warn_1(&format!("logger already set: {err}").into());
        }

        log::info!("Doodle Jump starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        show(&document, "loading", false);

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or("no canvas")?
            .dyn_into()?;
        let surface = CanvasSurface::new(&canvas, window.device_pixel_ratio())?;

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, surface)));
        log::info!("Game initialized with seed: {}", seed);

        setup_keyboard(game.clone())?;
        setup_buttons(game.clone(), &document)?;
        setup_auth_forms(game.clone(), &document)?;
        setup_auto_pause(game.clone())?;

        show(&document, "hud", true);
        refresh_leaderboard(game.borrow().api.clone(), None);

        request_animation_frame(game);
        log::info!("Doodle Jump running!");
        Ok(())
    }

    fn on_click(
        document: &Document,
        id: &str,
        mut handler: impl FnMut() + 'static,
    ) -> Result<(), JsValue> {
        if let Some(btn) = document.get_element_by_id(id) {
            let closure =
                Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| handler());
            btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }
        Ok(())
    }

    fn setup_keyboard(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;

        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => g.steering.left = true,
                    "ArrowRight" | "d" | "D" => g.steering.right = true,
                    " " | "Enter" => {
                        g.input.start = true;
                        g.audio.resume();
                    }
                    "Escape" | "p" | "P" => g.input.pause = true,
                    "r" | "R" => g.input.restart = true,
                    "m" | "M" => g.toggle_mute(),
                    _ => return,
                }
                event.prevent_default();
            });
            window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref())?;
            closure.forget();
        }

        let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
            let mut g = game.borrow_mut();
            match event.key().as_str() {
                "ArrowLeft" | "a" | "A" => g.steering.left = false,
                "ArrowRight" | "d" | "D" => g.steering.right = false,
                _ => {}
            }
        });
        window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn setup_buttons(game: Rc<RefCell<Game>>, document: &Document) -> Result<(), JsValue> {
        {
            let game = game.clone();
            on_click(document, "start-btn", move || {
                let mut g = game.borrow_mut();
                g.input.start = true;
                g.audio.resume();
            })?;
        }
        {
            let game = game.clone();
            on_click(document, "restart-btn", move || {
                game.borrow_mut().input.restart = true;
            })?;
        }
        {
            let game = game.clone();
            // Toggle back to playing
            on_click(document, "resume-btn", move || {
                game.borrow_mut().input.pause = true;
            })?;
        }
        on_click(document, "mute-btn", move || game.borrow_mut().toggle_mute())
    }

    fn setup_auth_forms(game: Rc<RefCell<Game>>, document: &Document) -> Result<(), JsValue> {
        {
            let game = game.clone();
            on_click(document, "login-btn", move || {
                let request = LoginRequest {
                    email: input_value("login-email"),
                    password: input_value("login-password"),
                };
                let game = game.clone();
                let api = game.borrow().api.clone();
                wasm_bindgen_futures::spawn_local(async move {
                    match api.login(&request).await {
                        Ok(response) => {
                            let mut g = game.borrow_mut();
                            let Game { store, best, .. } = &mut *g;
                            if let Err(err) = store.set(TOKEN_KEY, &response.token) {
                                log::warn!("Could not store session: {err}");
                            }
                            if let Err(err) = best.record(store, response.high_score) {
                                log::warn!("Could not store best score: {err}");
                            }
                            set_text("auth-status", &format!("Signed in as {}", response.username));
                        }
                        Err(err) => set_text("auth-status", &err.to_string()),
                    }
                });
            })?;
        }

        on_click(document, "register-btn", move || {
            let request = RegisterRequest {
                username: input_value("register-username"),
                email: input_value("register-email"),
                password: input_value("register-password"),
            };
            let api = game.borrow().api.clone();
            wasm_bindgen_futures::spawn_local(async move {
                match api.register(&request).await {
                    Ok(response) => set_text("auth-status", &response.message),
                    Err(err) => set_text("auth-status", &err.to_string()),
                }
            });
        })
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) -> Result<(), JsValue> {
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        // Visibility change (tab switch, minimize)
        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    let mut g = game.borrow_mut();
                    if g.state.phase == GamePhase::Running {
                        g.input.pause = true;
                        log::info!("Auto-paused (tab hidden)");
                    }
                }
            });
            document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            )?;
            closure.forget();
        }

        // Window blur (click outside)
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
            let mut g = game.borrow_mut();
            g.steering = Steering::default();
            if g.state.phase == GamePhase::Running && g.settings.pause_on_blur {
                g.input.pause = true;
                log::info!("Auto-paused (window blur)");
            }
        });
        window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        if let Err(err) = window.request_animation_frame(closure.as_ref().unchecked_ref()) {
            log::error!("requestAnimationFrame failed: {:?}", err);
        }
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                DEFAULT_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.render();
            g.update_hud();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() -> Result<(), JsValue> {
    wasm_game::run().await
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Doodle Jump (native) starting...");
    log::info!("Native mode runs a headless session - use `trunk serve` for the web version");

    let seed = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(12345);
    let score = headless::run(seed, 60 * 120);
    println!("Headless run (seed {seed}) finished with score {score}");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Autopiloted session for native smoke runs
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use doodle_jump::consts::DEFAULT_DT;
    use doodle_jump::highscores::BestScore;
    use doodle_jump::persistence::MemoryStore;
    use doodle_jump::sim::{GameEvent, GamePhase, GameState, TickInput, tick};

    /// Steer toward the nearest solid platform below the player's feet
    fn steer(state: &GameState) -> f32 {
        let body = state.player.rect();
        state
            .platforms
            .platforms
            .iter()
            .filter(|p| p.is_solid() && p.rect.top() >= body.bottom() - 5.0)
            .min_by(|a, b| a.rect.top().total_cmp(&b.rect.top()))
            .map(|p| ((p.rect.center().x - body.center().x) / 40.0).clamp(-1.0, 1.0))
            .unwrap_or(0.0)
    }

    /// Play up to `frames` frames and return the final score
    pub fn run(seed: u64, frames: u32) -> u64 {
        let mut state = GameState::new(seed);
        let mut store = MemoryStore::new();
        let mut best = BestScore::load(&store);

        let start = TickInput {
            start: true,
            ..Default::default()
        };
        tick(&mut state, &start, DEFAULT_DT);

        for _ in 0..frames {
            let input = TickInput {
                horizontal: steer(&state),
                ..Default::default()
            };
            for event in tick(&mut state, &input, DEFAULT_DT) {
                match event {
                    GameEvent::DifficultyIncreased(level) => log::info!("Level {level}"),
                    GameEvent::GameOver { score, cause } => {
                        log::info!("Game over ({cause:?}) at {:.1}s", state.elapsed);
                        if let Err(err) = best.record(&mut store, score) {
                            log::error!("Could not record best score: {err}");
                        }
                    }
                    _ => {}
                }
            }
            if state.phase == GamePhase::GameOver {
                break;
            }
        }
        state.score
    }
}
