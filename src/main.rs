//! Lane Rush entry point
//!
//! Handles platform-specific initialization and drives the session.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{
        CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlInputElement, KeyboardEvent,
        TouchEvent,
    };

    use lane_rush::audio::AudioManager;
    use lane_rush::consts::*;
    use lane_rush::platform::default_store;
    use lane_rush::records::RecordStore;
    use lane_rush::sim::{
        BlockStatus, Difficulty, EndReason, GamePhase, GameEvent, GameSession, HitZone,
        lane_for_key,
    };
    use lane_rush::{Settings, format_accuracy};

    const LANE_KEY_IDS: [&str; LANE_COUNT] = ["keyQ", "keyW", "keyE", "keyR"];

    /// Game instance holding all state
    struct Game {
        session: GameSession,
        records: RecordStore,
        settings: Settings,
        audio: AudioManager,
        ctx: CanvasRenderingContext2d,
        canvas: HtmlCanvasElement,
        document: Document,
    }

    impl Game {
        fn now() -> f64 {
            js_sys::Date::now()
        }

        fn toggle(&mut self) {
            self.audio.resume();
            let seed = Self::now() as u64;
            if self.session.toggle(seed) {
                self.update_screens();
            }
        }

        fn mode_button(&mut self) {
            if self.session.mode_button() {
                self.update_screens();
            }
        }

        fn set_difficulty(&mut self, difficulty: Difficulty) {
            if self.session.set_difficulty(difficulty) {
                self.settings.difficulty = difficulty;
                self.save_settings();
                if let Ok(buttons) = self.document.query_selector_all(".diff-btn") {
                    for i in 0..buttons.length() {
                        let Some(node) = buttons.item(i) else { continue };
                        let Ok(el) = node.dyn_into::<web_sys::Element>() else {
                            continue;
                        };
                        let active = el.get_attribute("data-difficulty").as_deref()
                            == Some(difficulty.as_str());
                        let _ = el.class_list().toggle_with_force("active", active);
                    }
                }
            }
        }

        fn toggle_mute(&mut self) {
            self.settings.toggle_mute();
            self.apply_volume();
            self.save_settings();
        }

        fn set_volume(&mut self, volume: f32) {
            self.settings.set_volume(volume);
            self.apply_volume();
            self.save_settings();
        }

        fn apply_volume(&mut self) {
            self.audio.set_volume(self.settings.effective_volume());
            if let Some(el) = self.document.get_element_by_id("muteBtn") {
                let label = if self.settings.muted { "Unmute" } else { "Mute" };
                el.set_text_content(Some(label));
            }
        }

        fn save_settings(&self) {
            let mut store = default_store();
            self.settings.save(store.as_mut());
        }

        fn key_down(&mut self, key: char) {
            if let Some(lane) = lane_for_key(key) {
                self.highlight_key(lane, true);
            }
            self.session.key_down(key, Self::now());
            self.flush_events();
        }

        fn tap(&mut self, x: f32) {
            let width = self.canvas.client_width() as f32;
            if let Some(lane) = lane_rush::sim::lane_at_x(x, width) {
                self.highlight_key(lane, true);
            }
            self.session.tap(x, width, Self::now());
            self.flush_events();
        }

        fn highlight_key(&self, lane: usize, on: bool) {
            if let Some(el) = self.document.get_element_by_id(LANE_KEY_IDS[lane]) {
                let _ = el.class_list().toggle_with_force("active", on);
            }
        }

        /// Run one animation frame
        fn frame(&mut self) {
            if let Some(summary) = self.session.frame(Self::now()) {
                self.records.append_summary(&summary);
                self.update_screens();
                self.render_records();
            }
            self.flush_events();
            self.draw();
            self.update_hud();
        }

        /// Route queued events to audio and the feedback banner
        fn flush_events(&mut self) {
            for event in self.session.drain_events() {
                if let Some(cue) = event.sound_cue() {
                    self.audio.play(cue);
                }
                if let GameEvent::TimeTick { time_left } = event {
                    self.set_time(time_left);
                }
                if let Some((text, style)) = event.feedback() {
                    if let Some(el) = self.document.get_element_by_id("comboDisplay") {
                        el.set_text_content(Some(text));
                        let _ = el.set_attribute("class", &format!("combo {}", style.as_str()));
                    }
                }
            }
        }

        fn draw(&self) {
            let ctx = &self.ctx;
            let state = self.session.render_state();
            let sx = self.canvas.width() as f64 / FIELD_WIDTH as f64;
            let sy = self.canvas.height() as f64 / FIELD_HEIGHT as f64;
            let _ = ctx.set_transform(sx, 0.0, 0.0, sy, 0.0, 0.0);

            ctx.set_fill_style_str("#0f0c29");
            ctx.fill_rect(0.0, 0.0, FIELD_WIDTH as f64, FIELD_HEIGHT as f64);

            for lane in self.session.lanes() {
                ctx.set_global_alpha(0.1);
                ctx.set_fill_style_str(lane.color);
                ctx.fill_rect(lane.x as f64, 0.0, lane.width as f64, FIELD_HEIGHT as f64);
                ctx.set_global_alpha(1.0);
                ctx.set_font("bold 28px Arial");
                ctx.set_text_align("center");
                let label = lane.key.to_ascii_uppercase().to_string();
                let _ = ctx.fill_text(&label, lane.center_x() as f64, FIELD_HEIGHT as f64 - 20.0);
            }

            let zone = HitZone::for_field(FIELD_HEIGHT);
            ctx.set_global_alpha(0.4);
            ctx.set_fill_style_str("#00ff88");
            ctx.fill_rect(0.0, zone.top as f64, FIELD_WIDTH as f64, zone.height as f64);
            ctx.set_global_alpha(1.0);

            for block in &state.blocks {
                ctx.set_fill_style_str(block.color);
                ctx.fill_rect(
                    block.pos.x as f64 + 2.0,
                    block.pos.y as f64,
                    block.size.x as f64 - 4.0,
                    block.size.y as f64,
                );
                let overlay = match block.status {
                    BlockStatus::Live => None,
                    BlockStatus::Hit => Some("rgba(255, 255, 255, 0.6)"),
                    BlockStatus::Missed => Some("rgba(0, 0, 0, 0.6)"),
                };
                if let Some(overlay) = overlay {
                    ctx.set_fill_style_str(overlay);
                    ctx.fill_rect(
                        block.pos.x as f64 + 2.0,
                        block.pos.y as f64,
                        block.size.x as f64 - 4.0,
                        block.size.y as f64,
                    );
                }
            }

            if state.show_combo_banner {
                ctx.set_fill_style_str("#ffcc00");
                ctx.set_font("bold 50px Arial");
                let _ = ctx.fill_text(
                    &format!("{} COMBO!", state.combo),
                    FIELD_WIDTH as f64 / 2.0,
                    FIELD_HEIGHT as f64 / 2.0 - 50.0,
                );
            }

            if state.paused {
                ctx.set_fill_style_str("rgba(0, 0, 0, 0.85)");
                ctx.fill_rect(0.0, 0.0, FIELD_WIDTH as f64, FIELD_HEIGHT as f64);
                ctx.set_fill_style_str("white");
                ctx.set_font("bold 40px Arial");
                let _ = ctx.fill_text(
                    "PAUSED",
                    FIELD_WIDTH as f64 / 2.0,
                    FIELD_HEIGHT as f64 / 2.0,
                );
            }
        }

        /// Update HUD elements in DOM
        fn update_hud(&self) {
            let score = self.session.score();
            let set = |id: &str, text: &str| {
                if let Some(el) = self.document.get_element_by_id(id) {
                    el.set_text_content(Some(text));
                }
            };
            set("score", &score.score.to_string());
            set("combo", &format!("{}x", score.combo));
            set("accuracy", &format_accuracy(score.accuracy()));
        }

        fn set_time(&self, time_left: u32) {
            if let Some(el) = self.document.get_element_by_id("time") {
                el.set_text_content(Some(&format!("{}s", time_left)));
            }
        }

        /// Show/hide overlays and relabel buttons after a phase change
        fn update_screens(&self) {
            let show = |id: &str, visible: bool| {
                if let Some(el) = self.document.get_element_by_id(id) {
                    let _ = el.class_list().toggle_with_force("hidden", !visible);
                }
            };

            let phase = self.session.phase();
            let finished = phase == GamePhase::GameOver
                && self.session.end_reason() == Some(EndReason::TimeUp);
            let menu = phase == GamePhase::Start || (phase == GamePhase::GameOver && !finished);
            show("startScreen", menu);
            show("gameOverScreen", finished);
            self.set_time(self.session.time_left());

            if let Some(summary) = self.session.summary().filter(|_| finished) {
                let set = |id: &str, text: &str| {
                    if let Some(el) = self.document.get_element_by_id(id) {
                        el.set_text_content(Some(text));
                    }
                };
                set("finalScore", &summary.score.to_string());
                set("finalCombo", &summary.max_combo.to_string());
                set("finalAccuracy", &format_accuracy(summary.accuracy));
                set("finalDifficulty", summary.difficulty.display_name());
            }

            if let Some(el) = self.document.get_element_by_id("startBtn") {
                el.set_text_content(Some(self.session.start_label()));
            }
            if let Some(el) = self.document.get_element_by_id("modeBtn") {
                el.set_text_content(Some(self.session.mode_label()));
                let active = matches!(phase, GamePhase::Playing | GamePhase::Paused);
                let _ = el.class_list().toggle_with_force("end-btn", active);
            }
        }

        fn render_records(&self) {
            let Some(list) = self.document.get_element_by_id("recordsList") else {
                return;
            };
            let records = self.records.list_all();
            if records.is_empty() {
                list.set_inner_html("<div class=\"no-records\">No records yet</div>");
                return;
            }
            let html: String = records
                .iter()
                .map(|r| {
                    format!(
                        "<div class=\"record-item\" data-id=\"{id}\">\
                         <span>{score}</span><span>{combo}</span>\
                         <span>{acc}</span><span>{diff}</span>\
                         <div class=\"record-date\">{date} {time}</div>\
                         <button class=\"delete-btn\" data-id=\"{id}\">Delete</button></div>",
                        id = r.id,
                        score = r.score,
                        combo = r.max_combo,
                        acc = r.accuracy_label(),
                        diff = r.difficulty.display_name(),
                        date = r.date,
                        time = r.time,
                    )
                })
                .collect();
            list.set_inner_html(&html);
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Lane Rush starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("gameCanvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");
        canvas.set_width(canvas.client_width() as u32);
        canvas.set_height(canvas.client_height() as u32);

        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")
            .ok()
            .flatten()
            .expect("no 2d context")
            .dyn_into()
            .expect("not a 2d context");

        let settings = Settings::load(default_store().as_ref());
        let audio = AudioManager::new();

        let game = Rc::new(RefCell::new(Game {
            session: GameSession::new(settings.difficulty),
            records: RecordStore::open(default_store()),
            settings,
            audio,
            ctx,
            canvas: canvas.clone(),
            document: document.clone(),
        }));

        {
            let g = game.borrow();
            g.update_screens();
            g.render_records();
            g.update_hud();
        }
        game.borrow_mut().apply_volume();

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(&document, game.clone());
        setup_auto_pause(game.clone());

        request_animation_frame(game);

        log::info!("Lane Rush running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Keyboard
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key().to_lowercase();
                let mut chars = key.chars();
                if let (Some(c), None) = (chars.next(), chars.next()) {
                    game.borrow_mut().key_down(c);
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key release only clears the highlight
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let key = event.key().to_lowercase();
                if let Some(lane) = key.chars().next().and_then(lane_for_key) {
                    game.borrow().highlight_key(lane, false);
                }
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x = touch.client_x() as f32 - rect.left() as f32;
                    game.borrow_mut().tap(x);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch end
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let g = game.borrow();
                for lane in 0..LANE_COUNT {
                    g.highlight_key(lane, false);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchend", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn on_click(document: &Document, id: &str, handler: impl FnMut(web_sys::MouseEvent) + 'static) {
        if let Some(btn) = document.get_element_by_id(id) {
            let closure = Closure::<dyn FnMut(_)>::new(handler);
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(document: &Document, game: Rc<RefCell<Game>>) {
        {
            let game = game.clone();
            on_click(document, "startBtn", move |_| game.borrow_mut().toggle());
        }
        {
            let game = game.clone();
            on_click(document, "modeBtn", move |_| game.borrow_mut().mode_button());
        }
        {
            let game = game.clone();
            on_click(document, "muteBtn", move |_| game.borrow_mut().toggle_mute());
        }

        // Volume slider (0 - 100)
        if let Some(slider) = document
            .get_element_by_id("volumeSlider")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        {
            let percent = (game.borrow().settings.volume * 100.0).round();
            slider.set_value(&percent.to_string());
            let game = game.clone();
            let slider_clone = slider.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if let Ok(value) = slider_clone.value().parse::<f32>() {
                    game.borrow_mut().set_volume(value / 100.0);
                }
            });
            let _ =
                slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Difficulty selector
        if let Ok(buttons) = document.query_selector_all(".diff-btn") {
            for i in 0..buttons.length() {
                let Some(node) = buttons.item(i) else { continue };
                let Ok(el) = node.dyn_into::<web_sys::Element>() else {
                    continue;
                };
                let Some(difficulty) = el
                    .get_attribute("data-difficulty")
                    .and_then(|d| Difficulty::from_str(&d))
                else {
                    continue;
                };
                let game = game.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                    game.borrow_mut().set_difficulty(difficulty);
                });
                let _ =
                    el.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        // Record deletion (delegated from the list)
        if let Some(list) = document.get_element_by_id("recordsList") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::MouseEvent| {
                let Some(target) = event
                    .target()
                    .and_then(|t| t.dyn_into::<web_sys::Element>().ok())
                else {
                    return;
                };
                if !target.class_list().contains("delete-btn") {
                    return;
                }
                let Some(id) = target
                    .get_attribute("data-id")
                    .and_then(|id| id.parse::<u64>().ok())
                else {
                    return;
                };
                let mut g = game.borrow_mut();
                g.records.delete_by_id(id);
                g.render_records();
            });
            let _ =
                list.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        on_click(document, "clearRecordsBtn", move |_| {
            let confirmed = web_sys::window()
                .and_then(|w| w.confirm_with_message("Clear all records?").ok())
                .unwrap_or(false);
            if confirmed {
                let mut g = game.borrow_mut();
                g.records.clear_all();
                g.render_records();
            }
        });
    }

    fn setup_auto_pause(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Window blur (tab switch, click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur {
                    g.audio.set_volume(0.0);
                }
                if g.settings.auto_pause && g.session.pause() {
                    g.update_screens();
                    log::info!("Auto-paused (window blur)");
                }
            });
            let _ =
                window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Focus restores volume; the run stays paused until the player resumes
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                let volume = g.settings.effective_volume();
                g.audio.set_volume(volume);
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |_time: f64| {
            game_loop(game);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>) {
        game.borrow_mut().frame();

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Lane Rush (native) starting...");
    log::info!("Native mode runs a headless autoplay demo - use `trunk serve` for the web version");

    let difficulty = std::env::args()
        .nth(1)
        .and_then(|arg| lane_rush::sim::Difficulty::from_str(&arg))
        .unwrap_or_default();
    demo::run(difficulty);
}

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use std::time::{SystemTime, UNIX_EPOCH};

    use lane_rush::consts::FIELD_HEIGHT;
    use lane_rush::platform::default_store;
    use lane_rush::records::RecordStore;
    use lane_rush::sim::{Difficulty, GameSession, HitZone, key_for_lane};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// The autoplayer presses once a block bottom is this close to the zone center
    const AUTOPLAY_TOLERANCE: f32 = 4.0;

    pub fn run(difficulty: Difficulty) {
        let epoch_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as f64)
            .unwrap_or(0.0);

        let mut records = RecordStore::open(default_store());
        let mut session = GameSession::new(difficulty);
        let zone = HitZone::for_field(FIELD_HEIGHT);
        session.start(epoch_ms as u64);

        let mut now = epoch_ms;
        let summary = loop {
            if let Some(summary) = session.frame(now) {
                break summary;
            }

            let ready: Vec<usize> = session
                .field()
                .blocks()
                .iter()
                .filter(|b| b.is_live() && (b.bottom() - zone.center()).abs() <= AUTOPLAY_TOLERANCE)
                .map(|b| b.lane)
                .collect();
            for lane in ready {
                if let Some(key) = key_for_lane(lane) {
                    session.key_down(key, now);
                }
            }
            session.drain_events();
            now += FRAME_MS;
        };

        records.append_summary(&summary);

        println!("Difficulty:   {}", summary.difficulty.display_name());
        println!("Score:        {}", summary.score);
        println!("Max combo:    {}", summary.max_combo);
        println!("Accuracy:     {}", lane_rush::format_accuracy(summary.accuracy));
        println!(
            "Ratings:      {} perfect / {} good / {} late / {} miss",
            summary.tally.perfect, summary.tally.good, summary.tally.late, summary.tally.miss
        );
        if let Some(mean) = summary.mean_reaction_ms {
            println!("Mean reaction: {:.0} ms", mean);
        }
        for record in records.list_all() {
            println!("  #{} {} {}  {}", record.id, record.date, record.time, record.score);
        }
    }
}
