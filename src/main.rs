//! Phi Junior entry point
//!
//! Handles platform-specific initialization and runs the event loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use wasm_bindgen::JsCast;
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::Element;

    use phi_junior::audio::WebTone;
    use phi_junior::consts::*;
    use phi_junior::game::{Cell, Event, GameController, GamePhase, Intent, PuzzleMeta, View};
    use phi_junior::persistence::LocalStorage;
    use phi_junior::platform::{Clock, SystemClock};
    use phi_junior::ports::Ports;
    use phi_junior::speech::WebSpeaker;
    use phi_junior::{AssetId, Catalog, GameError, Millis, PuzzleKind, Settings};

    const CATALOG_URL: &str = "data.json";

    /// Game instance shared by DOM and timer callbacks
    struct App {
        game: GameController,
        root: Element,
        /// Deadline a browser timeout is currently armed for
        armed: Option<Millis>,
    }

    type Shared = Rc<RefCell<App>>;

    /// Feed one event to the controller, re-arm the feedback timer, redraw
    fn dispatch(app: &Shared, event: Event) {
        let now = SystemClock.now_ms();
        app.borrow_mut().game.handle(event, now);
        arm_deadline(app, now);
        let app = app.borrow();
        app.root.set_inner_html(&render(&app.game.view()));
    }

    fn arm_deadline(app: &Shared, now: Millis) {
        let due = app.borrow().game.next_deadline();
        if due == app.borrow().armed {
            return;
        }
        app.borrow_mut().armed = due;

        let Some(due) = due else { return };
        let Some(window) = web_sys::window() else { return };
        let target = app.clone();
        let callback = Closure::once_into_js(move || {
            // Timers may fire a little early; the next dispatch must re-arm
            target.borrow_mut().armed = None;
            dispatch(&target, Event::Deadline);
        });
        let delay = due.saturating_sub(now) as i32;
        if window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
            .is_err()
        {
            log::warn!("Failed to arm feedback timer");
        }
    }

    async fn fetch_catalog(window: &web_sys::Window) -> phi_junior::Result<Catalog> {
        let fail = |e: JsValue| GameError::CatalogLoad(format!("{:?}", e));

        let response = JsFuture::from(window.fetch_with_str(CATALOG_URL))
            .await
            .map_err(fail)?;
        let response: web_sys::Response = response.dyn_into().map_err(fail)?;
        if !response.ok() {
            return Err(GameError::CatalogLoad(format!(
                "{} returned HTTP {}",
                CATALOG_URL,
                response.status()
            )));
        }

        let text = JsFuture::from(response.text().map_err(fail)?)
            .await
            .map_err(fail)?;
        let text = text
            .as_string()
            .ok_or_else(|| GameError::CatalogLoad("catalog body is not text".to_string()))?;
        Catalog::from_json(&text)
    }

    pub async fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;

        log::info!("Phi Junior starting...");

        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let root = match document.get_element_by_id("phi-junior") {
            Some(el) => el,
            None => {
                let el = document.create_element("div")?;
                el.set_id("phi-junior");
                document.body().ok_or("no body")?.append_child(&el)?;
                el
            }
        };

        let storage = LocalStorage::new();
        let settings = Settings::load(&storage);
        let ports = Ports::new(
            WebSpeaker::new(),
            WebTone::new(settings.effective_tone_volume()),
            storage,
        );

        let now = SystemClock.now_ms();
        let game = GameController::new(ports, &settings, Pcg32::seed_from_u64(now), now);
        log::info!("Game initialized with seed: {}", now);

        let app = Rc::new(RefCell::new(App {
            game,
            root: root.clone(),
            armed: None,
        }));
        root.set_inner_html(&render(&app.borrow().game.view()));

        setup_clicks(&root, app.clone())?;
        setup_clock(&window, app.clone())?;

        let event = match fetch_catalog(&window).await {
            Ok(catalog) => Event::CatalogLoaded(catalog),
            Err(e) => Event::CatalogFailed(e),
        };
        dispatch(&app, event);

        log::info!("Phi Junior running!");
        Ok(())
    }

    /// Buttons carry `data-action` (and `data-id` for answers); one delegated listener
    fn setup_clicks(root: &Element, app: Shared) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::Event| {
            let Some(target) = event.target().and_then(|t| t.dyn_into::<Element>().ok()) else {
                return;
            };
            let Ok(Some(button)) = target.closest("[data-action]") else {
                return;
            };
            let intent = match button.get_attribute("data-action").as_deref() {
                Some("start") => Intent::StartPuzzle,
                Some("answer") => match button.get_attribute("data-id") {
                    Some(id) => Intent::SubmitAnswer(AssetId::from(id.as_str())),
                    None => return,
                },
                _ => return,
            };
            dispatch(&app, intent.into());
        });
        root.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref())?;
        closure.forget();
        Ok(())
    }

    /// Regeneration clock
    fn setup_clock(window: &web_sys::Window, app: Shared) -> Result<(), JsValue> {
        let closure = Closure::<dyn FnMut()>::new(move || dispatch(&app, Event::ClockTick));
        window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            CLOCK_PERIOD_MS as i32,
        )?;
        closure.forget();
        Ok(())
    }

    fn escape(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
            .replace('"', "&quot;")
    }

    fn render(view: &View) -> String {
        if view.phase == GamePhase::Loading {
            return String::new();
        }
        let s = view.session;

        let mut html = format!(
            r#"<div class="game-container">
<div class="hud">
  <div><span class="lives">❤️ {}</span><span class="regen">{}</span></div>
  <div><div class="level">Puzzle {}</div><div class="streak"><div style="width:{}%"></div></div></div>
  <div class="score">⭐ {}</div>
</div>
<div class="content">"#,
            s.lives,
            escape(view.regen_display),
            s.level_index.saturating_add(1),
            s.streak.min(STREAK_TARGET) * 100 / STREAK_TARGET,
            s.score
        );

        match view.puzzle {
            None => html.push_str(
                r#"<div class="idle"><div class="logo">🧩</div><h1>Akademi Sage</h1>
<button data-action="start">MULAI PUZZLE</button></div>"#,
            ),
            Some(puzzle) => {
                html.push_str(&format!(
                    "<h2>{}</h2><div class=\"stage\">",
                    escape(&puzzle.schema.instruction)
                ));
                match (&puzzle.meta, puzzle.kind()) {
                    (PuzzleMeta::Grid(cells), _) => {
                        html.push_str("<div class=\"sudoku-grid\">");
                        for cell in cells {
                            let icon = match cell {
                                Cell::Icon(icon) => escape(icon),
                                Cell::Unknown => "?".to_string(),
                            };
                            html.push_str(&format!("<div class=\"sudoku-cell\">{}</div>", icon));
                        }
                        html.push_str("</div>");
                    }
                    (_, PuzzleKind::Symmetry) => html.push_str(&format!(
                        "<div class=\"symmetry-box\"><span class=\"symmetry-half\">{}</span></div>",
                        escape(&puzzle.target.icon)
                    )),
                    (_, PuzzleKind::Shadow) => html.push_str(&format!(
                        "<div class=\"mystery\"><span class=\"shadow\">{}</span></div>",
                        escape(&puzzle.target.icon)
                    )),
                    _ => html.push_str("<div class=\"mystery\">❓</div>"),
                }
                html.push_str("</div><div class=\"options\">");

                let glow = view.feedback == Some(phi_junior::game::Feedback::Correct);
                for option in &puzzle.options {
                    let class = if glow && puzzle.is_correct(&option.id) {
                        "btn-choice glow-gold"
                    } else {
                        "btn-choice"
                    };
                    html.push_str(&format!(
                        "<button class=\"{}\" data-action=\"answer\" data-id=\"{}\">{}</button>",
                        class,
                        escape(option.id.as_str()),
                        escape(&option.icon)
                    ));
                }
                html.push_str("</div>");
            }
        }
        html.push_str("</div>");

        if view.bonus_visible {
            html.push_str(r#"<div class="bonus"><div>🏆</div><h2>BONUS +50!</h2></div>"#);
        }
        html.push_str("</div>");
        html
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod terminal {
    use std::io::{self, BufRead};
    use std::sync::mpsc::{self, RecvTimeoutError};
    use std::thread;
    use std::time::Duration;

    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    use phi_junior::audio::ConsoleTone;
    use phi_junior::consts::*;
    use phi_junior::game::{Cell, Event, Feedback, GameController, GamePhase, Intent, PuzzleMeta, View};
    use phi_junior::persistence::{FileStorage, Storage};
    use phi_junior::platform::{Clock, SystemClock};
    use phi_junior::ports::Ports;
    use phi_junior::speech::ConsoleSpeaker;
    use phi_junior::{Catalog, PuzzleKind, Settings};

    /// Catalog path (default `data/catalog.json`)
    const CATALOG_ENV: &str = "PHI_JUNIOR_CATALOG";
    /// Save directory (default: current directory)
    const DATA_ENV: &str = "PHI_JUNIOR_DATA";

    enum Message {
        Event(Event),
        Line(String),
    }

    enum Command {
        Intent(Intent),
        Redraw,
        Quit,
        Unknown,
    }

    pub fn run() -> phi_junior::Result<()> {
        let catalog_path =
            std::env::var(CATALOG_ENV).unwrap_or_else(|_| "data/catalog.json".to_string());
        let data_dir = std::env::var(DATA_ENV).unwrap_or_else(|_| ".".to_string());

        let clock = SystemClock;
        let mut storage = FileStorage::open(&data_dir)?;
        let settings = Settings::load(&storage);
        // First run: leave an editable settings file next to the save
        if storage.read(SETTINGS_KEY).is_none() {
            settings.save(&mut storage);
        }
        let tone = ConsoleTone {
            muted: settings.effective_tone_volume() <= 0.0,
        };
        let ports = Ports::new(ConsoleSpeaker, tone, storage);

        let seed = clock.now_ms();
        let mut game = GameController::new(ports, &settings, Pcg32::seed_from_u64(seed), seed);
        log::info!("Game initialized with seed: {}", seed);

        let (tx, rx) = mpsc::channel();

        // One-shot catalog load
        {
            let tx = tx.clone();
            thread::spawn(move || {
                let event = match Catalog::load(&catalog_path) {
                    Ok(catalog) => Event::CatalogLoaded(catalog),
                    Err(e) => Event::CatalogFailed(e),
                };
                let _ = tx.send(Message::Event(event));
            });
        }

        // Keyboard input; EOF disconnects the channel and ends the loop
        thread::spawn(move || {
            for line in io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                if tx.send(Message::Line(line)).is_err() {
                    break;
                }
            }
        });

        let mut next_tick = clock.now_ms() + CLOCK_PERIOD_MS;
        let mut shown = (game.phase(), game.session().lives);
        render(&game.view());

        loop {
            let now = clock.now_ms();
            let wake_at = game.next_deadline().map_or(next_tick, |d| d.min(next_tick));
            let timeout = Duration::from_millis(wake_at.saturating_sub(now));

            let redraw = match rx.recv_timeout(timeout) {
                Ok(Message::Event(event)) => {
                    game.handle(event, clock.now_ms());
                    true
                }
                Ok(Message::Line(line)) => {
                    let command = parse_command(&line, &game.view());
                    match command {
                        Command::Quit => break,
                        Command::Intent(intent) => {
                            game.handle(intent.into(), clock.now_ms());
                            true
                        }
                        Command::Redraw => true,
                        Command::Unknown => {
                            println!("s = mulai, 1-3 = jawab, q = keluar");
                            false
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => {
                    let now = clock.now_ms();
                    if now >= next_tick {
                        next_tick = now + CLOCK_PERIOD_MS;
                        game.handle(Event::ClockTick, now);
                    } else {
                        game.handle(Event::Deadline, now);
                    }
                    // Countdown alone does not warrant a redraw every second
                    (game.phase(), game.session().lives) != shown
                }
                Err(RecvTimeoutError::Disconnected) => break,
            };

            if redraw {
                render(&game.view());
                shown = (game.phase(), game.session().lives);
            }
        }

        log::info!("Phi Junior stopped");
        Ok(())
    }

    fn parse_command(line: &str, view: &View) -> Command {
        match line.trim() {
            "q" | "quit" => Command::Quit,
            "s" | "start" | "mulai" => Command::Intent(Intent::StartPuzzle),
            "" => Command::Redraw,
            other => {
                let option = other
                    .parse::<usize>()
                    .ok()
                    .and_then(|n| n.checked_sub(1))
                    .and_then(|i| view.puzzle.and_then(|p| p.options.get(i)));
                match option {
                    Some(asset) => Command::Intent(Intent::SubmitAnswer(asset.id.clone())),
                    None => Command::Unknown,
                }
            }
        }
    }

    fn render(view: &View) {
        if view.phase == GamePhase::Loading {
            println!("⏳ ...");
            return;
        }
        let s = view.session;
        let filled = s.streak.min(STREAK_TARGET) as usize;
        let bar = format!(
            "{}{}",
            "▮".repeat(filled),
            "▯".repeat(STREAK_TARGET as usize - filled)
        );
        let regen = if view.regen_display.is_empty() {
            String::new()
        } else {
            format!(" ({})", view.regen_display)
        };
        println!();
        println!(
            "❤️ {}{} | Puzzle {} {} | ⭐ {}",
            s.lives,
            regen,
            s.level_index.saturating_add(1),
            bar,
            s.score
        );

        let Some(puzzle) = view.puzzle else {
            println!("🧩 Akademi Sage - ketik 's' untuk MULAI PUZZLE");
            return;
        };

        println!("{}", puzzle.schema.instruction);
        match (&puzzle.meta, puzzle.kind()) {
            (PuzzleMeta::Grid(cells), _) => {
                let icons: Vec<&str> = cells
                    .iter()
                    .map(|c| match c {
                        Cell::Icon(icon) => icon.as_str(),
                        Cell::Unknown => "?",
                    })
                    .collect();
                println!("  {} {}", icons[0], icons[1]);
                println!("  {} {}", icons[2], icons[3]);
            }
            (_, PuzzleKind::Symmetry) => println!("  {} |", puzzle.target.icon),
            (_, PuzzleKind::Shadow) => println!("  ▓▓"),
            _ => println!("  ❓"),
        }

        let options: Vec<String> = puzzle
            .options
            .iter()
            .enumerate()
            .map(|(i, a)| format!("{}) {}", i + 1, a.icon))
            .collect();
        println!("  {}", options.join("   "));

        match view.feedback {
            Some(Feedback::Correct) if view.bonus_visible => println!("🏆 BONUS +50!"),
            Some(Feedback::Correct) => println!("✅ Hebat!"),
            Some(Feedback::Wrong) => println!("❌"),
            None => {}
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    if let Err(e) = wasm_game::run().await {
        web_sys::console::error_1(&e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Phi Junior (native) starting...");

    if let Err(e) = terminal::run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
