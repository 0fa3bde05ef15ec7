//! Game controller: the phase state machine
//!
//! Single owner of the session record. Every input (catalog arrival, clock
//! tick, timer deadline, child's tap) arrives through [`GameController::handle`]
//! with the current time, so updates never interleave.

use rand::Rng;
use rand_pcg::Pcg32;

use super::puzzle::{PuzzleInstance, generate};
use super::state::{Feedback, GamePhase, SessionState};
use super::tick::{Regen, regenerate};
use crate::Millis;
use crate::catalog::{AssetId, Catalog};
use crate::consts::*;
use crate::error::GameError;
use crate::ports::Ports;
use crate::settings::Settings;
use crate::speech::Voice;

/// What the child asked for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    StartPuzzle,
    SubmitAnswer(AssetId),
}

/// Everything the controller reacts to
#[derive(Debug)]
pub enum Event {
    CatalogLoaded(Catalog),
    CatalogFailed(GameError),
    /// Regeneration clock period elapsed
    ClockTick,
    /// A timer armed from `next_deadline` fired
    Deadline,
    Intent(Intent),
}

impl From<Intent> for Event {
    fn from(intent: Intent) -> Self {
        Event::Intent(intent)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Completion {
    /// Score the answer and go back to the start screen
    ResolveCorrect { bonus: bool },
    /// Drop the wrong-answer flash; same puzzle again
    ClearWrong,
}

#[derive(Debug, Clone, Copy)]
struct Pending {
    due_at: Millis,
    completion: Completion,
}

/// Snapshot for the presentation layer
#[derive(Debug, Clone, Copy)]
pub struct View<'a> {
    pub phase: GamePhase,
    pub session: &'a SessionState,
    pub puzzle: Option<&'a PuzzleInstance>,
    pub feedback: Option<Feedback>,
    /// Time until the next life (`m:ss`), empty when lives are full
    pub regen_display: &'a str,
    pub bonus_visible: bool,
}

pub struct GameController<R = Pcg32> {
    phase: GamePhase,
    session: SessionState,
    catalog: Option<Catalog>,
    puzzle: Option<PuzzleInstance>,
    /// At most one deferred completion; answers are ignored while it is armed
    pending: Option<Pending>,
    regen_display: String,
    voice: Voice,
    speech_enabled: bool,
    rng: R,
    ports: Ports,
}

impl<R: Rng> GameController<R> {
    /// Restore the session from storage and wait for the catalog
    pub fn new(ports: Ports, settings: &Settings, rng: R, now: Millis) -> Self {
        let saved = ports.storage.read(SAVE_KEY);
        let session = SessionState::restore(saved.as_deref(), now);

        let mut controller = Self {
            phase: GamePhase::Loading,
            session,
            catalog: None,
            puzzle: None,
            pending: None,
            regen_display: String::new(),
            voice: settings.voice.clone(),
            speech_enabled: settings.speech_enabled,
            rng,
            ports,
        };
        controller.on_clock(now);
        controller.persist();
        controller
    }

    /// Apply one event at time `now`.
    ///
    /// An overdue feedback completion is applied first so it is never
    /// reordered against later input.
    pub fn handle(&mut self, event: Event, now: Millis) {
        self.fire_due(now);

        match event {
            Event::CatalogLoaded(catalog) => self.on_catalog(catalog),
            Event::CatalogFailed(e) => {
                log::error!("{}; waiting in loading", e);
            }
            Event::ClockTick => self.on_clock(now),
            Event::Deadline => {}
            Event::Intent(Intent::StartPuzzle) => self.start_puzzle(),
            Event::Intent(Intent::SubmitAnswer(id)) => self.submit_answer(&id, now),
        }
    }

    /// When the armed feedback completion is due, if any
    pub fn next_deadline(&self) -> Option<Millis> {
        self.pending.map(|p| p.due_at)
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn puzzle(&self) -> Option<&PuzzleInstance> {
        self.puzzle.as_ref()
    }

    pub fn view(&self) -> View<'_> {
        View {
            phase: self.phase,
            session: &self.session,
            puzzle: self.puzzle.as_ref(),
            feedback: self.phase.feedback(),
            regen_display: &self.regen_display,
            bonus_visible: self.phase == GamePhase::BonusDisplay,
        }
    }

    fn on_catalog(&mut self, catalog: Catalog) {
        if self.phase != GamePhase::Loading {
            log::warn!("Catalog arrived twice; keeping the first one");
            return;
        }
        if let Err(e) = catalog.check() {
            log::error!("{}; puzzles will be skipped", e);
        }
        log::info!(
            "Catalog ready: {} schemas, {} assets",
            catalog.schemas.len(),
            catalog.assets.len()
        );
        self.catalog = Some(catalog);
        self.phase = GamePhase::Idle;
    }

    fn on_clock(&mut self, now: Millis) {
        let regen = regenerate(&mut self.session, now);
        if let Regen::Restored { lives } = regen {
            log::info!("Life regenerated ({} / {})", lives, MAX_LIVES);
            self.persist();
        }
        self.regen_display = regen.display();
    }

    fn start_puzzle(&mut self) {
        if self.phase != GamePhase::Idle {
            log::debug!("Ignoring start during {:?}", self.phase);
            return;
        }
        if self.session.lives == 0 {
            self.speak(REST_PROMPT);
            return;
        }
        let Some(catalog) = &self.catalog else {
            return;
        };

        match generate(catalog, &mut self.rng) {
            Ok(puzzle) => {
                let instruction = puzzle.schema.instruction.clone();
                self.puzzle = Some(puzzle);
                self.phase = GamePhase::Playing;
                self.speak(&instruction);
            }
            Err(e) => log::error!("Skipping puzzle: {}", e),
        }
    }

    fn submit_answer(&mut self, id: &AssetId, now: Millis) {
        if self.phase != GamePhase::Playing {
            log::debug!("Ignoring answer during {:?}", self.phase);
            return;
        }
        let Some(puzzle) = &self.puzzle else {
            return;
        };
        if puzzle.option(id).is_none() {
            log::warn!("Answer {} is not one of the options", id);
            return;
        }

        if puzzle.is_correct(id) {
            self.ports.tone.play_tone(true);
            let bonus = self.session.next_answer_earns_bonus();
            self.phase = if bonus {
                GamePhase::BonusDisplay
            } else {
                GamePhase::FeedbackCorrect
            };
            self.arm(now + CORRECT_FEEDBACK_MS, Completion::ResolveCorrect { bonus });
        } else {
            self.ports.tone.play_tone(false);
            self.session.lose_life(now);
            log::info!("Wrong answer, {} lives left", self.session.lives);
            self.persist();
            self.on_clock(now);
            self.speak(RETRY_PROMPT);
            self.phase = GamePhase::FeedbackWrong;
            self.arm(now + WRONG_FEEDBACK_MS, Completion::ClearWrong);
        }
    }

    fn arm(&mut self, due_at: Millis, completion: Completion) {
        self.pending = Some(Pending { due_at, completion });
    }

    fn fire_due(&mut self, now: Millis) {
        if !matches!(self.pending, Some(p) if p.due_at <= now) {
            return;
        }
        let Some(pending) = self.pending.take() else {
            return;
        };

        match pending.completion {
            Completion::ResolveCorrect { bonus } => {
                let points = self.session.award(bonus);
                if bonus {
                    log::info!("Streak bonus! +{}", points);
                }
                self.persist();
                self.puzzle = None;
                self.phase = GamePhase::Idle;
            }
            Completion::ClearWrong => {
                self.phase = GamePhase::Playing;
            }
        }
    }

    fn speak(&mut self, text: &str) {
        if self.speech_enabled {
            self.ports.speaker.speak(text, &self.voice);
        }
    }

    fn persist(&mut self) {
        self.ports.storage.write(SAVE_KEY, self.session.to_json());
    }
}
