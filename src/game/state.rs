//! Session state and core game types
//!
//! Everything that survives a restart lives in [`SessionState`].

use serde::{Deserialize, Serialize};

use crate::Millis;
use crate::consts::*;
use crate::error::{GameError, Result};

/// Current phase of the puzzle loop (never persisted)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GamePhase {
    /// Waiting for the catalog
    #[default]
    Loading,
    /// Start screen, waiting for "start puzzle"
    Idle,
    /// A puzzle is shown and answers are accepted
    Playing,
    /// Correct answer celebration
    FeedbackCorrect,
    /// Wrong answer flash (same puzzle comes back)
    FeedbackWrong,
    /// Correct answer that completed the streak; bonus overlay is up
    BonusDisplay,
}

impl GamePhase {
    /// Answer feedback currently on screen, if any
    pub fn feedback(&self) -> Option<Feedback> {
        match self {
            GamePhase::FeedbackCorrect | GamePhase::BonusDisplay => Some(Feedback::Correct),
            GamePhase::FeedbackWrong => Some(Feedback::Wrong),
            _ => None,
        }
    }
}

/// Feedback signal shown after an answer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feedback {
    Correct,
    Wrong,
}

/// Persistent player record
///
/// Field names on disk match the web app's save format so older saves load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionState {
    /// Total score
    pub score: u64,
    /// Remaining lives, always within `0..=MAX_LIVES`
    pub lives: u8,
    /// Puzzles solved so far (0-based puzzle number)
    #[serde(rename = "levelIdx", alias = "levelIndex")]
    pub level_index: u32,
    /// Consecutive correct answers since the last miss or bonus
    pub streak: u32,
    /// When the regeneration countdown started; present iff `lives < MAX_LIVES`
    #[serde(rename = "lastLifeLost", alias = "lastLifeLostAt", default)]
    pub last_life_lost_at: Option<Millis>,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            score: 0,
            lives: MAX_LIVES,
            level_index: 0,
            streak: 0,
            last_life_lost_at: None,
        }
    }
}

impl SessionState {
    /// Parse a saved record
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| GameError::PersistenceCorrupt(e.to_string()))
    }

    pub fn to_json(&self) -> String {
        // Plain struct of integers; serialization cannot fail
        serde_json::to_string(self).unwrap_or_default()
    }

    /// Rebuild the session from whatever storage held at startup.
    ///
    /// Missing or unreadable saves fall back to a fresh session.
    pub fn restore(saved: Option<&str>, now: Millis) -> Self {
        let mut state = match saved {
            Some(json) => match Self::from_json(json) {
                Ok(state) => {
                    log::info!(
                        "Restored session: score {}, lives {}, puzzle {}",
                        state.score,
                        state.lives,
                        state.level_index.saturating_add(1)
                    );
                    state
                }
                Err(e) => {
                    log::warn!("{}; starting fresh", e);
                    Self::default()
                }
            },
            None => {
                log::info!("No saved session, starting fresh");
                Self::default()
            }
        };
        state.normalize(now);
        state
    }

    /// Re-establish the lives/timestamp invariants on a loaded record
    pub fn normalize(&mut self, now: Millis) {
        self.lives = self.lives.min(MAX_LIVES);
        // A streak past the target could never hit the bonus again
        if self.streak >= STREAK_TARGET {
            self.streak = 0;
        }
        if self.lives == MAX_LIVES {
            self.last_life_lost_at = None;
        } else if self.last_life_lost_at.is_none() {
            self.last_life_lost_at = Some(now);
        }
    }

    pub fn has_full_lives(&self) -> bool {
        self.lives >= MAX_LIVES
    }

    /// Wrong answer: lose a life (floored at 0) and break the streak.
    ///
    /// The countdown only starts when leaving full lives; later losses keep it.
    pub fn lose_life(&mut self, now: Millis) {
        if self.has_full_lives() {
            self.last_life_lost_at = Some(now);
        }
        self.lives = self.lives.saturating_sub(1);
        self.streak = 0;
    }

    /// Would the next correct answer complete the streak?
    pub fn next_answer_earns_bonus(&self) -> bool {
        self.streak.saturating_add(1) == STREAK_TARGET
    }

    /// Apply a resolved correct answer; returns the points awarded
    pub fn award(&mut self, bonus: bool) -> u64 {
        let points = if bonus {
            BASE_POINTS + STREAK_BONUS_POINTS
        } else {
            BASE_POINTS
        };
        self.score = self.score.saturating_add(points);
        self.level_index = self.level_index.saturating_add(1);
        self.streak = if bonus { 0 } else { self.streak.saturating_add(1) };
        points
    }
}
