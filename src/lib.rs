//! Phi Junior - A gentle puzzle loop for young children
//!
//! Core modules:
//! - `catalog`: Puzzle schemas and assets loaded once at startup
//! - `game`: Session state, life regeneration, puzzle generation and the phase machine
//! - `ports`: Capability bundle (speech, tone, storage) injected into the controller
//! - `persistence`: Key-value storage adapters
//! - `platform`: Clock abstraction
//! - `settings`: Voice and audio preferences

pub mod audio;
pub mod catalog;
pub mod error;
pub mod game;
pub mod persistence;
pub mod platform;
pub mod ports;
pub mod settings;
pub mod speech;

pub use catalog::{Asset, AssetId, Catalog, PuzzleKind, PuzzleSchema};
pub use error::{GameError, Result};
pub use settings::Settings;

/// Wall-clock timestamp in milliseconds since the Unix epoch
pub type Millis = u64;

/// Game configuration constants
pub mod consts {
    use crate::Millis;

    /// Lives cap (a fresh session starts full)
    pub const MAX_LIVES: u8 = 3;
    /// One life comes back after this long (10 minutes)
    pub const REGEN_INTERVAL_MS: Millis = 600_000;
    /// Regeneration clock cadence
    pub const CLOCK_PERIOD_MS: Millis = 1_000;

    /// How long the correct/bonus feedback stays up before returning to idle
    pub const CORRECT_FEEDBACK_MS: Millis = 1_500;
    /// How long the wrong-answer flash stays up before the child can retry
    pub const WRONG_FEEDBACK_MS: Millis = 800;

    /// Points for a correct answer
    pub const BASE_POINTS: u64 = 10;
    /// Extra points when the streak target is reached
    pub const STREAK_BONUS_POINTS: u64 = 50;
    /// Consecutive correct answers needed for the bonus
    pub const STREAK_TARGET: u32 = 10;

    /// Options shown for generic and symmetry puzzles
    pub const OPTION_COUNT: usize = 3;

    /// Storage key for the session record
    pub const SAVE_KEY: &str = "phi_junior_save";
    /// Storage key for settings
    pub const SETTINGS_KEY: &str = "phi_junior_settings";

    /// Spoken when the child tries to start without energy
    pub const REST_PROMPT: &str = "Energi habis, yuk istirahat!";
    /// Spoken after a wrong answer
    pub const RETRY_PROMPT: &str = "Coba lagi sayang!";
}

/// Format a countdown as `m:ss` (seconds zero-padded, both floored)
pub fn format_countdown(remaining_ms: Millis) -> String {
    let minutes = remaining_ms / 60_000;
    let seconds = (remaining_ms % 60_000) / 1_000;
    format!("{}:{:02}", minutes, seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_countdown() {
        assert_eq!(format_countdown(consts::REGEN_INTERVAL_MS), "10:00");
        assert_eq!(format_countdown(599_001), "9:59");
        assert_eq!(format_countdown(65_999), "1:05");
        assert_eq!(format_countdown(999), "0:00");
    }
}
