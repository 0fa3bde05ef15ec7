//! Puzzle session logic
//!
//! All gameplay rules live here. This module must stay pure:
//! - Time only arrives as an explicit `now` argument
//! - Randomness only from the injected RNG
//! - No browser, filesystem or audio calls except through `Ports`

pub mod controller;
pub mod puzzle;
pub mod state;
pub mod tick;

pub use controller::{Event, GameController, Intent, View};
pub use puzzle::{Cell, PuzzleInstance, PuzzleMeta, generate};
pub use state::{Feedback, GamePhase, SessionState};
pub use tick::{Regen, regenerate};
