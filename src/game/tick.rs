//! Life regeneration tick
//!
//! A pure function of `(state, now)`; the platform loop calls it once per
//! clock period.

use super::state::SessionState;
use crate::consts::*;
use crate::{Millis, format_countdown};

/// Outcome of a regeneration tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regen {
    /// Lives are full, nothing to do
    Full,
    /// A life came back; `lives` is the new count
    Restored { lives: u8 },
    /// Still counting down to the next life
    Waiting { remaining_ms: Millis },
}

impl Regen {
    /// Countdown text for the HUD (`m:ss`, empty when nothing is pending)
    pub fn display(&self) -> String {
        match self {
            Regen::Full => String::new(),
            Regen::Restored { lives } if *lives >= MAX_LIVES => String::new(),
            Regen::Restored { .. } => format_countdown(REGEN_INTERVAL_MS),
            Regen::Waiting { remaining_ms } => format_countdown(*remaining_ms),
        }
    }
}

/// Advance life regeneration to `now`
pub fn regenerate(state: &mut SessionState, now: Millis) -> Regen {
    if state.has_full_lives() {
        state.last_life_lost_at = None;
        return Regen::Full;
    }

    // A record that lost its countdown start regenerates from now
    let started = *state.last_life_lost_at.get_or_insert(now);
    let elapsed = now.saturating_sub(started);

    if elapsed >= REGEN_INTERVAL_MS {
        state.lives = (state.lives + 1).min(MAX_LIVES);
        state.last_life_lost_at = if state.lives < MAX_LIVES {
            Some(now)
        } else {
            None
        };
        Regen::Restored { lives: state.lives }
    } else {
        Regen::Waiting {
            remaining_ms: REGEN_INTERVAL_MS - elapsed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const NOW: Millis = 1_700_000_000_000;

    fn state_with(lives: u8, lost_at: Option<Millis>) -> SessionState {
        SessionState {
            lives,
            last_life_lost_at: lost_at,
            ..Default::default()
        }
    }

    #[test]
    fn test_full_lives_is_noop() {
        let mut state = SessionState::default();
        assert_eq!(regenerate(&mut state, NOW), Regen::Full);
        assert_eq!(state, SessionState::default());
        assert_eq!(Regen::Full.display(), "");
    }

    #[test]
    fn test_last_life_restored_clears_timestamp() {
        let mut state = state_with(2, Some(NOW - REGEN_INTERVAL_MS));
        let regen = regenerate(&mut state, NOW);
        assert_eq!(regen, Regen::Restored { lives: 3 });
        assert_eq!(state.lives, 3);
        assert_eq!(state.last_life_lost_at, None);
        assert_eq!(regen.display(), "");
    }

    #[test]
    fn test_partial_restore_resets_timestamp() {
        let mut state = state_with(1, Some(NOW - REGEN_INTERVAL_MS));
        let regen = regenerate(&mut state, NOW);
        assert_eq!(regen, Regen::Restored { lives: 2 });
        assert_eq!(state.last_life_lost_at, Some(NOW));
        assert_eq!(regen.display(), "10:00");
    }

    #[test]
    fn test_waiting_reports_remaining() {
        let mut state = state_with(0, Some(NOW - 61_500));
        let regen = regenerate(&mut state, NOW);
        assert_eq!(
            regen,
            Regen::Waiting {
                remaining_ms: REGEN_INTERVAL_MS - 61_500
            }
        );
        assert_eq!(regen.display(), "8:58");
        assert_eq!(state.lives, 0);
    }

    #[test]
    fn test_same_now_is_idempotent() {
        let mut once = state_with(1, Some(NOW - REGEN_INTERVAL_MS - 42));
        regenerate(&mut once, NOW);

        let mut twice = once.clone();
        regenerate(&mut twice, NOW);
        assert_eq!(once, twice);
        assert_eq!(twice.lives, 2);
    }

    #[test]
    fn test_clock_going_backwards_waits_full_interval() {
        let mut state = state_with(2, Some(NOW + 5_000));
        let regen = regenerate(&mut state, NOW);
        assert_eq!(
            regen,
            Regen::Waiting {
                remaining_ms: REGEN_INTERVAL_MS
            }
        );
    }

    #[test]
    fn test_one_life_per_interval_after_long_absence() {
        let mut state = state_with(0, Some(NOW - 3 * REGEN_INTERVAL_MS));
        regenerate(&mut state, NOW);
        assert_eq!(state.lives, 1);
        // The next life needs a fresh interval
        regenerate(&mut state, NOW + 1_000);
        assert_eq!(state.lives, 1);
        regenerate(&mut state, NOW + REGEN_INTERVAL_MS);
        assert_eq!(state.lives, 2);
    }

    proptest! {
        #[test]
        fn prop_before_interval_is_unchanged(lives in 0u8..3, elapsed in 0u64..REGEN_INTERVAL_MS) {
            let mut state = state_with(lives, Some(NOW - elapsed));
            let before = state.clone();
            let regen = regenerate(&mut state, NOW);
            prop_assert_eq!(state, before);
            prop_assert_eq!(regen, Regen::Waiting { remaining_ms: REGEN_INTERVAL_MS - elapsed });
        }

        #[test]
        fn prop_lives_stay_in_range(lives in 0u8..=3, steps in prop::collection::vec(0u64..1_200_000, 1..40)) {
            let mut state = state_with(lives, if lives < 3 { Some(NOW) } else { None });
            let mut now = NOW;
            for step in steps {
                now += step;
                regenerate(&mut state, now);
                prop_assert!(state.lives <= MAX_LIVES);
                prop_assert_eq!(state.last_life_lost_at.is_some(), state.lives < MAX_LIVES);
            }
        }
    }
}
