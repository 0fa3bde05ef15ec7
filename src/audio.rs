//! Answer tones
//!
//! A single procedurally generated beep: high for correct, low for wrong.

/// Correct answer pitch (Hz)
pub const CORRECT_FREQ: f32 = 880.0;
/// Wrong answer pitch (Hz)
pub const WRONG_FREQ: f32 = 220.0;
/// Tone length (seconds)
pub const TONE_SECS: f64 = 0.3;
/// Gain at full volume
pub const TONE_GAIN: f32 = 0.1;

pub fn tone_frequency(correct: bool) -> f32 {
    if correct { CORRECT_FREQ } else { WRONG_FREQ }
}

/// Short audio cue capability
pub trait TonePlayer {
    fn play_tone(&mut self, correct: bool);
}

/// Terminal bell plus a log line (native builds)
#[derive(Debug, Default)]
pub struct ConsoleTone {
    pub muted: bool,
}

impl TonePlayer for ConsoleTone {
    fn play_tone(&mut self, correct: bool) {
        log::debug!("tone {} Hz", tone_frequency(correct));
        if !self.muted {
            print!("\x07");
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::WebTone;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::*;

    /// Web Audio oscillator
    pub struct WebTone {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl WebTone {
        /// `volume` is the effective volume (0.0 - 1.0, already muted if needed)
        pub fn new(volume: f32) -> Self {
            // May fail outside a secure context
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Failed to create AudioContext - audio disabled");
            }
            Self {
                ctx,
                volume: volume.clamp(0.0, 1.0),
            }
        }

        fn create_osc(&self, ctx: &AudioContext, freq: f32) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(OscillatorType::Sine);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }
    }

    impl TonePlayer for WebTone {
        fn play_tone(&mut self, correct: bool) {
            if self.volume <= 0.0 {
                return;
            }
            let Some(ctx) = &self.ctx else { return };

            // Browsers keep the context suspended until a user gesture
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            let Some((osc, gain)) = self.create_osc(ctx, tone_frequency(correct)) else {
                return;
            };
            let t = ctx.current_time();
            gain.gain().set_value_at_time(TONE_GAIN * self.volume, t).ok();
            osc.start().ok();
            osc.stop_with_when(t + TONE_SECS).ok();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distinct_pitches() {
        assert!(tone_frequency(true) > tone_frequency(false));
        assert_eq!(tone_frequency(true), 880.0);
        assert_eq!(tone_frequency(false), 220.0);
    }
}
