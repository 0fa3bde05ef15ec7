//! Spoken prompts
//!
//! Speech is fire-and-forget: a new utterance cancels whatever is still being
//! said.

use serde::{Deserialize, Serialize};

/// Voice parameters for every utterance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    /// BCP 47 language tag
    pub locale: String,
    /// Speaking rate (1.0 = normal)
    pub rate: f32,
    /// Pitch (1.0 = normal)
    pub pitch: f32,
}

impl Default for Voice {
    fn default() -> Self {
        Self {
            locale: "id-ID".to_string(),
            rate: 0.9,
            pitch: 1.1,
        }
    }
}

/// Text-to-speech capability
pub trait Speaker {
    fn speak(&mut self, text: &str, voice: &Voice);
}

/// Prints prompts to the terminal (native builds)
#[derive(Debug, Default)]
pub struct ConsoleSpeaker;

impl Speaker for ConsoleSpeaker {
    fn speak(&mut self, text: &str, voice: &Voice) {
        log::debug!("speak [{}] {}", voice.locale, text);
        println!("🔊 {}", text);
    }
}

/// Browser SpeechSynthesis
#[cfg(target_arch = "wasm32")]
pub struct WebSpeaker {
    synth: Option<web_sys::SpeechSynthesis>,
}

#[cfg(target_arch = "wasm32")]
impl Default for WebSpeaker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl WebSpeaker {
    pub fn new() -> Self {
        let synth = web_sys::window().and_then(|w| w.speech_synthesis().ok());
        if synth.is_none() {
            log::warn!("SpeechSynthesis unavailable - prompts will be silent");
        }
        Self { synth }
    }
}

#[cfg(target_arch = "wasm32")]
impl Speaker for WebSpeaker {
    fn speak(&mut self, text: &str, voice: &Voice) {
        let Some(synth) = &self.synth else { return };
        synth.cancel();

        let Ok(utterance) = web_sys::SpeechSynthesisUtterance::new_with_text(text) else {
            return;
        };
        utterance.set_lang(&voice.locale);
        utterance.set_rate(voice.rate);
        utterance.set_pitch(voice.pitch);
        synth.speak(&utterance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_voice() {
        let voice = Voice::default();
        assert_eq!(voice.locale, "id-ID");
        assert!((voice.rate - 0.9).abs() < f32::EPSILON);
        assert!((voice.pitch - 1.1).abs() < f32::EPSILON);
    }
}
