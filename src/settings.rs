//! Voice and audio preferences
//!
//! Persisted separately from the session record.

use serde::{Deserialize, Serialize};

use crate::consts::SETTINGS_KEY;
use crate::persistence::Storage;
use crate::speech::Voice;

/// Player preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Speech ===
    /// Read prompts aloud
    pub speech_enabled: bool,
    /// Voice used for every prompt
    pub voice: Voice,

    // === Audio ===
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Answer tone volume (0.0 - 1.0)
    pub tone_volume: f32,
    /// Silence answer tones
    pub muted: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speech_enabled: true,
            voice: Voice::default(),
            master_volume: 0.8,
            tone_volume: 1.0,
            muted: false,
        }
    }
}

impl Settings {
    /// Effective tone volume (respects mute)
    pub fn effective_tone_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            (self.master_volume * self.tone_volume).clamp(0.0, 1.0)
        }
    }

    pub fn load(storage: &dyn Storage) -> Self {
        if let Some(json) = storage.read(SETTINGS_KEY) {
            match serde_json::from_str(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings");
                    return settings;
                }
                Err(e) => log::warn!("Ignoring unreadable settings: {}", e),
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    pub fn save(&self, storage: &mut dyn Storage) {
        if let Ok(json) = serde_json::to_string(self) {
            storage.write(SETTINGS_KEY, json);
            log::info!("Settings saved");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::MemoryStorage;

    #[test]
    fn test_effective_volume() {
        let mut settings = Settings::default();
        assert!((settings.effective_tone_volume() - 0.8).abs() < 1e-6);
        settings.muted = true;
        assert_eq!(settings.effective_tone_volume(), 0.0);
    }

    #[test]
    fn test_load_save() {
        let mut storage = MemoryStorage::new();
        assert_eq!(Settings::load(&storage), Settings::default());

        let settings = Settings {
            muted: true,
            ..Default::default()
        };
        settings.save(&mut storage);
        assert_eq!(Settings::load(&storage), settings);
    }

    #[test]
    fn test_partial_and_corrupt_settings() {
        let storage = MemoryStorage::new().with(SETTINGS_KEY, r#"{"muted":true}"#);
        let settings = Settings::load(&storage);
        assert!(settings.muted);
        assert_eq!(settings.voice, Voice::default());

        let storage = MemoryStorage::new().with(SETTINGS_KEY, "oops");
        assert_eq!(Settings::load(&storage), Settings::default());
    }
}
