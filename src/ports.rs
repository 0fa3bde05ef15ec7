//! Capabilities injected into the game controller
//!
//! The controller never touches the browser or the filesystem directly; it
//! calls these ports. `Recorder` captures every call for tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::audio::TonePlayer;
use crate::persistence::{MemoryStorage, Storage};
use crate::speech::{Speaker, Voice};

pub struct Ports {
    pub speaker: Box<dyn Speaker>,
    pub tone: Box<dyn TonePlayer>,
    pub storage: Box<dyn Storage>,
}

impl Ports {
    pub fn new(
        speaker: impl Speaker + 'static,
        tone: impl TonePlayer + 'static,
        storage: impl Storage + 'static,
    ) -> Self {
        Self {
            speaker: Box::new(speaker),
            tone: Box::new(tone),
            storage: Box::new(storage),
        }
    }
}

/// A single captured port call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Speak(String),
    Tone { correct: bool },
    Write { key: String, value: String },
}

/// Shared log of port calls, in order
#[derive(Debug, Default, Clone)]
pub struct Recorder {
    calls: Rc<RefCell<Vec<Call>>>,
    storage: Rc<RefCell<MemoryStorage>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from pre-existing storage contents
    pub fn with_storage(storage: MemoryStorage) -> Self {
        Self {
            calls: Rc::default(),
            storage: Rc::new(RefCell::new(storage)),
        }
    }

    /// Ports that all report into this recorder
    pub fn ports(&self) -> Ports {
        Ports::new(self.clone(), self.clone(), self.clone())
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn spoken(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Speak(text) => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn tones(&self) -> Vec<bool> {
        self.calls
            .borrow()
            .iter()
            .filter_map(|c| match c {
                Call::Tone { correct } => Some(*correct),
                _ => None,
            })
            .collect()
    }

    pub fn writes(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Write { .. }))
            .count()
    }

    pub fn stored(&self, key: &str) -> Option<String> {
        self.storage.borrow().read(key)
    }
}

impl Speaker for Recorder {
    fn speak(&mut self, text: &str, _voice: &Voice) {
        self.calls.borrow_mut().push(Call::Speak(text.to_string()));
    }
}

impl TonePlayer for Recorder {
    fn play_tone(&mut self, correct: bool) {
        self.calls.borrow_mut().push(Call::Tone { correct });
    }
}

impl Storage for Recorder {
    fn read(&self, key: &str) -> Option<String> {
        self.storage.borrow().read(key)
    }

    fn write(&mut self, key: &str, value: String) {
        self.calls.borrow_mut().push(Call::Write {
            key: key.to_string(),
            value: value.clone(),
        });
        self.storage.borrow_mut().write(key, value);
    }
}
