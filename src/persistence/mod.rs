//! Key-value persistence
//!
//! Writes are fire-and-forget and applied in call order (last write wins).
//! - `LocalStorage`: browser storage (wasm)
//! - `FileStorage`: one JSON file per key, written tmp → rename by a
//!   background writer (native)
//! - `MemoryStorage`: in-process map for tests

use std::collections::HashMap;

/// Scoped key-value storage capability
pub trait Storage {
    fn read(&self, key: &str) -> Option<String>;
    fn write(&mut self, key: &str, value: String);
}

#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed a value (for tests)
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_string(), value.to_string());
        self
    }
}

impl Storage for MemoryStorage {
    fn read(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn write(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStorage;

#[cfg(not(target_arch = "wasm32"))]
mod file {
    use std::path::{Path, PathBuf};
    use std::sync::mpsc::{self, Sender};
    use std::thread::{self, JoinHandle};

    use super::Storage;
    use crate::error::Result;

    /// One JSON file per key under `dir`, written by a background thread.
    ///
    /// Dropping the storage flushes every queued write before returning.
    pub struct FileStorage {
        dir: PathBuf,
        writer: Option<Sender<(PathBuf, String)>>,
        worker: Option<JoinHandle<()>>,
    }

    impl FileStorage {
        pub fn open(dir: impl Into<PathBuf>) -> Result<Self> {
            let dir = dir.into();
            std::fs::create_dir_all(&dir)?;

            let (writer, queue) = mpsc::channel::<(PathBuf, String)>();
            let worker = thread::Builder::new()
                .name("storage-writer".to_string())
                .spawn(move || {
                    for (path, value) in queue {
                        if let Err(e) = write_atomic(&path, &value) {
                            log::warn!("Failed to save {}: {}", path.display(), e);
                        }
                    }
                })?;

            log::info!("Storage directory: {}", dir.display());
            Ok(Self {
                dir,
                writer: Some(writer),
                worker: Some(worker),
            })
        }

        fn path_for(&self, key: &str) -> PathBuf {
            self.dir.join(format!("{}.json", key))
        }
    }

    fn write_atomic(path: &Path, value: &str) -> std::io::Result<()> {
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, value)?;
        std::fs::rename(&tmp, path)
    }

    impl Storage for FileStorage {
        fn read(&self, key: &str) -> Option<String> {
            std::fs::read_to_string(self.path_for(key)).ok()
        }

        fn write(&mut self, key: &str, value: String) {
            let path = self.path_for(key);
            let sent = self
                .writer
                .as_ref()
                .is_some_and(|w| w.send((path, value)).is_ok());
            if !sent {
                log::warn!("Storage writer stopped; dropping write to {}", key);
            }
        }
    }

    impl Drop for FileStorage {
        fn drop(&mut self) {
            // Closing the queue ends the writer loop once it drains
            self.writer.take();
            if let Some(worker) = self.worker.take() {
                if worker.join().is_err() {
                    log::warn!("Storage writer panicked");
                }
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub struct LocalStorage {
    storage: Option<web_sys::Storage>,
}

#[cfg(target_arch = "wasm32")]
impl Default for LocalStorage {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(target_arch = "wasm32")]
impl LocalStorage {
    pub fn new() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();
        if storage.is_none() {
            log::warn!("LocalStorage unavailable - progress will not be saved");
        }
        Self { storage }
    }
}

#[cfg(target_arch = "wasm32")]
impl Storage for LocalStorage {
    fn read(&self, key: &str) -> Option<String> {
        self.storage.as_ref()?.get_item(key).ok()?
    }

    fn write(&mut self, key: &str, value: String) {
        if let Some(storage) = &self.storage {
            let _ = storage.set_item(key, &value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_last_write_wins() {
        let mut storage = MemoryStorage::new().with("k", "old");
        assert_eq!(storage.read("k").as_deref(), Some("old"));
        storage.write("k", "a".to_string());
        storage.write("k", "b".to_string());
        assert_eq!(storage.read("k").as_deref(), Some("b"));
        assert_eq!(storage.read("missing"), None);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_storage_round_trip() {
        use std::time::{Duration, Instant};

        let dir = std::env::temp_dir().join(format!("phi-junior-test-{}", std::process::id()));
        let mut storage = FileStorage::open(&dir).unwrap();
        assert_eq!(storage.read("save"), None);

        storage.write("save", "1".to_string());
        storage.write("save", "2".to_string());

        // The writer is asynchronous; wait for the last write to land
        let deadline = Instant::now() + Duration::from_secs(5);
        while storage.read("save").as_deref() != Some("2") && Instant::now() < deadline {
            std::thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(storage.read("save").as_deref(), Some("2"));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_file_storage_flushes_on_drop() {
        let dir = std::env::temp_dir().join(format!("phi-junior-flush-{}", std::process::id()));
        for round in 0..20 {
            {
                let mut storage = FileStorage::open(&dir).unwrap();
                storage.write("phi_junior_save", format!("{{\"score\":{}}}", round));
            }
            let saved = std::fs::read_to_string(dir.join("phi_junior_save.json")).unwrap();
            assert_eq!(saved, format!("{{\"score\":{}}}", round));
            assert!(!dir.join("phi_junior_save.json.tmp").exists());
        }
        let _ = std::fs::remove_dir_all(&dir);
    }
}
