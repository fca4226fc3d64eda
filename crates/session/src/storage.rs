//! Best-effort durable key/value storage.
//!
//! Session persistence must never take the application down: storage that
//! is full, unwritable or corrupt degrades to the in-memory values for the
//! rest of the session. The [`SessionStorage`] trait therefore reports
//! failure as `false`/`None` instead of an error type, making the
//! in-memory fallback an explicit branch in the store rather than an
//! exception path.

use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

/// Durable string key/value storage for session state.
pub trait SessionStorage: Send {
    /// Read a value; `None` if absent or unreadable.
    fn load(&self, key: &str) -> Option<String>;

    /// Write a value; `false` if the write could not be persisted.
    fn store(&mut self, key: &str, value: &str) -> bool;

    /// Remove a key; `false` if the removal could not be persisted.
    /// Removing an absent key is a successful no-op.
    fn remove(&mut self, key: &str) -> bool;
}

/// Storage backed by a single JSON object file.
///
/// Each write re-reads, updates and rewrites the whole file; the handful
/// of session keys makes that cheap. Unparseable or missing files read as
/// empty.
#[derive(Debug)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read_map(&self) -> Map<String, Value> {
        let Ok(contents) = fs::read_to_string(&self.path) else {
            return Map::new();
        };
        match serde_json::from_str::<Value>(&contents) {
            Ok(Value::Object(map)) => map,
            _ => {
                debug!(path = %self.path.display(), "session file is not a JSON object, treating as empty");
                Map::new()
            }
        }
    }

    fn write_map(&self, map: &Map<String, Value>) -> bool {
        let Ok(contents) = serde_json::to_string_pretty(&Value::Object(map.clone())) else {
            return false;
        };
        match fs::write(&self.path, contents) {
            Ok(()) => true,
            Err(err) => {
                debug!(path = %self.path.display(), error = %err, "failed to write session file");
                false
            }
        }
    }
}

impl SessionStorage for FileStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.read_map()
            .get(key)
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn store(&mut self, key: &str, value: &str) -> bool {
        let mut map = self.read_map();
        map.insert(key.to_string(), Value::String(value.to_string()));
        self.write_map(&map)
    }

    fn remove(&mut self, key: &str) -> bool {
        let mut map = self.read_map();
        if map.remove(key).is_none() {
            return true;
        }
        self.write_map(&map)
    }
}

/// In-memory storage for tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: HashMap<String, String>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStorage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn store(&mut self, key: &str, value: &str) -> bool {
        self.values.insert(key.to_string(), value.to_string());
        true
    }

    fn remove(&mut self, key: &str) -> bool {
        self.values.remove(key);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_storage_round_trips_values() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut storage = FileStorage::new(dir.path().join("session.json"));

        assert_eq!(storage.load("activePractitionerId"), None);
        assert!(storage.store("activePractitionerId", "42"));
        assert_eq!(storage.load("activePractitionerId").as_deref(), Some("42"));

        assert!(storage.remove("activePractitionerId"));
        assert_eq!(storage.load("activePractitionerId"), None);
    }

    #[test]
    fn file_storage_keeps_other_keys_intact() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut storage = FileStorage::new(dir.path().join("session.json"));

        storage.store("activePractitionerId", "42");
        storage.store("activePatientId", "p1");
        storage.remove("activePatientId");

        assert_eq!(storage.load("activePractitionerId").as_deref(), Some("42"));
        assert_eq!(storage.load("activePatientId"), None);
    }

    #[test]
    fn corrupt_file_reads_as_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        fs::write(&path, "not json at all {{{").expect("write");

        let storage = FileStorage::new(&path);
        assert_eq!(storage.load("activePractitionerId"), None);
    }

    #[test]
    fn unwritable_path_reports_false() {
        let dir = tempfile::tempdir().expect("tempdir");
        // The parent directory does not exist, so writes cannot land.
        let mut storage = FileStorage::new(dir.path().join("missing").join("session.json"));
        assert!(!storage.store("activePractitionerId", "42"));
    }

    #[test]
    fn removing_an_absent_key_is_a_no_op() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut storage = FileStorage::new(dir.path().join("session.json"));
        assert!(storage.remove("activePatientId"));
    }
}
