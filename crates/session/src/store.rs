//! The session store: active practitioner and patient ids.
//!
//! One `SessionStore` is constructed per session over an injected storage
//! backend and passed by reference to consumers — there is no ambient
//! singleton. Reads come from memory; writes go to memory first and then
//! best-effort to storage, so a failing backend leaves the session fully
//! functional for its remaining lifetime.
//!
//! The dependency invariant: a patient is only ever selected in the
//! context of a practitioner. Whenever the practitioner id ends up unset —
//! by an explicit clear or by restoring a session that never had one — the
//! patient id is forced unset as a reaction, and its durable key removed.

use crate::storage::SessionStorage;
use tracing::warn;

/// Durable-storage key for the active practitioner id.
pub const PRACTITIONER_KEY: &str = "activePractitionerId";

/// Durable-storage key for the active patient id.
pub const PATIENT_KEY: &str = "activePatientId";

/// A change to one of the two session fields, as delivered to subscribers.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionChange {
    ActivePractitioner(Option<String>),
    ActivePatient(Option<String>),
}

type Subscriber = Box<dyn Fn(&SessionChange) + Send>;

/// Session-scoped selection state with durable persistence.
pub struct SessionStore {
    storage: Box<dyn SessionStorage>,
    practitioner_id: Option<String>,
    patient_id: Option<String>,
    subscribers: Vec<Subscriber>,
}

impl SessionStore {
    /// Restore a store from the given storage backend.
    ///
    /// Missing keys restore as unset. A persisted patient id without a
    /// persisted practitioner id is stale state from an older session and
    /// is discarded immediately, enforcing the invariant from startup.
    pub fn new(storage: Box<dyn SessionStorage>) -> Self {
        let practitioner_id = storage.load(PRACTITIONER_KEY);
        let patient_id = storage.load(PATIENT_KEY);

        let mut store = Self {
            storage,
            practitioner_id,
            patient_id,
            subscribers: Vec::new(),
        };
        if store.practitioner_id.is_none() {
            store.clear_patient_for_missing_practitioner();
        }
        store
    }

    /// The active practitioner id, if one is selected.
    pub fn active_practitioner_id(&self) -> Option<&str> {
        self.practitioner_id.as_deref()
    }

    /// The active patient id, if one is selected.
    pub fn active_patient_id(&self) -> Option<&str> {
        self.patient_id.as_deref()
    }

    /// Select or clear the active practitioner.
    ///
    /// Clearing (or any change that leaves the id unset) also clears the
    /// active patient as a reaction.
    pub fn set_active_practitioner_id(&mut self, id: Option<String>) {
        self.practitioner_id = id.clone();
        self.persist(PRACTITIONER_KEY, id.as_deref());
        self.notify(SessionChange::ActivePractitioner(id));

        if self.practitioner_id.is_none() {
            self.clear_patient_for_missing_practitioner();
        }
    }

    /// Select or clear the active patient.
    pub fn set_active_patient_id(&mut self, id: Option<String>) {
        self.patient_id = id.clone();
        self.persist(PATIENT_KEY, id.as_deref());
        self.notify(SessionChange::ActivePatient(id));
    }

    /// Register a callback invoked after every field change.
    pub fn subscribe(&mut self, subscriber: impl Fn(&SessionChange) + Send + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    fn clear_patient_for_missing_practitioner(&mut self) {
        // Idempotent: runs on every transition to an unset practitioner,
        // whether or not a patient was selected.
        self.patient_id = None;
        self.persist(PATIENT_KEY, None);
        self.notify(SessionChange::ActivePatient(None));
    }

    fn persist(&mut self, key: &str, value: Option<&str>) {
        let persisted = match value {
            Some(value) => self.storage.store(key, value),
            None => self.storage.remove(key),
        };
        if !persisted {
            warn!(key, "session storage write failed, continuing with in-memory state");
        }
    }

    fn notify(&self, change: SessionChange) {
        for subscriber in &self.subscribers {
            subscriber(&change);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{FileStorage, MemoryStorage};
    use std::sync::{Arc, Mutex};

    fn memory_store() -> SessionStore {
        SessionStore::new(Box::new(MemoryStorage::new()))
    }

    #[test]
    fn starts_unset_when_storage_is_empty() {
        let store = memory_store();
        assert_eq!(store.active_practitioner_id(), None);
        assert_eq!(store.active_patient_id(), None);
    }

    #[test]
    fn clearing_practitioner_clears_patient() {
        let mut store = memory_store();
        store.set_active_practitioner_id(Some("42".into()));
        store.set_active_patient_id(Some("p1".into()));

        store.set_active_practitioner_id(None);
        assert_eq!(store.active_patient_id(), None);
    }

    #[test]
    fn clearing_practitioner_without_patient_is_idempotent() {
        let mut store = memory_store();
        store.set_active_practitioner_id(None);
        store.set_active_practitioner_id(None);
        assert_eq!(store.active_patient_id(), None);
    }

    #[test]
    fn selecting_a_new_practitioner_keeps_the_patient() {
        // Only a transition to unset invalidates the patient; switching
        // between practitioners leaves reconciliation to the screens.
        let mut store = memory_store();
        store.set_active_practitioner_id(Some("42".into()));
        store.set_active_patient_id(Some("p1".into()));

        store.set_active_practitioner_id(Some("43".into()));
        assert_eq!(store.active_patient_id(), Some("p1"));
    }

    #[test]
    fn restores_both_ids_from_storage() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");

        {
            let mut store = SessionStore::new(Box::new(FileStorage::new(&path)));
            store.set_active_practitioner_id(Some("42".into()));
            store.set_active_patient_id(Some("p1".into()));
        }

        let restored = SessionStore::new(Box::new(FileStorage::new(&path)));
        assert_eq!(restored.active_practitioner_id(), Some("42"));
        assert_eq!(restored.active_patient_id(), Some("p1"));
    }

    #[test]
    fn stale_patient_is_discarded_at_startup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");

        {
            let mut storage = FileStorage::new(&path);
            storage.store(PATIENT_KEY, "p1");
        }

        let store = SessionStore::new(Box::new(FileStorage::new(&path)));
        assert_eq!(store.active_patient_id(), None);

        // The stale key is gone from durable storage as well.
        let storage = FileStorage::new(&path);
        assert_eq!(storage.load(PATIENT_KEY), None);
    }

    #[test]
    fn subscribers_observe_changes_and_reactions() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut store = memory_store();
        store.subscribe(move |change| sink.lock().unwrap().push(change.clone()));

        store.set_active_practitioner_id(Some("42".into()));
        store.set_active_patient_id(Some("p1".into()));
        store.set_active_practitioner_id(None);

        let seen = seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec![
                SessionChange::ActivePractitioner(Some("42".into())),
                SessionChange::ActivePatient(Some("p1".into())),
                SessionChange::ActivePractitioner(None),
                SessionChange::ActivePatient(None),
            ]
        );
    }

    /// Backend that accepts nothing, standing in for disabled storage.
    struct RejectingStorage;

    impl SessionStorage for RejectingStorage {
        fn load(&self, _key: &str) -> Option<String> {
            None
        }
        fn store(&mut self, _key: &str, _value: &str) -> bool {
            false
        }
        fn remove(&mut self, _key: &str) -> bool {
            false
        }
    }

    #[test]
    fn failing_storage_falls_back_to_memory() {
        let mut store = SessionStore::new(Box::new(RejectingStorage));
        store.set_active_practitioner_id(Some("42".into()));
        store.set_active_patient_id(Some("p1".into()));

        assert_eq!(store.active_practitioner_id(), Some("42"));
        assert_eq!(store.active_patient_id(), Some("p1"));
    }
}
