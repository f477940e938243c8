//! Bounded chat-session history.
//!
//! The store keeps at most `max_sessions` sessions in creation order and
//! drops the oldest on overflow. Every change to the collection is written
//! through to the [`Storage`] backend right away; failures there are logged
//! and never surface to callers.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};

use crate::error::StorageError;
use crate::storage::Storage;
use crate::types::{Entry, Session, SessionId};

pub struct SessionStore<S: Storage> {
    storage: S,
    key: String,
    max_sessions: usize,
    sessions: VecDeque<Session>,
    active: Option<SessionId>,
    /// Entries shown while no session is active. Never persisted.
    scratch: Vec<Entry>,
    next_id: SessionId,
}

impl<S: Storage> SessionStore<S> {
    /// An empty store that has not looked at `storage` yet.
    pub fn new(storage: S, key: impl Into<String>, max_sessions: usize) -> Self {
        Self {
            storage,
            key: key.into(),
            max_sessions: max_sessions.max(1),
            sessions: VecDeque::new(),
            active: None,
            scratch: Vec::new(),
            next_id: SessionId(0),
        }
    }

    /// Restores the persisted sessions. A missing, unreadable or corrupt
    /// value yields an empty store. No session is active after loading.
    pub fn load(storage: S, key: impl Into<String>, max_sessions: usize) -> Self {
        let mut store = Self::new(storage, key, max_sessions);

        let raw = match store.storage.get(&store.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(key = %store.key, "No saved sessions");
                return store;
            }
            Err(e) => {
                tracing::warn!(key = %store.key, error = %e, "Failed to read saved sessions");
                return store;
            }
        };

        let mut restored: Vec<Session> = match serde_json::from_str(&raw) {
            Ok(sessions) => sessions,
            Err(e) => {
                tracing::error!(key = %store.key, error = %e, "Saved sessions are corrupt; starting empty");
                return store;
            }
        };

        let overflow = restored.len().saturating_sub(store.max_sessions);
        restored.drain(..overflow);

        let next_id = restored
            .iter()
            .map(|session| session.id.next())
            .collect::<Option<Vec<_>>>()
            .map(|ids| ids.into_iter().max().unwrap_or(SessionId(0)));
        let Some(next_id) = next_id else {
            tracing::error!(key = %store.key, "Saved session ids are out of range; starting empty");
            return store;
        };
        store.next_id = next_id;
        store.sessions = restored.into();

        tracing::info!(count = store.sessions.len(), "Restored saved sessions");
        store
    }

    pub fn create_session(&mut self) -> SessionId {
        self.create_session_at(Utc::now())
    }

    /// Appends a new empty session, evicting the oldest ones past capacity,
    /// and makes it the active session.
    pub fn create_session_at(&mut self, created_at: DateTime<Utc>) -> SessionId {
        let id = self.next_id;
        self.next_id = id.next().unwrap_or_else(|| {
            tracing::warn!(session_id = %id, "Session ids exhausted; numbering restarts");
            SessionId(0)
        });
        self.sessions.push_back(Session::new(id, created_at));

        while self.sessions.len() > self.max_sessions {
            if let Some(evicted) = self.sessions.pop_front() {
                tracing::debug!(session_id = %evicted.id, "Evicted oldest session");
            }
        }

        self.active = Some(id);
        self.scratch.clear();
        tracing::info!(session_id = %id, "Created session");

        self.save();
        id
    }

    /// Makes `id` the active session. Unknown ids leave the store untouched and return `None`.
    pub fn select_session(&mut self, id: SessionId) -> Option<&Session> {
        let Some(index) = self.position(id) else {
            tracing::warn!(session_id = %id, "Ignoring selection of unknown session");
            return None;
        };
        self.active = Some(id);
        self.scratch.clear();
        self.sessions.get(index)
    }

    /// Appends to the active session, or to the unsaved scratch transcript
    /// when no session is active.
    pub fn append_entry(&mut self, entry: Entry) {
        match self.active {
            Some(id) => {
                self.append_to(id, entry);
            }
            None => self.scratch.push(entry),
        }
    }

    /// Appends to a specific session. Returns `false` if it no longer exists.
    pub fn append_to(&mut self, id: SessionId, entry: Entry) -> bool {
        let Some(index) = self.position(id) else {
            return false;
        };
        self.sessions[index].push(entry);
        self.save();
        true
    }

    /// Drops every session and removes the persisted value itself.
    /// Numbering restarts, as it would after a reload.
    pub fn clear_all(&mut self) {
        self.sessions.clear();
        self.active = None;
        self.scratch.clear();
        self.next_id = SessionId(0);

        if let Err(e) = self.storage.remove(&self.key) {
            tracing::warn!(key = %self.key, error = %e, "Failed to remove saved sessions");
        }
        tracing::info!("Cleared all sessions");
    }

    /// Writes the newest `max_sessions` sessions to storage.
    pub fn save(&mut self) {
        let skip = self.sessions.len().saturating_sub(self.max_sessions);
        let retained: Vec<&Session> = self.sessions.iter().skip(skip).collect();

        let result = serde_json::to_string(&retained)
            .map_err(StorageError::from)
            .and_then(|json| self.storage.set(&self.key, &json));

        if let Err(e) = result {
            tracing::error!(key = %self.key, error = %e, "Failed to save sessions");
        }
    }

    pub fn sessions(&self) -> impl Iterator<Item = &Session> {
        self.sessions.iter()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn max_sessions(&self) -> usize {
        self.max_sessions
    }

    pub fn active(&self) -> Option<SessionId> {
        self.active
    }

    pub fn active_session(&self) -> Option<&Session> {
        self.active
            .and_then(|id| self.position(id))
            .and_then(|index| self.sessions.get(index))
    }

    /// The transcript currently on screen.
    pub fn transcript(&self) -> &[Entry] {
        match self.active_session() {
            Some(session) => session.transcript(),
            None => &self.scratch,
        }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn position(&self, id: SessionId) -> Option<usize> {
        self.sessions.iter().position(|session| session.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStorage;
    use crate::types::{FileRef, ScanModel, Verdict};

    const KEY: &str = "test.chats";

    fn store_with(storage: &MemoryStorage) -> SessionStore<MemoryStorage> {
        SessionStore::load(storage.clone(), KEY, 3)
    }

    fn ids(store: &SessionStore<MemoryStorage>) -> Vec<u64> {
        store.sessions().map(|s| s.id.0).collect()
    }

    #[test]
    fn test_create_session_activates_new_session() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        assert_eq!(store.active(), None);

        let first = store.create_session();
        assert_eq!(first, SessionId(0));
        assert_eq!(store.active(), Some(first));
        assert_eq!(store.active_session().unwrap().title, "Conversation 1");

        let second = store.create_session();
        assert_eq!(second, SessionId(1));
        assert_eq!(store.active(), Some(second));
        assert_eq!(store.active_session().unwrap().title, "Conversation 2");
    }

    #[test]
    fn test_eviction_keeps_newest_sessions() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        for _ in 0..7 {
            store.create_session();
        }
        assert_eq!(store.len(), 3);
        assert_eq!(ids(&store), [4, 5, 6]);
        assert_eq!(store.active(), Some(SessionId(6)));

        let titles: Vec<_> = store.sessions().map(|s| s.title.clone()).collect();
        assert_eq!(titles, ["Conversation 5", "Conversation 6", "Conversation 7"]);
    }

    #[test]
    fn test_eviction_is_by_creation_not_use() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        let oldest = store.create_session();
        store.create_session();
        store.create_session();

        // Using the oldest session does not protect it.
        store.select_session(oldest);
        store.append_entry(Entry::ai_text("still here"));
        store.create_session();

        assert_eq!(ids(&store), [1, 2, 3]);
        assert!(store.select_session(oldest).is_none());
    }

    #[test]
    fn test_select_unknown_session_is_noop() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        let id = store.create_session();
        store.append_entry(Entry::ai_text("hello"));

        assert!(store.select_session(SessionId(42)).is_none());
        assert_eq!(store.active(), Some(id));
        assert_eq!(store.transcript().len(), 1);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_select_session_switches_transcript() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        let first = store.create_session();
        store.append_entry(Entry::ai_text("first"));
        store.create_session();
        store.append_entry(Entry::ai_text("second"));

        let selected = store.select_session(first).unwrap();
        assert_eq!(selected.transcript(), &[Entry::ai_text("first")]);
        assert_eq!(store.transcript(), &[Entry::ai_text("first")]);
    }

    #[test]
    fn test_append_without_active_session_is_not_persisted() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.append_entry(Entry::ai_text("Please select a file to scan."));

        assert_eq!(store.transcript().len(), 1);
        assert!(!storage.contains_key(KEY));
        assert!(store.is_empty());
    }

    #[test]
    fn test_append_after_reload_without_selection_leaves_saved_value() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.create_session();
        store.append_entry(Entry::ai_text("saved"));
        store.create_session();
        let saved = storage.get(KEY).unwrap().unwrap();

        let mut reloaded = store_with(&storage);
        assert_eq!(reloaded.len(), 2);
        assert_eq!(reloaded.active(), None);
        reloaded.append_entry(Entry::ai_text("Please select a file to scan."));

        assert_eq!(reloaded.transcript(), &[Entry::ai_text("Please select a file to scan.")]);
        assert_eq!(storage.get(KEY).unwrap().unwrap(), saved);
        assert!(reloaded.sessions().all(|s| s.transcript().len() <= 1));
    }

    #[test]
    fn test_scratch_entries_are_dropped_on_create() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.append_entry(Entry::ai_text("ephemeral"));
        store.create_session();
        assert!(store.transcript().is_empty());
    }

    #[test]
    fn test_append_preserves_call_order() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.create_session();
        let entries = vec![
            Entry::user_files(vec![FileRef {
                name: "a.py".to_string(),
                size: 10,
            }]),
            Entry::user_status(ScanModel::default()),
            Entry::ai_results(vec![Verdict {
                filename: "a.py".to_string(),
                vulnerable: true,
            }]),
        ];
        for entry in entries.clone() {
            store.append_entry(entry);
        }
        assert_eq!(store.transcript(), entries.as_slice());

        let reloaded = store_with(&storage);
        assert_eq!(reloaded.sessions().next().unwrap().transcript(), entries.as_slice());
    }

    #[test]
    fn test_append_to_evicted_session_is_rejected() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        let first = store.create_session();
        for _ in 0..3 {
            store.create_session();
        }
        assert!(!store.append_to(first, Entry::ai_text("late")));
        assert!(store.sessions().all(|s| s.transcript().is_empty()));
    }

    #[test]
    fn test_clear_all_removes_persisted_key() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        store.create_session();
        store.append_entry(Entry::ai_text("hello"));
        assert!(storage.contains_key(KEY));

        store.clear_all();
        assert!(store.is_empty());
        assert_eq!(store.active(), None);
        assert!(store.transcript().is_empty());
        assert!(!storage.contains_key(KEY));

        let reloaded = store_with(&storage);
        assert!(reloaded.is_empty());
    }

    #[test]
    fn test_numbering_restarts_after_clear_all() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        for _ in 0..4 {
            store.create_session();
        }
        store.clear_all();

        let id = store.create_session();
        assert_eq!(id, SessionId(0));
        assert_eq!(store.active_session().unwrap().title, "Conversation 1");

        // Same numbering as clearing and then reloading.
        store.clear_all();
        let mut reloaded = store_with(&storage);
        assert_eq!(reloaded.create_session(), SessionId(0));
    }

    #[test]
    fn test_round_trip_restores_transcripts() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        for n in 0..4 {
            store.create_session();
            store.append_entry(Entry::user_status(ScanModel::ALL[n % 3]));
            store.append_entry(Entry::ai_text(format!("reply {}", n)));
        }

        let reloaded = store_with(&storage);
        let before: Vec<&Session> = store.sessions().collect();
        let after: Vec<&Session> = reloaded.sessions().collect();
        assert_eq!(before, after);
        assert_eq!(reloaded.active(), None);
    }

    #[test]
    fn test_ids_are_not_reused_after_reload() {
        let storage = MemoryStorage::new();
        let mut store = store_with(&storage);
        for _ in 0..5 {
            store.create_session();
        }

        let mut reloaded = store_with(&storage);
        let id = reloaded.create_session();
        assert_eq!(id, SessionId(5));
        assert_eq!(reloaded.active_session().unwrap().title, "Conversation 6");
    }

    #[test]
    fn test_corrupt_value_loads_empty() {
        let mut storage = MemoryStorage::new();
        storage.set(KEY, "{not json").unwrap();
        let store = store_with(&storage);
        assert!(store.is_empty());

        storage.set(KEY, r#"{"id":0}"#).unwrap();
        let store = store_with(&storage);
        assert!(store.is_empty());
    }

    #[test]
    fn test_saved_id_at_max_loads_empty() {
        let mut storage = MemoryStorage::new();
        storage
            .set(
                KEY,
                r#"[{"id":18446744073709551615,"title":"x","timestamp":"2024-01-01T00:00:00Z","formattedDate":"d","messages":[]}]"#,
            )
            .unwrap();

        let mut store = store_with(&storage);
        assert!(store.is_empty());

        let id = store.create_session();
        assert_eq!(id, SessionId(0));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_saved_id_below_max_keeps_creating() {
        let mut storage = MemoryStorage::new();
        storage
            .set(
                KEY,
                r#"[{"id":18446744073709551614,"title":"x","timestamp":"2024-01-01T00:00:00Z","formattedDate":"d","messages":[]}]"#,
            )
            .unwrap();

        let mut store = store_with(&storage);
        assert_eq!(store.len(), 1);

        assert_eq!(store.create_session(), SessionId(u64::MAX));
        assert_eq!(store.create_session(), SessionId(0));
        assert_eq!(ids(&store), [u64::MAX - 1, u64::MAX, 0]);
    }

    #[test]
    fn test_load_trims_oversized_value() {
        let storage = MemoryStorage::new();
        let mut wide = SessionStore::load(storage.clone(), KEY, 5);
        for _ in 0..5 {
            wide.create_session();
        }

        let narrow = store_with(&storage);
        assert_eq!(ids(&narrow), [2, 3, 4]);
    }

    #[test]
    fn test_zero_capacity_keeps_one_session() {
        let mut store = SessionStore::new(MemoryStorage::new(), KEY, 0);
        store.create_session();
        store.create_session();
        assert_eq!(store.max_sessions(), 1);
        assert_eq!(store.len(), 1);
    }

    struct FailingStorage;

    impl Storage for FailingStorage {
        fn get(&self, _key: &str) -> Result<Option<String>, StorageError> {
            Err(StorageError::Unavailable)
        }

        fn set(&mut self, _key: &str, _value: &str) -> Result<(), StorageError> {
            Err(StorageError::Backend("QuotaExceededError".to_string()))
        }

        fn remove(&mut self, _key: &str) -> Result<(), StorageError> {
            Err(StorageError::Unavailable)
        }
    }

    #[test]
    fn test_storage_failures_are_not_fatal() {
        let mut store = SessionStore::load(FailingStorage, KEY, 3);
        assert!(store.is_empty());

        let id = store.create_session();
        store.append_entry(Entry::ai_text("kept in memory"));
        assert_eq!(store.active(), Some(id));
        assert_eq!(store.transcript().len(), 1);

        store.clear_all();
        assert!(store.is_empty());
    }
}
