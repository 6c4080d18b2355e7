//! Per-document presence and freshness tracking

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

/// Presence of a document in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordState {
    /// Nothing known, or deleted
    Absent,
    /// Requested, data on its way
    Receiving,
    /// Data loaded
    Present,
}

/// Journal entry for one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordStatus {
    pub current: RecordState,
    pub previous: RecordState,
    /// Milliseconds since the epoch of the last transition or touch
    pub last_update: i64,
}

impl RecordStatus {
    /// Status of a document that was never seen
    pub fn absent() -> Self {
        Self {
            current: RecordState::Absent,
            previous: RecordState::Absent,
            last_update: -1,
        }
    }
}

/// Document id → status, with redirects for aliased documents
#[derive(Debug, Default, Clone)]
pub struct RecordJournal {
    entries: FxHashMap<String, RecordStatus>,
    redirects: FxHashMap<String, String>,
}

impl RecordJournal {
    pub fn new() -> Self {
        Self::default()
    }

    fn resolve<'a>(&'a self, doc: &'a str) -> &'a str {
        let mut current = doc;
        let mut hops = 0;
        while let Some(next) = self.redirects.get(current) {
            current = next.as_str();
            hops += 1;
            if hops > self.redirects.len() {
                break;
            }
        }
        current
    }

    /// Status for a document; never-seen documents are `Absent`
    pub fn get(&self, doc: &str) -> RecordStatus {
        self.entries
            .get(self.resolve(doc))
            .copied()
            .unwrap_or_else(RecordStatus::absent)
    }

    pub fn contains(&self, doc: &str) -> bool {
        self.entries.contains_key(self.resolve(doc))
    }

    /// Move a document to `state`, remembering the state it left
    pub fn transition(&mut self, doc: &str, state: RecordState) {
        let key = self.resolve(doc).to_string();
        let now = chrono::Utc::now().timestamp_millis();
        let entry = self.entries.entry(key).or_insert_with(RecordStatus::absent);
        entry.previous = entry.current;
        entry.current = state;
        entry.last_update = now;
    }

    /// Unify `from` into `to`: the fresher status wins and later lookups of
    /// `from` read `to`'s entry.
    pub fn copy(&mut self, from: &str, to: &str) {
        let from_key = self.resolve(from).to_string();
        let to_key = self.resolve(to).to_string();
        if from_key == to_key {
            return;
        }
        if let Some(status) = self.entries.remove(&from_key) {
            match self.entries.get(&to_key) {
                Some(existing) if existing.last_update >= status.last_update => {}
                _ => {
                    self.entries.insert(to_key.clone(), status);
                }
            }
        }
        self.redirects.insert(from_key, to_key);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
