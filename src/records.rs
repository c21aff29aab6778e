//! Run history
//!
//! Every normally completed run is kept, newest first, up to 20 entries.
//! Persisted as a JSON array under a fixed key.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::persistence::{KeyValueStore, StorageError, load_json, save_json};
use crate::sim::{Difficulty, RunSummary};

/// Maximum number of records to keep
pub const MAX_RECORDS: usize = 20;

/// Storage key for the record list
pub const RECORDS_KEY: &str = "reactionGameRecords";

/// Snapshot of a finished run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionRecord {
    /// Unique, derived from the finish time (ms since epoch)
    pub id: u64,
    /// `YYYY-MM-DD` (UTC)
    pub date: String,
    /// `HH:MM` (UTC)
    pub time: String,
    pub score: u64,
    pub max_combo: u32,
    pub accuracy: f64,
    pub difficulty: Difficulty,
}

impl SessionRecord {
    pub fn from_summary(summary: &RunSummary) -> Self {
        let id = summary.finished_at_ms.max(0.0) as u64;
        let (date, time) = format_timestamp(id);
        Self {
            id,
            date,
            time,
            score: summary.score,
            max_combo: summary.max_combo,
            accuracy: summary.accuracy,
            difficulty: summary.difficulty,
        }
    }

    /// Accuracy as shown in the list
    pub fn accuracy_label(&self) -> String {
        crate::format_accuracy(self.accuracy)
    }
}

/// Split an epoch-ms timestamp into date and time labels
pub fn format_timestamp(ms: u64) -> (String, String) {
    match DateTime::<Utc>::from_timestamp_millis(ms as i64) {
        Some(at) => (
            at.format("%Y-%m-%d").to_string(),
            at.format("%H:%M").to_string(),
        ),
        None => ("N/A".to_string(), "N/A".to_string()),
    }
}

/// Newest-first list of finished runs
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Records {
    entries: Vec<SessionRecord>,
}

impl Records {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a record at the front, dropping the oldest beyond the cap.
    /// Returns the id actually stored (bumped if it collides).
    pub fn append(&mut self, mut record: SessionRecord) -> u64 {
        if self.entries.iter().any(|r| r.id == record.id) {
            let max_id = self.entries.iter().map(|r| r.id).max().unwrap_or(0);
            record.id = max_id + 1;
        }
        let id = record.id;
        self.entries.insert(0, record);
        self.entries.truncate(MAX_RECORDS);
        id
    }

    /// Remove one record; returns whether it existed
    pub fn delete_by_id(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|r| r.id != id);
        self.entries.len() != before
    }

    pub fn clear_all(&mut self) {
        self.entries.clear();
    }

    /// All records, newest first
    pub fn list_all(&self) -> &[SessionRecord] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Best score in the history (if any)
    pub fn best_score(&self) -> Option<u64> {
        self.entries.iter().map(|r| r.score).max()
    }
}

/// Records backed by a key-value store; every mutation is written through
pub struct RecordStore {
    store: Box<dyn KeyValueStore>,
    records: Records,
}

impl RecordStore {
    /// Load from storage; missing or malformed data starts an empty list
    pub fn open(store: Box<dyn KeyValueStore>) -> Self {
        let mut records: Records = load_json(store.as_ref(), RECORDS_KEY).unwrap_or_default();
        records.entries.truncate(MAX_RECORDS);
        log::info!("Loaded {} records", records.len());
        Self { store, records }
    }

    pub fn append(&mut self, record: SessionRecord) -> u64 {
        let id = self.records.append(record);
        self.persist();
        id
    }

    /// Record a finished run
    pub fn append_summary(&mut self, summary: &RunSummary) -> u64 {
        self.append(SessionRecord::from_summary(summary))
    }

    pub fn delete_by_id(&mut self, id: u64) -> bool {
        let removed = self.records.delete_by_id(id);
        if removed {
            self.persist();
        }
        removed
    }

    pub fn clear_all(&mut self) {
        self.records.clear_all();
        if let Err(e) = self.store.remove(RECORDS_KEY) {
            log::warn!("Failed to clear records: {}", e);
        }
    }

    pub fn list_all(&self) -> &[SessionRecord] {
        self.records.list_all()
    }

    pub fn records(&self) -> &Records {
        &self.records
    }

    fn persist(&mut self) {
        if let Err(e) = self.try_persist() {
            log::warn!("Failed to save records: {}", e);
        } else {
            log::info!("Records saved ({} entries)", self.records.len());
        }
    }

    fn try_persist(&mut self) -> Result<(), StorageError> {
        save_json(self.store.as_mut(), RECORDS_KEY, &self.records)
    }
}
