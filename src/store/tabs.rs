//! The saved-tab collection and its operations: save, delete, search,
//! export, restore. Persistence goes through the key-value store as one
//! JSON array under [`TABS_KEY`](super::TABS_KEY); every mutation rewrites
//! the full collection (last write wins, in event order).

use std::fmt;

use anyhow::Result;
use chrono::{DateTime, Local};

use super::models::TabRecord;
use super::{Store, TABS_KEY};
use crate::grid::Grid;

/// Save rejected because the trimmed title was empty. The collection and
/// the grid are left untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveError {
    EmptyTitle,
}

impl fmt::Display for SaveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaveError::EmptyTitle => write!(f, "enter a song title"),
        }
    }
}

impl std::error::Error for SaveError {}

/// Restore rejected: the input was not a JSON array of tab records.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreError {
    InvalidJson(String),
    NotAnArray,
}

impl fmt::Display for RestoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestoreError::InvalidJson(msg) => write!(f, "invalid backup file: {msg}"),
            RestoreError::NotAnArray => write!(f, "invalid backup file: expected a JSON array"),
        }
    }
}

impl std::error::Error for RestoreError {}

/// What a prompted restore ended up doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    Replaced(usize),
    Declined,
}

/// User-facing notification and confirmation, injected so the collection
/// logic stays testable without a terminal. The TUI backs this with
/// toasts and a modal; the CLI with stderr and stdin.
pub trait UserPrompt {
    fn notify(&mut self, message: &str);
    fn confirm(&mut self, message: &str) -> bool;
}

/// The ordered collection of saved tabs, newest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabBook {
    records: Vec<TabRecord>,
}

impl TabBook {
    pub fn new() -> Self {
        TabBook::default()
    }

    pub fn from_records(records: Vec<TabRecord>) -> Self {
        TabBook { records }
    }

    pub fn records(&self) -> &[TabRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: i64) -> Option<&TabRecord> {
        self.records.iter().find(|r| r.id == id)
    }

    /// Serialize the grid under a trimmed title and prepend the new
    /// record. The id is `now` in epoch milliseconds and the display date
    /// is the short local form (e.g. `"Jan 5"`). The caller persists and
    /// resets the grid on success.
    pub fn save(
        &mut self,
        title: &str,
        grid: &Grid,
        now: DateTime<Local>,
    ) -> std::result::Result<TabRecord, SaveError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(SaveError::EmptyTitle);
        }
        let record = TabRecord {
            id: now.timestamp_millis(),
            title: title.to_string(),
            tab: grid.serialize(),
            date: now.format("%b %-d").to_string(),
        };
        self.records.insert(0, record.clone());
        Ok(record)
    }

    /// Remove the record with this id. Absent ids are a silent no-op.
    pub fn delete(&mut self, id: i64) -> bool {
        let before = self.records.len();
        self.records.retain(|r| r.id != id);
        self.records.len() != before
    }

    /// Case-insensitive substring match on titles. Lazy and restartable;
    /// the empty query yields every record in collection order.
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a TabRecord> {
        let needle = query.to_lowercase();
        self.records
            .iter()
            .filter(move |r| r.title.to_lowercase().contains(&needle))
    }

    /// Pretty-printed JSON array of the whole collection, the backup
    /// format written by export.
    pub fn export_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.records)?)
    }

    /// Destructive bulk replace, not a merge. Call only after the user
    /// confirmed.
    pub fn replace_all(&mut self, records: Vec<TabRecord>) {
        self.records = records;
    }

    /// Parse a backup, ask for confirmation with the record count, and
    /// replace the collection if the user accepts. Parse failures and a
    /// declined prompt both leave the collection untouched.
    pub fn restore_with_prompt(
        &mut self,
        text: &str,
        prompt: &mut dyn UserPrompt,
    ) -> std::result::Result<RestoreOutcome, RestoreError> {
        let records = parse_backup(text)?;
        if !prompt.confirm(&format!("Restore {} tabs?", records.len())) {
            return Ok(RestoreOutcome::Declined);
        }
        let count = records.len();
        self.replace_all(records);
        prompt.notify("Restored!");
        Ok(RestoreOutcome::Replaced(count))
    }
}

/// Parse exported backup text. Accepts only a top-level JSON array of
/// record objects; never mutates anything.
pub fn parse_backup(text: &str) -> std::result::Result<Vec<TabRecord>, RestoreError> {
    let value: serde_json::Value =
        serde_json::from_str(text).map_err(|e| RestoreError::InvalidJson(e.to_string()))?;
    if !value.is_array() {
        return Err(RestoreError::NotAnArray);
    }
    serde_json::from_value(value).map_err(|e| RestoreError::InvalidJson(e.to_string()))
}

/// Conventional backup filename for a given day: `easy-guitar-tabs-<date>.json`.
pub fn export_filename(now: DateTime<Local>) -> String {
    format!("easy-guitar-tabs-{}.json", now.format("%Y-%m-%d"))
}

impl Store {
    /// Load the collection from the key-value store. Missing data is an
    /// empty book; unreadable data is logged and treated as empty rather
    /// than taking the editor down.
    pub fn load_tabs(&self) -> Result<TabBook> {
        let Some(raw) = self.kv_get(TABS_KEY)? else {
            return Ok(TabBook::new());
        };
        match serde_json::from_str::<Vec<TabRecord>>(&raw) {
            Ok(records) => Ok(TabBook::from_records(records)),
            Err(e) => {
                tracing::warn!("stored tab collection is unreadable, starting empty: {e}");
                Ok(TabBook::new())
            }
        }
    }

    /// Write the full collection back under [`TABS_KEY`].
    pub fn persist_tabs(&self, book: &TabBook) -> Result<()> {
        let json = serde_json::to_string(book.records())?;
        self.kv_set(TABS_KEY, &json)
    }
}
