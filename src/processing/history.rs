//! Append-only question/answer log kept for the process lifetime.

use super::types::HistoryEntry;
use std::sync::{Mutex, PoisonError};

/// Session history. Entries are never evicted or deduplicated.
#[derive(Debug, Default)]
pub struct History {
    entries: Mutex<Vec<HistoryEntry>>,
}

impl History {
    /// Create an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an exchange and return the full history including it.
    pub fn append(&self, entry: HistoryEntry) -> Vec<HistoryEntry> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.push(entry);
        entries.clone()
    }

    /// Clone every recorded exchange in arrival order.
    pub fn entries(&self) -> Vec<HistoryEntry> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Number of recorded exchanges.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether no exchange has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
