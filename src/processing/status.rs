//! Upload progress shared with polling clients.

use serde::Serialize;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Lifecycle of the most recent upload batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadState {
    /// No batch has started, or a new batch is being prepared.
    Idle,
    /// Files are being loaded, split, and embedded.
    Processing,
    /// Every uploaded file was ingested.
    Completed,
    /// Valid files were ingested but some uploads were rejected.
    CompletedWithErrors,
    /// The batch failed; the previous index (if any) is still live.
    Error,
}

/// Snapshot of the upload status as reported by `POST /upload-status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingStatus {
    /// File currently being loaded.
    pub current_file: String,
    /// Number of PDF files in the batch.
    pub total_files: usize,
    /// Number of files loaded so far.
    pub processed_files: usize,
    /// Current lifecycle state.
    pub status: UploadState,
    /// Failure description, only present in the `error` state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl Default for ProcessingStatus {
    fn default() -> Self {
        Self {
            current_file: String::new(),
            total_files: 0,
            processed_files: 0,
            status: UploadState::Idle,
            error_message: None,
        }
    }
}

/// Mutex-guarded status record; each accessor holds the lock only for a field update.
#[derive(Debug, Default)]
pub struct StatusTracker {
    inner: Mutex<ProcessingStatus>,
}

impl StatusTracker {
    /// Create a tracker in the `idle` state.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, ProcessingStatus> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Clone the current status.
    pub fn snapshot(&self) -> ProcessingStatus {
        self.lock().clone()
    }

    /// Return to `idle`, clearing counters and any previous error.
    pub fn reset(&self) {
        *self.lock() = ProcessingStatus::default();
    }

    /// Enter `processing` once the number of files is known.
    pub fn begin(&self, total_files: usize) {
        let mut status = self.lock();
        status.status = UploadState::Processing;
        status.total_files = total_files;
        status.processed_files = 0;
        status.current_file.clear();
        status.error_message = None;
    }

    /// Record the file currently being loaded.
    pub fn start_file(&self, filename: &str) {
        self.lock().current_file = filename.to_string();
    }

    /// Count a fully loaded file.
    pub fn finish_file(&self) {
        let mut status = self.lock();
        status.processed_files = (status.processed_files + 1).min(status.total_files);
    }

    /// Mark the batch as finished, noting whether any uploads were rejected.
    pub fn complete(&self, had_invalid_files: bool) {
        let mut status = self.lock();
        status.status = if had_invalid_files {
            UploadState::CompletedWithErrors
        } else {
            UploadState::Completed
        };
        status.current_file.clear();
        status.error_message = None;
    }

    /// Mark the batch as failed with a human-readable message.
    pub fn fail(&self, message: impl Into<String>) {
        let mut status = self.lock();
        status.status = UploadState::Error;
        status.error_message = Some(message.into());
    }
}
