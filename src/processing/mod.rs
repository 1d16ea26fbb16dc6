//! Document pipeline: staging, PDF loading, chunking, vector indexing, and question answering.

pub mod chunking;
pub mod history;
pub mod index;
pub mod loader;
pub mod prompt;
mod service;
pub mod status;
pub mod types;

pub use service::{PipelineSettings, RagApi, RagService};
pub use status::{ProcessingStatus, UploadState};
pub use types::{
    AnswerError, AnswerOutcome, ChunkSource, ChunkingError, DocumentChunk, HistoryEntry,
    IndexError, IngestError, IngestOutcome, LoadError, PageText, RetrievalError, ScoredChunk,
    ServiceInitError, UploadedFile,
};
