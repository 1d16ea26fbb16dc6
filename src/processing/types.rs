//! Core data types and error definitions for the ingestion and question pipeline.

use crate::{embedding::EmbeddingClientError, generation::GenerationClientError};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;

/// Provenance carried by every chunk.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkSource {
    /// Name of the uploaded file the chunk came from.
    pub filename: String,
    /// 1-based page number within that file.
    pub page_number: usize,
}

/// A bounded window of page text with its provenance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentChunk {
    /// Chunk text.
    pub text: String,
    /// Where the text was extracted from.
    pub source: ChunkSource,
}

/// Text of a single PDF page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// Extracted page text.
    pub text: String,
    /// Source file and page number.
    pub source: ChunkSource,
}

/// A chunk returned by the retriever together with its similarity score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredChunk {
    /// Retrieved chunk.
    pub chunk: DocumentChunk,
    /// Inner product between the normalized query and chunk vectors.
    pub score: f32,
}

/// One file part received by the upload endpoint.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Client-supplied filename.
    pub filename: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

/// Summary of a completed upload batch.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestOutcome {
    /// Number of chunks placed in the new index.
    pub documents_processed: usize,
    /// Number of PDF files that were loaded.
    pub files_processed: usize,
    /// Number of pages extracted across all files.
    pub pages_loaded: usize,
    /// Filenames rejected by the suffix check.
    pub invalid_files: Vec<String>,
    /// Wall-clock time spent on the batch.
    pub elapsed: Duration,
}

/// Question/answer exchange recorded in the session history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry {
    /// Question as asked.
    pub question: String,
    /// Answer returned by the language model.
    pub answer: String,
    /// Seconds spent retrieving and generating, rounded to four decimals.
    pub response_time: f64,
}

/// Result of answering a question.
#[derive(Debug, Clone, PartialEq)]
pub struct AnswerOutcome {
    /// Model answer.
    pub answer: String,
    /// Seconds spent retrieving and generating, rounded to four decimals.
    pub response_time: f64,
    /// Full history including this exchange.
    pub history: Vec<HistoryEntry>,
}

/// Errors produced while staging or reading uploaded PDFs.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Filesystem access to the staging area failed.
    #[error("staging I/O failed for {path}: {source}")]
    Io {
        /// Path that could not be read or written.
        path: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The PDF parser rejected the file.
    #[error("failed to extract text from {filename}: {message}")]
    Pdf {
        /// Offending file.
        filename: String,
        /// Parser diagnostic.
        message: String,
    },
}

/// Errors produced while splitting page text into chunks.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkingError {
    /// Ingestion configured an impossible chunk size.
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,
    /// Overlap must leave room for new text in every chunk.
    #[error("chunk overlap {overlap} must be smaller than chunk size {chunk_size}")]
    OverlapTooLarge {
        /// Requested chunk size.
        chunk_size: usize,
        /// Requested overlap.
        overlap: usize,
    },
}

/// Errors produced while building a vector index.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    /// Number of vectors differs from the number of chunks.
    #[error("received {vectors} vectors for {chunks} chunks")]
    CountMismatch {
        /// Chunks supplied.
        chunks: usize,
        /// Vectors supplied.
        vectors: usize,
    },
    /// A vector had no components.
    #[error("embedding for chunk {position} is empty")]
    EmptyVector {
        /// Position of the offending chunk.
        position: usize,
    },
    /// Vectors do not share a single dimension.
    #[error("embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension established by the first vector or configuration.
        expected: usize,
        /// Dimension of the offending vector.
        actual: usize,
    },
}

/// Errors raised while wiring the service's external clients.
#[derive(Debug, Error)]
pub enum ServiceInitError {
    /// Embedding client could not be constructed.
    #[error("Failed to initialize embedding client: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Generation client could not be constructed.
    #[error("Failed to initialize generation client: {0}")]
    Generation(#[from] GenerationClientError),
}

/// Errors that abort an upload batch.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The request carried no file parts.
    #[error("No files were uploaded.")]
    NoFiles,
    /// Every uploaded file failed the `.pdf` suffix check.
    #[error("No valid PDF files were uploaded.")]
    NoValidFiles {
        /// Rejected filenames.
        invalid_files: Vec<String>,
    },
    /// Staging or PDF parsing failed.
    #[error("Failed to load documents: {0}")]
    Load(#[from] LoadError),
    /// Chunking step failed.
    #[error("Failed to split documents: {0}")]
    Chunking(#[from] ChunkingError),
    /// Embedding provider failed.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Index construction failed.
    #[error("Failed to build index: {0}")]
    Index(#[from] IndexError),
    /// A background worker panicked or was aborted.
    #[error("Background task failed: {0}")]
    Worker(String),
}

/// Errors raised while retrieving context for a question.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// No index has been built yet.
    #[error("Please upload PDFs first.")]
    NotReady,
    /// Embedding provider failed for the query.
    #[error("Failed to generate embeddings: {0}")]
    Embedding(#[from] EmbeddingClientError),
    /// Embedding provider returned no vector.
    #[error("Embedding provider returned no vectors for the query")]
    EmptyEmbedding,
    /// Query vector does not match the index dimension.
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// Dimension of the live index.
        expected: usize,
        /// Dimension of the query vector.
        actual: usize,
    },
}

/// Errors raised while answering a question.
#[derive(Debug, Error)]
pub enum AnswerError {
    /// Question text was blank.
    #[error("Question must not be empty.")]
    EmptyQuestion,
    /// Retrieval failed or no index exists.
    #[error(transparent)]
    Retrieval(#[from] RetrievalError),
    /// The language model call failed.
    #[error("{0}")]
    Generation(#[from] GenerationClientError),
}

impl AnswerError {
    /// Whether the error stems from the caller rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::EmptyQuestion | Self::Retrieval(RetrievalError::NotReady)
        )
    }
}
