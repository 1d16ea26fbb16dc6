//! Service object owning the live index, upload status, and session history.

use crate::{
    config::Config,
    embedding::{EmbeddingClient, EmbeddingClientError, get_embedding_client},
    generation::{GenerationClient, get_generation_client},
    metrics::{MetricsSnapshot, ServiceMetrics},
    processing::{
        chunking::split_pages,
        history::History,
        index::VectorIndex,
        loader::{
            PageExtractor, PdfPageExtractor, clear_staging_dir, load_pdf, partition_uploads,
            stage_file, staged_pdfs,
        },
        prompt::{TokenCounter, compose_prompt, default_token_counter},
        status::{ProcessingStatus, StatusTracker},
        types::{
            AnswerError, AnswerOutcome, HistoryEntry, IndexError, IngestError, IngestOutcome,
            RetrievalError, ScoredChunk, ServiceInitError, UploadedFile,
        },
    },
};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;

const DEFAULT_CHUNK_SIZE: usize = 1000;
const DEFAULT_CHUNK_OVERLAP: usize = 200;
const DEFAULT_TOP_K: usize = 3;
const DEFAULT_CONTEXT_TOKEN_BUDGET: usize = 6000;
const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 64;

/// Tunables for ingestion and retrieval.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Scratch directory for uploaded files.
    pub staging_dir: PathBuf,
    /// Target chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between adjacent chunks in characters.
    pub chunk_overlap: usize,
    /// Chunks retrieved per question.
    pub top_k: usize,
    /// Token budget for the context block.
    pub context_token_budget: usize,
    /// Texts per embedding request.
    pub embedding_batch_size: usize,
    /// Required embedding dimension, if configured.
    pub embedding_dimension: Option<usize>,
}

impl PipelineSettings {
    /// Default settings staging uploads under `staging_dir`.
    pub fn new(staging_dir: impl Into<PathBuf>) -> Self {
        Self {
            staging_dir: staging_dir.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            chunk_overlap: DEFAULT_CHUNK_OVERLAP,
            top_k: DEFAULT_TOP_K,
            context_token_budget: DEFAULT_CONTEXT_TOKEN_BUDGET,
            embedding_batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
            embedding_dimension: None,
        }
    }

    /// Settings derived from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            staging_dir: config.staging_dir.clone(),
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
            top_k: config.retrieval_top_k,
            context_token_budget: config.context_token_budget,
            embedding_batch_size: config.embedding_batch_size,
            embedding_dimension: config.embedding_dimension,
        }
    }
}

/// Coordinates the upload pipeline (stage, load, split, embed, index) and question answering.
///
/// Construct once at startup and share through an `Arc`. The index reference, status record and
/// history each sit behind their own lock, held only while swapping or copying; embedding and
/// generation run without any lock held. Upload batches are serialized because they share one
/// staging directory.
pub struct RagService {
    settings: PipelineSettings,
    extractor: Arc<dyn PageExtractor>,
    embedding_client: Arc<dyn EmbeddingClient>,
    generation_client: Arc<dyn GenerationClient>,
    token_counter: TokenCounter,
    index: RwLock<Option<Arc<VectorIndex>>>,
    status: StatusTracker,
    history: History,
    metrics: ServiceMetrics,
    ingest_lock: tokio::sync::Mutex<()>,
}

/// Abstraction over the service used by the HTTP surface.
#[async_trait]
pub trait RagApi: Send + Sync {
    /// Replace the index with the contents of an upload batch.
    async fn ingest_uploads(&self, files: Vec<UploadedFile>) -> Result<IngestOutcome, IngestError>;

    /// Answer a question from the live index and record it in the history.
    async fn answer_question(&self, question: String) -> Result<AnswerOutcome, AnswerError>;

    /// Current upload status.
    fn status_snapshot(&self) -> ProcessingStatus;

    /// Every recorded question/answer exchange.
    fn history(&self) -> Vec<HistoryEntry>;

    /// Service counters.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

impl RagService {
    /// Build a service around explicit clients, extracting PDFs with `pdf-extract`.
    pub fn new(
        settings: PipelineSettings,
        embedding_client: Arc<dyn EmbeddingClient>,
        generation_client: Arc<dyn GenerationClient>,
    ) -> Self {
        Self {
            settings,
            extractor: Arc::new(PdfPageExtractor),
            embedding_client,
            generation_client,
            token_counter: default_token_counter(),
            index: RwLock::new(None),
            status: StatusTracker::new(),
            history: History::new(),
            metrics: ServiceMetrics::new(),
            ingest_lock: tokio::sync::Mutex::new(()),
        }
    }

    /// Build a service with the providers selected by configuration.
    pub fn from_config(config: &Config) -> Result<Self, ServiceInitError> {
        tracing::info!("Initializing embedding and generation clients");
        let embedding_client = get_embedding_client(config)?;
        let generation_client = get_generation_client(config)?;
        Ok(Self::new(
            PipelineSettings::from_config(config),
            embedding_client,
            generation_client,
        ))
    }

    /// Replace the page extractor.
    pub fn with_extractor(mut self, extractor: Arc<dyn PageExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    /// Replace the token counter used to bound the context block.
    pub fn with_token_counter(mut self, counter: TokenCounter) -> Self {
        self.token_counter = counter;
        self
    }

    /// Staging directory used for uploads.
    pub fn staging_dir(&self) -> &Path {
        &self.settings.staging_dir
    }

    /// The live index, if one has been published.
    pub fn current_index(&self) -> Option<Arc<VectorIndex>> {
        self.index
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn publish_index(&self, index: VectorIndex) {
        *self.index.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(index));
    }

    /// Run an upload batch end to end.
    ///
    /// Non-PDF files are reported in [`IngestOutcome::invalid_files`] without aborting the batch.
    /// The previous index stays live until the new one is fully built.
    pub async fn ingest_uploads(
        &self,
        files: Vec<UploadedFile>,
    ) -> Result<IngestOutcome, IngestError> {
        let _batch = self.ingest_lock.lock().await;
        let started = Instant::now();
        self.status.reset();

        if files.is_empty() {
            return Err(self.abort_batch(IngestError::NoFiles));
        }

        let (valid, invalid_files) = partition_uploads(files);
        if !invalid_files.is_empty() {
            tracing::warn!(invalid = ?invalid_files, "Rejected non-PDF uploads");
        }
        if valid.is_empty() {
            return Err(self.abort_batch(IngestError::NoValidFiles { invalid_files }));
        }
        self.status.begin(valid.len());

        match self.build_index(valid).await {
            Ok((index, files_processed, pages_loaded)) => {
                let documents_processed = index.len();
                self.publish_index(index);
                self.status.complete(!invalid_files.is_empty());
                self.metrics.record_batch(documents_processed as u64);

                let elapsed = started.elapsed();
                tracing::info!(
                    files = files_processed,
                    pages = pages_loaded,
                    chunks = documents_processed,
                    rejected = invalid_files.len(),
                    elapsed_ms = elapsed.as_millis() as u64,
                    "Index rebuilt"
                );
                Ok(IngestOutcome {
                    documents_processed,
                    files_processed,
                    pages_loaded,
                    invalid_files,
                    elapsed,
                })
            }
            Err(error) => Err(self.abort_batch(error)),
        }
    }

    fn abort_batch(&self, error: IngestError) -> IngestError {
        tracing::error!(error = %error, "Upload batch failed");
        self.status.fail(error.to_string());
        self.metrics.record_failed_batch();
        error
    }

    async fn build_index(
        &self,
        valid: Vec<UploadedFile>,
    ) -> Result<(VectorIndex, usize, usize), IngestError> {
        let staging_dir = &self.settings.staging_dir;
        clear_staging_dir(staging_dir).await?;
        for file in &valid {
            stage_file(staging_dir, file).await?;
        }
        drop(valid);

        let staged = staged_pdfs(staging_dir)?;
        let files_processed = staged.len();
        // Uploads sharing a sanitized name collapse into one staged file.
        if files_processed != self.status.snapshot().total_files {
            self.status.begin(files_processed);
        }

        let mut pages = Vec::new();
        for path in staged {
            let filename = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_default();
            self.status.start_file(&filename);
            pages.extend(load_pdf(self.extractor.clone(), path).await?);
            self.status.finish_file();
        }
        let pages_loaded = pages.len();

        let chunk_size = self.settings.chunk_size;
        let overlap = self.settings.chunk_overlap;
        let chunks = tokio::task::spawn_blocking(move || split_pages(&pages, chunk_size, overlap))
            .await
            .map_err(|error| IngestError::Worker(error.to_string()))??;
        tracing::debug!(
            pages = pages_loaded,
            chunks = chunks.len(),
            chunk_size,
            overlap,
            "Split pages into chunks"
        );

        let texts = chunks.iter().map(|chunk| chunk.text.clone()).collect();
        let vectors = self.embed_texts(texts).await?;
        let index = VectorIndex::build(chunks, vectors)?;

        if let (Some(expected), Some(actual)) = (self.settings.embedding_dimension, index.dimension())
        {
            if expected != actual {
                return Err(IndexError::DimensionMismatch { expected, actual }.into());
            }
        }

        Ok((index, files_processed, pages_loaded))
    }

    async fn embed_texts(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        let batch_size = self.settings.embedding_batch_size.max(1);
        let mut vectors = Vec::with_capacity(texts.len());

        for batch in texts.chunks(batch_size) {
            let batch_vectors = self
                .embedding_client
                .generate_embeddings(batch.to_vec())
                .await?;
            if batch_vectors.len() != batch.len() {
                return Err(EmbeddingClientError::InvalidResponse(format!(
                    "expected {} vectors, received {}",
                    batch.len(),
                    batch_vectors.len()
                )));
            }
            vectors.extend(batch_vectors);
        }

        Ok(vectors)
    }

    /// Embed `query` and return up to `k` chunks from the live index.
    ///
    /// Fails with [`RetrievalError::NotReady`] when no index exists or the live index holds no
    /// chunks.
    pub async fn retrieve(&self, query: &str, k: usize) -> Result<Vec<ScoredChunk>, RetrievalError> {
        let index = self
            .current_index()
            .filter(|index| !index.is_empty())
            .ok_or(RetrievalError::NotReady)?;
        let expected = index.dimension().ok_or(RetrievalError::NotReady)?;

        let mut vectors = self
            .embedding_client
            .generate_embeddings(vec![query.to_string()])
            .await?;
        let vector = vectors.pop().ok_or(RetrievalError::EmptyEmbedding)?;
        if vector.len() != expected {
            return Err(RetrievalError::DimensionMismatch {
                expected,
                actual: vector.len(),
            });
        }

        Ok(index.query(&vector, k))
    }

    /// Retrieve context for `question`, ask the language model, and append to the history.
    pub async fn answer_question(&self, question: String) -> Result<AnswerOutcome, AnswerError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(AnswerError::EmptyQuestion);
        }

        let started = Instant::now();
        match self.generate_answer(question).await {
            Ok(answer) => {
                let response_time = round_seconds(started.elapsed().as_secs_f64());
                let history = self.history.append(HistoryEntry {
                    question: question.to_string(),
                    answer: answer.clone(),
                    response_time,
                });
                self.metrics.record_answer();
                tracing::info!(response_time, history = history.len(), "Question answered");
                Ok(AnswerOutcome {
                    answer,
                    response_time,
                    history,
                })
            }
            Err(error) => {
                if error.is_client_error() {
                    tracing::debug!(error = %error, "Question rejected");
                } else {
                    self.metrics.record_failed_answer();
                    tracing::error!(error = %error, "Question failed");
                }
                Err(error)
            }
        }
    }

    async fn generate_answer(&self, question: &str) -> Result<String, AnswerError> {
        let hits = self.retrieve(question, self.settings.top_k).await?;
        tracing::debug!(
            retrieved = hits.len(),
            top_score = hits.first().map(|hit| hit.score),
            "Retrieved context"
        );
        let prompt = compose_prompt(
            question,
            &hits,
            self.settings.context_token_budget,
            &self.token_counter,
        );
        Ok(self.generation_client.complete(prompt).await?)
    }

    /// Current upload status.
    pub fn status_snapshot(&self) -> ProcessingStatus {
        self.status.snapshot()
    }

    /// Every recorded exchange in arrival order.
    pub fn history(&self) -> Vec<HistoryEntry> {
        self.history.entries()
    }

    /// Current service counters.
    pub fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

fn round_seconds(seconds: f64) -> f64 {
    (seconds * 10_000.0).round() / 10_000.0
}

#[async_trait]
impl RagApi for RagService {
    async fn ingest_uploads(&self, files: Vec<UploadedFile>) -> Result<IngestOutcome, IngestError> {
        RagService::ingest_uploads(self, files).await
    }

    async fn answer_question(&self, question: String) -> Result<AnswerOutcome, AnswerError> {
        RagService::answer_question(self, question).await
    }

    fn status_snapshot(&self) -> ProcessingStatus {
        RagService::status_snapshot(self)
    }

    fn history(&self) -> Vec<HistoryEntry> {
        RagService::history(self)
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        RagService::metrics_snapshot(self)
    }
}
