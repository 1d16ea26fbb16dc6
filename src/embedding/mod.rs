//! Embedding client abstraction and provider adapters.
//!
//! Every adapter maps a batch of texts to one vector per text. Remote providers live in
//! [`http`]; the hashing client is an in-process fallback that needs no network access.

mod http;

use crate::config::{Config, EmbeddingProvider};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

pub use http::{GeminiEmbeddingClient, OllamaEmbeddingClient, OpenAiEmbeddingClient};

const DEFAULT_HASH_DIMENSION: usize = 384;
const DEFAULT_GEMINI_URL: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Errors raised by embedding providers.
#[derive(Debug, Error)]
pub enum EmbeddingClientError {
    /// Provider could not be reached or constructed.
    #[error("Embedding provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider was unable to produce embeddings for the supplied input.
    #[error("Failed to generate embeddings: {0}")]
    GenerationFailed(String),
    /// Provider response could not be decoded or did not match the request.
    #[error("Malformed embedding response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by embedding backends.
#[async_trait]
pub trait EmbeddingClient: Send + Sync {
    /// Produce an embedding vector for each supplied text, in input order.
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError>;
}

/// Deterministic feature-hashing embeddings.
///
/// Lowercased alphanumeric words are hashed into a fixed number of buckets and the resulting
/// term-frequency vector is L2-normalized, so texts sharing vocabulary score higher under
/// inner product.
pub struct HashEmbeddingClient {
    dimension: usize,
}

impl HashEmbeddingClient {
    /// Construct a hashing client producing vectors of `dimension` components.
    pub const fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn encode(text: &str, dimension: usize) -> Vec<f32> {
        let mut embedding = vec![0.0_f32; dimension];

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|word| !word.is_empty())
        {
            let slot = (fnv1a(&word.to_lowercase()) % dimension as u64) as usize;
            embedding[slot] += 1.0;
        }

        let norm = embedding
            .iter()
            .map(|value| value * value)
            .sum::<f32>()
            .sqrt();

        if norm > 0.0 {
            for value in &mut embedding {
                *value /= norm;
            }
        }

        embedding
    }
}

impl Default for HashEmbeddingClient {
    fn default() -> Self {
        Self::new(DEFAULT_HASH_DIMENSION)
    }
}

fn fnv1a(input: &str) -> u64 {
    input.bytes().fold(0xcbf2_9ce4_8422_2325_u64, |hash, byte| {
        (hash ^ u64::from(byte)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[async_trait]
impl EmbeddingClient for HashEmbeddingClient {
    async fn generate_embeddings(
        &self,
        texts: Vec<String>,
    ) -> Result<Vec<Vec<f32>>, EmbeddingClientError> {
        if self.dimension == 0 {
            return Err(EmbeddingClientError::GenerationFailed(
                "embedding dimension must be greater than zero".to_string(),
            ));
        }

        tracing::trace!(
            count = texts.len(),
            dimension = self.dimension,
            "Hashing embeddings"
        );
        Ok(texts
            .iter()
            .map(|text| Self::encode(text, self.dimension))
            .collect())
    }
}

/// Build the embedding client selected by configuration.
pub fn get_embedding_client(
    config: &Config,
) -> Result<Arc<dyn EmbeddingClient>, EmbeddingClientError> {
    let api_key = config.embedding_api_key.clone().unwrap_or_default();
    let model = config.embedding_model.clone();

    let client: Arc<dyn EmbeddingClient> = match config.embedding_provider {
        EmbeddingProvider::Gemini => Arc::new(GeminiEmbeddingClient::new(
            base_url_or(&config.embedding_base_url, DEFAULT_GEMINI_URL),
            api_key,
            model,
        )?),
        EmbeddingProvider::OpenAI => Arc::new(OpenAiEmbeddingClient::new(
            base_url_or(&config.embedding_base_url, DEFAULT_OPENAI_URL),
            api_key,
            model,
        )?),
        EmbeddingProvider::Ollama => {
            let fallback = config.ollama_url.as_deref().unwrap_or(DEFAULT_OLLAMA_URL);
            Arc::new(OllamaEmbeddingClient::new(
                base_url_or(&config.embedding_base_url, fallback),
                model,
            )?)
        }
        EmbeddingProvider::Hash => Arc::new(HashEmbeddingClient::new(
            config.embedding_dimension.unwrap_or(DEFAULT_HASH_DIMENSION),
        )),
    };

    tracing::info!(
        provider = ?config.embedding_provider,
        model = %config.embedding_model,
        "Embedding client initialized"
    );
    Ok(client)
}

fn base_url_or(configured: &Option<String>, fallback: &str) -> String {
    configured
        .as_deref()
        .unwrap_or(fallback)
        .trim_end_matches('/')
        .to_string()
}
