use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Errors encountered while loading configuration from environment variables.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Required environment variable was not provided.
    #[error("Missing environment variable: {0}")]
    MissingVariable(String),
    /// Environment variable contained a value that could not be parsed.
    #[error("Invalid value for environment variable: {0}")]
    InvalidValue(String),
}

/// Runtime configuration for the Rusty RAG server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Optional override for the HTTP server port.
    pub server_port: Option<u16>,
    /// Scratch directory that receives uploaded PDFs before extraction.
    pub staging_dir: PathBuf,
    /// Directory served under `/static`.
    pub static_dir: PathBuf,
    /// HTML shell returned by `GET /`.
    pub index_html_path: PathBuf,
    /// Upper bound on a multipart upload body in bytes.
    pub max_upload_bytes: usize,
    /// Target chunk size measured in characters.
    pub chunk_size: usize,
    /// Characters shared between adjacent chunks of the same page.
    pub chunk_overlap: usize,
    /// Number of chunks retrieved per question.
    pub retrieval_top_k: usize,
    /// Token budget for the context block handed to the language model.
    pub context_token_budget: usize,
    /// Embedding provider used to vectorize chunks and questions.
    pub embedding_provider: EmbeddingProvider,
    /// Embedding model identifier passed to the provider.
    pub embedding_model: String,
    /// API key for the embedding provider, when it needs one.
    pub embedding_api_key: Option<String>,
    /// Optional base URL override for the embedding provider.
    pub embedding_base_url: Option<String>,
    /// Expected dimensionality of embeddings; `None` accepts whatever the provider returns.
    pub embedding_dimension: Option<usize>,
    /// Maximum number of texts per embedding request.
    pub embedding_batch_size: usize,
    /// Provider that answers questions from the assembled prompt.
    pub generation_provider: GenerationProvider,
    /// Chat or completion model identifier.
    pub generation_model: String,
    /// API key for the generation provider, when it needs one.
    pub generation_api_key: Option<String>,
    /// Optional base URL override for the generation provider.
    pub generation_base_url: Option<String>,
    /// Base URL of a local Ollama runtime.
    pub ollama_url: Option<String>,
}

/// Supported embedding backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// Google Generative Language embeddings API.
    Gemini,
    /// OpenAI-compatible `/embeddings` endpoint.
    OpenAI,
    /// Local Ollama runtime.
    Ollama,
    /// Deterministic in-process hashing embeddings.
    Hash,
}

/// Supported language model backends.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GenerationProvider {
    /// Groq's OpenAI-compatible chat completions API.
    Groq,
    /// OpenAI chat completions API.
    OpenAI,
    /// Local Ollama runtime.
    Ollama,
}

const DEFAULT_CHUNK_SIZE: usize = 1000;
const DEFAULT_CHUNK_OVERLAP: usize = 200;
const DEFAULT_TOP_K: usize = 3;
const DEFAULT_CONTEXT_TOKEN_BUDGET: usize = 6000;
const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 64;
const DEFAULT_MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

impl Config {
    /// Load configuration from environment variables, performing validation along the way.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(&EnvVars(|key: &str| env::var(key).ok()))
    }

    fn from_vars<F>(vars: &EnvVars<F>) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let embedding_provider = match vars.optional("EMBEDDING_PROVIDER") {
            Some(value) => value
                .parse()
                .map_err(|()| ConfigError::InvalidValue("EMBEDDING_PROVIDER".to_string()))?,
            None => EmbeddingProvider::Gemini,
        };
        let generation_provider = match vars.optional("GENERATION_PROVIDER") {
            Some(value) => value
                .parse()
                .map_err(|()| ConfigError::InvalidValue("GENERATION_PROVIDER".to_string()))?,
            None => GenerationProvider::Groq,
        };

        let embedding_api_key = vars.optional("EMBEDDING_API_KEY").or_else(|| {
            match embedding_provider {
                EmbeddingProvider::Gemini => vars.optional("GOOGLE_API_KEY"),
                EmbeddingProvider::OpenAI => vars.optional("OPENAI_API_KEY"),
                EmbeddingProvider::Ollama | EmbeddingProvider::Hash => None,
            }
        });
        if embedding_api_key.is_none()
            && matches!(
                embedding_provider,
                EmbeddingProvider::Gemini | EmbeddingProvider::OpenAI
            )
        {
            return Err(ConfigError::MissingVariable("EMBEDDING_API_KEY".to_string()));
        }

        let generation_api_key = vars.optional("GENERATION_API_KEY").or_else(|| {
            match generation_provider {
                GenerationProvider::Groq => vars.optional("GROQ_API_KEY"),
                GenerationProvider::OpenAI => vars.optional("OPENAI_API_KEY"),
                GenerationProvider::Ollama => None,
            }
        });
        if generation_api_key.is_none() && generation_provider != GenerationProvider::Ollama {
            return Err(ConfigError::MissingVariable(
                "GENERATION_API_KEY".to_string(),
            ));
        }

        let chunk_size = vars.parse("CHUNK_SIZE")?.unwrap_or(DEFAULT_CHUNK_SIZE);
        let chunk_overlap = vars.parse("CHUNK_OVERLAP")?.unwrap_or(DEFAULT_CHUNK_OVERLAP);
        if chunk_size == 0 || chunk_overlap >= chunk_size {
            return Err(ConfigError::InvalidValue("CHUNK_OVERLAP".to_string()));
        }

        Ok(Self {
            server_port: vars.parse("SERVER_PORT")?,
            staging_dir: vars
                .optional("STAGING_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("temp")),
            static_dir: vars
                .optional("STATIC_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("static")),
            index_html_path: vars
                .optional("INDEX_HTML_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("index.html")),
            max_upload_bytes: vars
                .parse("MAX_UPLOAD_BYTES")?
                .unwrap_or(DEFAULT_MAX_UPLOAD_BYTES),
            chunk_size,
            chunk_overlap,
            retrieval_top_k: vars
                .parse("RETRIEVAL_TOP_K")?
                .unwrap_or(DEFAULT_TOP_K)
                .max(1),
            context_token_budget: vars
                .parse("CONTEXT_TOKEN_BUDGET")?
                .unwrap_or(DEFAULT_CONTEXT_TOKEN_BUDGET),
            embedding_provider,
            embedding_model: vars
                .optional("EMBEDDING_MODEL")
                .unwrap_or_else(|| default_embedding_model(embedding_provider).to_string()),
            embedding_api_key,
            embedding_base_url: vars.optional("EMBEDDING_BASE_URL"),
            embedding_dimension: vars.parse("EMBEDDING_DIMENSION")?,
            embedding_batch_size: vars
                .parse("EMBEDDING_BATCH_SIZE")?
                .unwrap_or(DEFAULT_EMBEDDING_BATCH_SIZE)
                .max(1),
            generation_provider,
            generation_model: vars
                .optional("GENERATION_MODEL")
                .unwrap_or_else(|| default_generation_model(generation_provider).to_string()),
            generation_api_key,
            generation_base_url: vars.optional("GENERATION_BASE_URL"),
            ollama_url: vars.optional("OLLAMA_URL"),
        })
    }
}

/// Variable source; blank values count as unset.
struct EnvVars<F>(F);

impl<F> EnvVars<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn optional(&self, key: &str) -> Option<String> {
        (self.0)(key).filter(|value| !value.trim().is_empty())
    }

    fn parse<T: std::str::FromStr>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        self.optional(key)
            .map(|value| {
                value
                    .trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue(key.to_string()))
            })
            .transpose()
    }
}

fn default_embedding_model(provider: EmbeddingProvider) -> &'static str {
    match provider {
        EmbeddingProvider::Gemini => "models/embedding-001",
        EmbeddingProvider::OpenAI => "text-embedding-3-small",
        EmbeddingProvider::Ollama => "nomic-embed-text",
        EmbeddingProvider::Hash => "hash-384",
    }
}

fn default_generation_model(provider: GenerationProvider) -> &'static str {
    match provider {
        GenerationProvider::Groq => "llama3-8b-8192",
        GenerationProvider::OpenAI => "gpt-4o-mini",
        GenerationProvider::Ollama => "llama3",
    }
}

impl std::str::FromStr for EmbeddingProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" | "google" => Ok(Self::Gemini),
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            "hash" => Ok(Self::Hash),
            _ => Err(()),
        }
    }
}

impl std::str::FromStr for GenerationProvider {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "groq" => Ok(Self::Groq),
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            _ => Err(()),
        }
    }
}

/// Command-line overrides applied on top of the environment.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    /// Port requested on the command line.
    pub server_port: Option<u16>,
    /// Staging directory requested on the command line.
    pub staging_dir: Option<PathBuf>,
}

/// Load `.env` and the environment, then apply command-line overrides.
pub fn init_config(overrides: ConfigOverrides) -> Result<Config, ConfigError> {
    dotenvy::dotenv().ok();
    let mut config = Config::from_env()?;
    if let Some(port) = overrides.server_port {
        config.server_port = Some(port);
    }
    if let Some(dir) = overrides.staging_dir {
        config.staging_dir = dir;
    }
    Ok(config)
}
