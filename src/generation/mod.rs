//! Language model clients used to answer questions from an assembled prompt.
//!
//! Two wire formats are supported: OpenAI-compatible chat completions (Groq, OpenAI) and the
//! Ollama generate endpoint. Each call is a single request; failures are returned to the caller
//! unchanged and never retried.

use crate::config::{Config, GenerationProvider};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use thiserror::Error;

const DEFAULT_GROQ_URL: &str = "https://api.groq.com/openai/v1";
const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Errors surfaced while requesting a completion.
#[derive(Debug, Error)]
pub enum GenerationClientError {
    /// Provider could not be constructed or reached.
    #[error("Generation provider unavailable: {0}")]
    ProviderUnavailable(String),
    /// Provider returned an error response.
    #[error("Failed to generate answer: {0}")]
    GenerationFailed(String),
    /// Provider response could not be parsed.
    #[error("Malformed provider response: {0}")]
    InvalidResponse(String),
}

/// Interface implemented by language model providers.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Complete `prompt` and return the model's answer text.
    async fn complete(&self, prompt: String) -> Result<String, GenerationClientError>;
}

/// Build the generation client selected by configuration.
pub fn get_generation_client(
    config: &Config,
) -> Result<Arc<dyn GenerationClient>, GenerationClientError> {
    let model = config.generation_model.clone();
    let configured = config.generation_base_url.as_deref();

    let client: Arc<dyn GenerationClient> = match config.generation_provider {
        GenerationProvider::Groq | GenerationProvider::OpenAI => {
            let fallback = if config.generation_provider == GenerationProvider::Groq {
                DEFAULT_GROQ_URL
            } else {
                DEFAULT_OPENAI_URL
            };
            Arc::new(ChatCompletionsClient::new(
                configured.unwrap_or(fallback).to_string(),
                config.generation_api_key.clone().unwrap_or_default(),
                model,
            )?)
        }
        GenerationProvider::Ollama => {
            let base_url = configured
                .or(config.ollama_url.as_deref())
                .unwrap_or(DEFAULT_OLLAMA_URL)
                .to_string();
            Arc::new(OllamaGenerationClient::new(base_url, model)?)
        }
    };

    tracing::info!(
        provider = ?config.generation_provider,
        model = %config.generation_model,
        "Generation client initialized"
    );
    Ok(client)
}

fn build_http_client() -> Result<Client, GenerationClientError> {
    Client::builder()
        .user_agent("rusty-rag/generation")
        .build()
        .map_err(|error| GenerationClientError::ProviderUnavailable(error.to_string()))
}

/// OpenAI-compatible `/chat/completions` client (Groq, OpenAI, and compatible gateways).
pub struct ChatCompletionsClient {
    http: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatCompletionsClient {
    /// Build a client targeting `base_url`, for example `https://api.groq.com/openai/v1`.
    pub fn new(
        base_url: String,
        api_key: String,
        model: String,
    ) -> Result<Self, GenerationClientError> {
        Ok(Self {
            http: build_http_client()?,
            base_url,
            api_key,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl GenerationClient for ChatCompletionsClient {
    async fn complete(&self, prompt: String) -> Result<String, GenerationClientError> {
        let payload = json!({
            "model": self.model,
            "messages": [{ "role": "user", "content": prompt }],
            "temperature": 0.0,
            "stream": false,
        });

        let response = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                GenerationClientError::ProviderUnavailable(format!(
                    "failed to reach {}: {error}",
                    self.base_url
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationClientError::GenerationFailed(format!(
                "chat completions returned {status}: {body}"
            )));
        }

        let body: ChatCompletionResponse = response.json().await.map_err(|error| {
            GenerationClientError::InvalidResponse(format!(
                "failed to decode chat completion: {error}"
            ))
        })?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| {
                GenerationClientError::InvalidResponse("completion contained no choices".into())
            })
    }
}

/// Ollama `/api/generate` client.
pub struct OllamaGenerationClient {
    http: Client,
    base_url: String,
    model: String,
}

impl OllamaGenerationClient {
    /// Build a client for a local Ollama runtime.
    pub fn new(base_url: String, model: String) -> Result<Self, GenerationClientError> {
        Ok(Self {
            http: build_http_client()?,
            base_url,
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
    done: bool,
}

#[async_trait]
impl GenerationClient for OllamaGenerationClient {
    async fn complete(&self, prompt: String) -> Result<String, GenerationClientError> {
        let payload = json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
            "options": { "temperature": 0.0 }
        });

        let response = self
            .http
            .post(self.endpoint())
            .json(&payload)
            .send()
            .await
            .map_err(|error| {
                GenerationClientError::ProviderUnavailable(format!(
                    "failed to reach Ollama at {}: {error}",
                    self.base_url
                ))
            })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(GenerationClientError::ProviderUnavailable(format!(
                "Ollama endpoint {} returned 404",
                self.endpoint()
            )));
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationClientError::GenerationFailed(format!(
                "Ollama returned {status}: {body}"
            )));
        }

        let body: OllamaResponse = response.json().await.map_err(|error| {
            GenerationClientError::InvalidResponse(format!(
                "failed to decode Ollama response: {error}"
            ))
        })?;

        if !body.done {
            return Err(GenerationClientError::InvalidResponse(
                "Ollama response incomplete (streaming not supported)".into(),
            ));
        }

        Ok(body.response.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::{Method::POST, MockServer};

    #[tokio::test]
    async fn chat_client_returns_first_choice() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("authorization", "Bearer gsk-test")
                    .json_body_partial(r#"{ "model": "llama3-8b-8192" }"#);
                then.status(200).json_body(json!({
                    "choices": [
                        { "message": { "role": "assistant", "content": "  Paris.  " } }
                    ]
                }));
            })
            .await;

        let client = ChatCompletionsClient::new(
            server.base_url(),
            "gsk-test".into(),
            "llama3-8b-8192".into(),
        )
        .expect("client");
        let answer = client
            .complete("What is the capital?".into())
            .await
            .expect("answer");

        mock.assert_async().await;
        assert_eq!(answer, "Paris.");
    }

    #[tokio::test]
    async fn chat_client_reports_error_status() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(503).body("overloaded");
            })
            .await;

        let client = ChatCompletionsClient::new(server.base_url(), "k".into(), "m".into())
            .expect("client");
        let error = client.complete("q".into()).await.expect_err("error");

        assert!(
            matches!(error, GenerationClientError::GenerationFailed(ref message) if message.contains("503"))
        );
    }

    #[tokio::test]
    async fn chat_client_rejects_empty_choices() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).json_body(json!({ "choices": [] }));
            })
            .await;

        let client = ChatCompletionsClient::new(server.base_url(), "k".into(), "m".into())
            .expect("client");
        let error = client.complete("q".into()).await.expect_err("error");

        assert!(matches!(error, GenerationClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn ollama_client_handles_successful_response() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(200).json_body(json!({
                    "response": "Answer text",
                    "done": true
                }));
            })
            .await;

        let client =
            OllamaGenerationClient::new(server.base_url(), "llama3".into()).expect("client");
        let answer = client.complete("Prompt".into()).await.expect("answer");

        mock.assert_async().await;
        assert_eq!(answer, "Answer text");
    }

    #[tokio::test]
    async fn ollama_client_maps_missing_endpoint() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/generate");
                then.status(404);
            })
            .await;

        let client =
            OllamaGenerationClient::new(server.base_url(), "llama3".into()).expect("client");
        let error = client.complete("Prompt".into()).await.expect_err("404");

        assert!(matches!(
            error,
            GenerationClientError::ProviderUnavailable(_)
        ));
    }
}
