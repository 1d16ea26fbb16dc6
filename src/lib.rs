#![deny(missing_docs)]

//! Core library for the Rusty RAG PDF question-answering server.

/// HTTP routing and REST handlers.
pub mod api;
/// Environment-driven configuration management.
pub mod config;
/// Embedding client abstraction and adapters.
pub mod embedding;
/// Language model client abstraction and adapters.
pub mod generation;
/// Structured logging and tracing setup.
pub mod logging;
/// Ingestion and question metrics helpers.
pub mod metrics;
/// Document processing and question-answering pipeline.
pub mod processing;
