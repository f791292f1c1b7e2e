//! Embeddings generation module
//!
//! Query and document embeddings come from an external provider:
//! - OpenAI (text-embedding-3-small, text-embedding-ada-002, ...)
//! - Ollama (local models such as nomic-embed-text)

pub mod client;
pub mod service;

pub use client::EmbeddingClient;
pub use client::EmbeddingProvider;
pub use service::EmbeddingService;

use crate::errors::Result;
use crate::RagServeError;

/// Maximum batch size for one embedding API call
pub const MAX_BATCH_SIZE: usize = 100;

/// Configuration for embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: usize,
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl EmbeddingConfig {
    pub fn from_app_config(config: &crate::config::AppConfig) -> Result<Self> {
        let provider = match config.embeddings.provider.as_str() {
            "openai" => EmbeddingProvider::OpenAI,
            "ollama" => EmbeddingProvider::Ollama,
            other => {
                return Err(RagServeError::Config(format!(
                    "Unknown embeddings provider: {other} (expected openai or ollama)"
                )))
            }
        };

        Ok(Self {
            provider,
            model: config.embedding_model().to_string(),
            dimension: config.embedding_dimension(),
            endpoint: config.embeddings.endpoint.clone(),
            api_key: config.embeddings.api_key.clone(),
        })
    }
}

/// Normalize text before embedding: collapse newlines into spaces and trim.
///
/// Embedding APIs handle newlines inconsistently across providers, and an
/// all-whitespace input is always a caller bug.
pub fn preprocess_text(text: &str) -> Result<String> {
    let processed = text.replace(['\n', '\r'], " ").trim().to_string();
    if processed.is_empty() {
        return Err(RagServeError::Embedding(
            "Cannot embed empty text".to_string(),
        ));
    }
    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preprocess_collapses_newlines() {
        let out = preprocess_text("movie review:\r\ngreat film\n").unwrap();
        assert_eq!(out, "movie review:  great film");
    }

    #[test]
    fn test_preprocess_rejects_empty() {
        assert!(preprocess_text("  \n ").is_err());
    }
}
