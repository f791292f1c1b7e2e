//! Embedding service: preprocessing, batching and dimension checks

use std::sync::Arc;

use tracing::warn;

use super::client::EmbeddingClient;
use super::EmbeddingConfig;
use super::MAX_BATCH_SIZE;
use crate::errors::Result;
use crate::RagServeError;

/// Service for generating embeddings on top of a provider client
pub struct EmbeddingService {
    client: Arc<EmbeddingClient>,
    config: EmbeddingConfig,
}

impl EmbeddingService {
    /// Create a new embedding service from the application config
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        Self::from_config(EmbeddingConfig::from_app_config(config)?)
    }

    /// Create from a custom embedding config
    pub fn from_config(config: EmbeddingConfig) -> Result<Self> {
        let client = EmbeddingClient::new(
            config.provider,
            config.model.clone(),
            config.endpoint.clone(),
            config.api_key.clone(),
        )?;

        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    /// Generate an embedding for a single text
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        let processed = super::preprocess_text(text)?;
        let embedding = self.client.generate(&processed).await?;
        self.check_dimension(&embedding)?;
        Ok(embedding)
    }

    /// Generate embeddings for multiple texts, chunked to the provider's
    /// batch limit. Output order matches input order.
    pub async fn generate_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut processed = Vec::with_capacity(texts.len());
        for text in texts {
            processed.push(super::preprocess_text(text)?);
        }

        let mut embeddings = Vec::with_capacity(processed.len());
        for chunk in processed.chunks(MAX_BATCH_SIZE) {
            let refs: Vec<&str> = chunk.iter().map(String::as_str).collect();
            let mut chunk_embeddings = self.client.generate_batch(refs).await?;
            if chunk_embeddings.len() != chunk.len() {
                return Err(RagServeError::Embedding(format!(
                    "Provider returned {} embeddings for {} inputs",
                    chunk_embeddings.len(),
                    chunk.len()
                )));
            }
            embeddings.append(&mut chunk_embeddings);
        }

        for embedding in &embeddings {
            self.check_dimension(embedding)?;
        }

        Ok(embeddings)
    }

    /// Get the configured embedding dimension
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    /// Get the configured model name
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() != self.config.dimension {
            warn!(
                "Embedding dimension mismatch: got {}, configured {}",
                embedding.len(),
                self.config.dimension
            );
            return Err(RagServeError::Embedding(format!(
                "Embedding dimension mismatch: got {}, expected {} (model {})",
                embedding.len(),
                self.config.dimension,
                self.config.model
            )));
        }
        Ok(())
    }
}
