//! Locally-served model backend (Ollama daemon)

use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::OllamaConfig;
use crate::errors::Result;
use crate::RagServeError;

/// Client for a local Ollama daemon
pub struct OllamaClient {
    base_url: String,
    model: String,
    num_predict: usize,
    client: Client,
}

impl OllamaClient {
    /// Create a client from configuration
    pub fn from_config(config: &OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .map_err(|e| RagServeError::Http(e.to_string()))?;

        Ok(Self {
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            num_predict: config.num_predict,
            client,
        })
    }

    /// Get the configured model name
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate a completion for a flat prompt.
    ///
    /// Temperature 0 keeps retrieval-grounded answers deterministic.
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        #[derive(Serialize)]
        struct GenerateRequest<'a> {
            model: &'a str,
            prompt: &'a str,
            stream: bool,
            options: GenerateOptions,
        }

        #[derive(Serialize)]
        struct GenerateOptions {
            temperature: f32,
            num_predict: usize,
        }

        #[derive(Deserialize)]
        struct GenerateResponse {
            response: String,
        }

        let url = format!("{}/api/generate", self.base_url);
        debug!("Calling Ollama generate API: {}", url);

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: 0.0,
                num_predict: self.num_predict,
            },
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                RagServeError::Llm(format!(
                    "Failed to reach Ollama at {}. Make sure Ollama is running \
                     and the model is pulled (ollama pull {}). Error: {e}",
                    self.base_url, self.model
                ))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagServeError::Llm(format!(
                "Ollama API error ({status}): {error_text}"
            )));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| RagServeError::Llm(format!("Failed to parse response: {e}")))?;

        Ok(result.response)
    }
}
