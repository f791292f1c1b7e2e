//! Hosted chat-completions backend

use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::ChatMessage;
use crate::config::OpenAiConfig;
use crate::errors::Result;
use crate::RagServeError;

/// Client for the OpenAI chat-completions API
pub struct OpenAiClient {
    endpoint: String,
    model: String,
    temperature: f32,
    api_key: String,
    client: Client,
}

impl OpenAiClient {
    /// Create a client from configuration.
    ///
    /// Fails fast when no API key is configured, with a message naming the
    /// environment variable to set.
    pub fn from_config(config: &OpenAiConfig) -> Result<Self> {
        let api_key = config.api_key.clone().ok_or_else(|| {
            RagServeError::Config(
                "OPENAI_API_KEY environment variable is not set. \
                 Set it or configure llm.openai.api_key."
                    .to_string(),
            )
        })?;

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .map_err(|e| RagServeError::Http(e.to_string()))?;

        Ok(Self {
            endpoint: config.endpoint.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            api_key,
            client,
        })
    }

    /// Get the configured model name
    #[must_use]
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Run a chat completion over a messages array
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: &'a [ChatMessage],
            temperature: f32,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ResponseMessage,
        }

        #[derive(Deserialize)]
        struct ResponseMessage {
            content: Option<String>,
        }

        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Calling OpenAI chat API: {} ({} messages)", url, messages.len());

        let request = ChatRequest {
            model: &self.model,
            messages,
            temperature: self.temperature,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| RagServeError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagServeError::Llm(format!(
                "OpenAI API error ({status}): {error_text}"
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| RagServeError::Llm(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| RagServeError::Llm("No completion in response".to_string()))
    }
}
