//! Interchangeable chat backends
//!
//! The service answers /chat and /rag with one of three backends, selected
//! by configuration:
//! - `openai`: hosted chat-completions API (messages format)
//! - `ollama`: locally-served model behind an Ollama daemon (flat prompt)
//! - `local`: local quantized GGUF model behind an OpenAI-compatible
//!   runtime on the same host (flat prompt, cached handles)

pub mod cache;
pub mod local;
pub mod ollama;
pub mod openai;
pub mod prompts;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::AppConfig;
use crate::config::LlmProvider;
use crate::errors::Result;

/// One conversation turn. Roles are carried as plain strings because they
/// arrive from clients; validation happens when history is trimmed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Chat backend selected at startup
pub enum LlmService {
    OpenAi(openai::OpenAiClient),
    Ollama(ollama::OllamaClient),
    Local(local::LocalBackend),
}

impl LlmService {
    /// Build the backend selected by the configuration.
    ///
    /// The local backend defers model loading to the first request (or the
    /// startup warmup) so a bad model path fails that request, not boot.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        match config.llm_provider() {
            LlmProvider::OpenAi => Ok(Self::OpenAi(openai::OpenAiClient::from_config(
                &config.llm.openai,
            )?)),
            LlmProvider::Ollama => Ok(Self::Ollama(ollama::OllamaClient::from_config(
                &config.llm.ollama,
            )?)),
            LlmProvider::Local => Ok(Self::Local(local::LocalBackend::new(
                config.llm.local.clone(),
            )?)),
        }
    }

    /// Which provider this service was built with
    #[must_use]
    pub fn provider(&self) -> LlmProvider {
        match self {
            Self::OpenAi(_) => LlmProvider::OpenAi,
            Self::Ollama(_) => LlmProvider::Ollama,
            Self::Local(_) => LlmProvider::Local,
        }
    }

    /// Model identifier, for diagnostics
    #[must_use]
    pub fn model_name(&self) -> String {
        match self {
            Self::OpenAi(client) => client.model().to_string(),
            Self::Ollama(client) => client.model().to_string(),
            Self::Local(backend) => backend.model_name(),
        }
    }

    /// Run one chat round over an already-assembled message list.
    ///
    /// The hosted API takes the messages as-is; local backends get the same
    /// turns rendered as a flat prompt, and their raw output is
    /// post-processed down to the assistant reply.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String> {
        match self {
            Self::OpenAi(client) => {
                debug!("Dispatching chat to OpenAI ({} messages)", messages.len());
                Ok(client.chat(messages).await?.trim().to_string())
            }
            Self::Ollama(client) => {
                let prompt = prompts::render_flat_prompt(messages);
                debug!("Dispatching chat to Ollama (prompt {} chars)", prompt.len());
                let output = client.generate(&prompt).await?;
                Ok(prompts::extract_assistant_reply(&output))
            }
            Self::Local(backend) => {
                let prompt = prompts::render_flat_prompt(messages);
                debug!("Dispatching chat to local model (prompt {} chars)", prompt.len());
                let output = backend.generate(&prompt).await?;
                Ok(prompts::extract_assistant_reply(&output))
            }
        }
    }

    /// Populate the local model cache at startup when configured.
    ///
    /// Warmup never fails the server; problems are logged and the first
    /// request reports them properly.
    pub async fn warmup(&self) {
        if let Self::Local(backend) = self {
            backend.warmup().await;
        }
    }
}
