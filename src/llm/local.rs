//! Local quantized model backend
//!
//! The model is a quantized GGUF file on local disk, optionally paired with
//! a LoRA adapter directory, served through an OpenAI-compatible runtime
//! (llama.cpp-style) on the same host. Loading a handle validates the files
//! fail-fast so a wrong path produces a clear error instead of an opaque
//! runtime failure, then checks the runtime is reachable. Handles are
//! cached; see [`super::cache`].

use std::path::Path;
use std::sync::Arc;

use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::cache::ModelCache;
use super::cache::ModelKey;
use super::cache::DEFAULT_MODEL_CACHE_SIZE;
use crate::config::LocalModelConfig;
use crate::errors::Result;
use crate::RagServeError;

/// GGUF file magic, "GGUF" read as a little-endian u32
pub const GGUF_MAGIC: u32 = 0x4655_4747;

/// Generation hyperparameters for the local runtime
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub max_new_tokens: usize,
    pub temperature: f32,
    pub top_p: f32,
    pub repetition_penalty: f32,
}

impl From<&LocalModelConfig> for GenerationParams {
    fn from(config: &LocalModelConfig) -> Self {
        Self {
            max_new_tokens: config.max_new_tokens,
            temperature: config.temperature,
            top_p: config.top_p,
            repetition_penalty: config.repetition_penalty,
        }
    }
}

/// A loaded local model handle
pub struct LocalModel {
    model_name: String,
    runtime_endpoint: String,
    client: Client,
}

impl LocalModel {
    /// Validate the model files and connect to the local runtime.
    pub async fn load(config: &LocalModelConfig) -> Result<Self> {
        let model_path = config.model_path.as_deref().ok_or_else(|| {
            RagServeError::Config(
                "Local model path is not set. Set LOCAL_MODEL_PATH or llm.local.model_path."
                    .to_string(),
            )
        })?;

        validate_model_file(Path::new(model_path))?;
        if let Some(adapter_path) = config.adapter_path.as_deref() {
            validate_adapter_dir(Path::new(adapter_path))?;
        }

        let model_name = Path::new(model_path)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("local")
            .to_string();

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(300))
            .build()
            .map_err(|e| RagServeError::Http(e.to_string()))?;

        let handle = Self {
            model_name,
            runtime_endpoint: config.runtime_endpoint.clone(),
            client,
        };
        handle.check_runtime().await?;

        info!(
            "Local model ready: {} (adapter: {}, device: {})",
            model_path,
            config.adapter_path.as_deref().unwrap_or("none"),
            config.device
        );
        Ok(handle)
    }

    /// Get the model name (GGUF file stem)
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Confirm the inference runtime answers its health endpoint.
    async fn check_runtime(&self) -> Result<()> {
        let url = format!("{}/health", self.runtime_endpoint);
        let response = self.client.get(&url).send().await.map_err(|e| {
            RagServeError::Llm(format!(
                "Failed to reach local inference runtime at {}. \
                 Make sure the runtime is serving the model. Error: {e}",
                self.runtime_endpoint
            ))
        })?;

        if !response.status().is_success() {
            return Err(RagServeError::Llm(format!(
                "Local inference runtime at {} is unhealthy ({})",
                self.runtime_endpoint,
                response.status()
            )));
        }
        Ok(())
    }

    /// Generate a completion for a flat prompt.
    pub async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        #[derive(Serialize)]
        struct CompletionRequest<'a> {
            model: &'a str,
            prompt: &'a str,
            max_tokens: usize,
            temperature: f32,
            top_p: f32,
            // llama.cpp-style extension; OpenAI-compatible runtimes that
            // don't know it ignore unknown fields
            repeat_penalty: f32,
            stream: bool,
        }

        #[derive(Deserialize)]
        struct CompletionResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            text: String,
        }

        let url = format!("{}/v1/completions", self.runtime_endpoint);
        debug!("Calling local runtime: {}", url);

        let request = CompletionRequest {
            model: &self.model_name,
            prompt,
            max_tokens: params.max_new_tokens,
            // The runtime rejects exactly-zero temperature; nudge like a
            // do_sample=false path would
            temperature: params.temperature.max(1e-6),
            top_p: params.top_p,
            repeat_penalty: params.repetition_penalty,
            stream: false,
        };

        let response = self
            .client
            .post(&url)
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
                "Local runtime error ({status}): {error_text}"
            )));
        }

        let result: CompletionResponse = response
            .json()
            .await
            .map_err(|e| RagServeError::Llm(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .map(|c| c.text)
            .ok_or_else(|| RagServeError::Llm("No completion in response".to_string()))
    }
}

/// The model file must exist and carry the GGUF magic.
fn validate_model_file(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(RagServeError::ModelNotFound(path.display().to_string()));
    }

    let mut magic = [0u8; 4];
    {
        use std::io::Read;
        let mut file = std::fs::File::open(path)?;
        file.read_exact(&mut magic).map_err(|_| {
            RagServeError::Llm(format!(
                "{} is too short to be a GGUF model file",
                path.display()
            ))
        })?;
    }

    if u32::from_le_bytes(magic) != GGUF_MAGIC {
        return Err(RagServeError::Llm(format!(
            "{} is not a GGUF model file (bad magic)",
            path.display()
        )));
    }
    Ok(())
}

/// An adapter directory needs adapter_config.json plus weights in either
/// safetensors or bin form.
fn validate_adapter_dir(path: &Path) -> Result<()> {
    if !path.is_dir() {
        return Err(RagServeError::AdapterNotFound(format!(
            "adapter directory does not exist: {}",
            path.display()
        )));
    }
    if !path.join("adapter_config.json").exists() {
        return Err(RagServeError::AdapterNotFound(format!(
            "adapter_config.json is missing in {}",
            path.display()
        )));
    }
    if !path.join("adapter_model.safetensors").exists()
        && !path.join("adapter_model.bin").exists()
    {
        return Err(RagServeError::AdapterNotFound(format!(
            "adapter_model.safetensors or adapter_model.bin is missing in {}",
            path.display()
        )));
    }
    Ok(())
}

/// The local backend: config plus the bounded handle cache
pub struct LocalBackend {
    config: LocalModelConfig,
    cache: ModelCache<LocalModel>,
}

impl LocalBackend {
    /// Create the backend. Model loading is deferred to the first request
    /// (or the startup warmup), so a missing path fails that request with a
    /// clear message instead of failing boot.
    pub fn new(config: LocalModelConfig) -> Result<Self> {
        Ok(Self {
            config,
            cache: ModelCache::new(DEFAULT_MODEL_CACHE_SIZE),
        })
    }

    fn key(&self) -> Result<ModelKey> {
        let model_path = self.config.model_path.clone().ok_or_else(|| {
            RagServeError::Config(
                "Local model path is not set. Set LOCAL_MODEL_PATH or llm.local.model_path."
                    .to_string(),
            )
        })?;
        Ok(ModelKey {
            model_path,
            adapter_path: self.config.adapter_path.clone(),
            device: self.config.device.clone(),
        })
    }

    /// Cached handle for the configured model
    pub async fn model(&self) -> Result<Arc<LocalModel>> {
        let key = self.key()?;
        self.cache
            .get_or_load(&key, || LocalModel::load(&self.config))
            .await
    }

    /// Generate a completion using the cached handle
    pub async fn generate(&self, prompt: &str) -> Result<String> {
        let model = self.model().await?;
        let params = GenerationParams::from(&self.config);
        model.generate(prompt, &params).await
    }

    /// Model name for diagnostics, without forcing a load
    #[must_use]
    pub fn model_name(&self) -> String {
        self.config
            .model_path
            .as_deref()
            .and_then(|p| Path::new(p).file_stem())
            .and_then(|s| s.to_str())
            .unwrap_or("local")
            .to_string()
    }

    /// Populate the cache at startup when configured. Never fails the
    /// server; problems surface on the first request instead.
    pub async fn warmup(&self) {
        if !self.config.warmup {
            debug!("Local model warmup skipped: disabled");
            return;
        }
        if self.config.model_path.is_none() {
            warn!("Local model warmup skipped: model path not set");
            return;
        }

        info!("Warming up local model cache");
        match self.model().await {
            Ok(model) => info!("Warmup complete: {}", model.model_name()),
            Err(e) => warn!("Warmup failed: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_missing_model_file() {
        let err = validate_model_file(Path::new("/nonexistent/model.gguf")).unwrap_err();
        assert!(matches!(err, RagServeError::ModelNotFound(_)));
    }

    #[test]
    fn test_bad_magic_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.gguf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"not a gguf at all")
            .unwrap();

        let err = validate_model_file(&path).unwrap_err();
        assert!(err.to_string().contains("not a GGUF model file"));
    }

    #[test]
    fn test_gguf_magic_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.gguf");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&GGUF_MAGIC.to_le_bytes()).unwrap();
        file.write_all(&3u32.to_le_bytes()).unwrap(); // version field

        assert!(validate_model_file(&path).is_ok());
    }

    #[test]
    fn test_adapter_dir_validation() {
        let dir = tempfile::tempdir().unwrap();

        let missing = dir.path().join("gone");
        let err = validate_adapter_dir(&missing).unwrap_err();
        assert!(err.to_string().contains("does not exist"));

        // Directory without adapter_config.json
        let adapter = dir.path().join("adapter");
        std::fs::create_dir(&adapter).unwrap();
        let err = validate_adapter_dir(&adapter).unwrap_err();
        assert!(err.to_string().contains("adapter_config.json"));

        // Config present, weights missing
        std::fs::write(adapter.join("adapter_config.json"), "{}").unwrap();
        let err = validate_adapter_dir(&adapter).unwrap_err();
        assert!(err.to_string().contains("adapter_model"));

        // Weights in safetensors form complete the layout
        std::fs::write(adapter.join("adapter_model.safetensors"), b"stub").unwrap();
        assert!(validate_adapter_dir(&adapter).is_ok());
    }
}
