use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagServeError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP client error: {0}")]
    Http(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Model not found: {0}. Check the model path in the configuration")]
    ModelNotFound(String),

    #[error("Adapter files missing: {0}")]
    AdapterNotFound(String),

    #[error("Vector store is not initialized")]
    StoreUninitialized,

    #[error("LLM backend is not initialized. Check LLM_PROVIDER and backend credentials")]
    LlmUninitialized,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("URL parsing error: {0}")]
    UrlParsing(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, RagServeError>;
