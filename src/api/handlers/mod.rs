/// API request handlers
use std::sync::Arc;

use axum::extract::State;
use axum::Json;

use crate::api::types::HealthResponse;
use crate::api::types::LlmDiagnostics;
use crate::api::types::StoreDiagnostics;
use crate::config::LlmProvider;
use crate::database::Database;
use crate::embeddings::EmbeddingService;
use crate::llm::LlmService;

// Re-export sub-modules
pub mod chat;
pub mod rag;
pub mod search;

// Re-export handlers
pub use chat::*;
pub use rag::*;
pub use search::*;

/// Shared application state
///
/// Store and LLM are optional: a failed initialization at startup keeps
/// the rest of the API alive, and endpoints depending on the missing
/// service report it per request with a distinguished error.
#[derive(Clone)]
pub struct AppState {
    pub database: Option<Arc<Database>>,
    pub embedding_service: Arc<EmbeddingService>,
    pub llm_service: Option<Arc<LlmService>>,
    pub llm_provider: LlmProvider,
    pub collection: String,
}

impl AppState {
    /// The store, or the distinguished uninitialized-store error
    pub fn store(&self) -> crate::api::ApiResult<Arc<Database>> {
        self.database
            .clone()
            .ok_or_else(|| crate::RagServeError::StoreUninitialized.into())
    }

    /// The chat backend, or the distinguished uninitialized-LLM error
    pub fn llm(&self) -> crate::api::ApiResult<Arc<LlmService>> {
        self.llm_service
            .clone()
            .ok_or_else(|| crate::RagServeError::LlmUninitialized.into())
    }
}

/// Health check handler with store/LLM diagnostics
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let documents = match &state.database {
        Some(db) => db.count_documents(&state.collection).await.ok(),
        None => None,
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store: StoreDiagnostics {
            initialized: state.database.is_some(),
            collection: state.collection.clone(),
            documents,
        },
        llm: LlmDiagnostics {
            initialized: state.llm_service.is_some(),
            provider: state.llm_provider.to_string(),
            model: state.llm_service.as_ref().map(|s| s.model_name()),
        },
    })
}
