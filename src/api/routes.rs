//! API route definitions

use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Create the API router
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Retrieval
        .route("/retrieve", post(handlers::retrieve))
        // Document ingestion
        .route("/documents", post(handlers::add_document))
        .route("/documents/batch", post(handlers::add_documents))
        // Chat endpoints
        .route("/chat", post(handlers::chat))
        .route("/rag", post(handlers::rag_query))
        .with_state(state)
}
