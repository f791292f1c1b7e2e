//! HTTP API module
//!
//! Route surface (all JSON):
//! - POST /retrieve        - similarity search only
//! - POST /documents       - add one document
//! - POST /documents/batch - add many documents atomically
//! - POST /chat            - general chat (no retrieval)
//! - POST /rag             - retrieval-augmented chat
//! - GET  /health          - liveness + store/llm diagnostics

pub mod error;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod types;

pub use error::ApiError;
pub use error::ApiResult;
pub use handlers::AppState;
pub use server::serve_api;
