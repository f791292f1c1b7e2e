//! HTTP server implementation

use std::sync::Arc;

use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::database::Database;
use crate::embeddings::EmbeddingService;
use crate::llm::LlmService;
use crate::Result;

/// Start the API server
pub async fn serve_api(
    config: &AppConfig,
    host: String,
    port: u16,
    enable_cors: bool,
) -> Result<()> {
    info!("🚀 Starting ragserve API server...");

    // Initialize services. A broken store or chat backend must not take
    // the rest of the API down with it: keep serving and report the
    // uninitialized service per request.
    let embedding_service = Arc::new(EmbeddingService::new(config)?);

    let llm_service = match LlmService::from_config(config) {
        Ok(service) => {
            let service = Arc::new(service);
            service.warmup().await;
            Some(service)
        }
        Err(e) => {
            error!("LLM initialization failed: {} - /chat and /rag will report it", e);
            None
        }
    };

    let database = match init_store(config).await {
        Ok(db) => Some(Arc::new(db)),
        Err(e) => {
            error!("Vector store initialization failed: {} - continuing without store", e);
            None
        }
    };

    let state = AppState {
        database,
        embedding_service,
        llm_service,
        llm_provider: config.llm_provider(),
        collection: config.collection_name().to_string(),
    };

    let mut app = routes::api_routes(state)
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    if enable_cors {
        info!("✅ CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    // Start server
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 API server listening on http://{}", addr);
    info!("🧠 Chat backend: {}", config.llm_provider());
    info!("📚 Collection: {}", config.collection_name());
    info!("");
    info!("Available endpoints:");
    info!("  GET  /health          - Health check");
    info!("  POST /retrieve        - Similarity search");
    info!("  POST /documents       - Add a document");
    info!("  POST /documents/batch - Add documents (atomic batch)");
    info!("  POST /chat            - General chat");
    info!("  POST /rag             - Retrieval-augmented chat");

    axum::serve(listener, app).await?;

    Ok(())
}

async fn init_store(config: &AppConfig) -> Result<Database> {
    let database = Database::from_config(config).await?;
    database.init_schema(config).await?;
    Ok(database)
}
