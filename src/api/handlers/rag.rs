/// RAG handler
use axum::extract::State;
use axum::Json;
use tracing::info;

use super::AppState;
use crate::api::types::QueryRequest;
use crate::api::types::RagResponse;
use crate::api::ApiResult;
use crate::rag::RagService;

/// Retrieval-augmented chat: retrieve, assemble context, generate
pub async fn rag_query(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> ApiResult<Json<RagResponse>> {
    info!("POST /rag: k={} question={}", req.k, req.question);
    let database = state.store()?;
    let llm_service = state.llm()?;

    let rag_service = RagService::from_services(
        database,
        state.embedding_service.clone(),
        llm_service,
        state.collection.clone(),
    );

    let history = req.conversation_history.unwrap_or_default();
    let outcome = rag_service.query(&req.question, req.k, &history).await?;

    let retrieved_documents: Vec<_> = outcome.documents.into_iter().map(Into::into).collect();
    let retrieved_count = retrieved_documents.len();

    Ok(Json(RagResponse {
        question: outcome.question,
        answer: outcome.answer,
        retrieved_documents,
        retrieved_count,
    }))
}
