/// Retrieval and document management handlers
use axum::extract::State;
use axum::Json;
use tracing::info;

use super::AppState;
use crate::api::types::BatchAddedResponse;
use crate::api::types::DocumentAddedResponse;
use crate::api::types::DocumentListRequest;
use crate::api::types::DocumentRequest;
use crate::api::types::DocumentResult;
use crate::api::types::QueryRequest;
use crate::api::types::SearchResponse;
use crate::api::ApiResult;

fn empty_metadata() -> serde_json::Value {
    serde_json::json!({})
}

/// Retrieve similar documents (search only, no generation)
pub async fn retrieve(
    State(state): State<AppState>,
    Json(req): Json<QueryRequest>,
) -> ApiResult<Json<SearchResponse>> {
    info!("POST /retrieve: k={} question={}", req.k, req.question);
    let database = state.store()?;

    let query_embedding = state.embedding_service.generate(&req.question).await?;
    let results = database
        .similarity_search(&state.collection, query_embedding, req.k as i64)
        .await?;

    let results: Vec<DocumentResult> = results.into_iter().map(Into::into).collect();
    let count = results.len();

    Ok(Json(SearchResponse {
        question: req.question,
        k: req.k,
        results,
        count,
    }))
}

/// Add a single document to the vector store
pub async fn add_document(
    State(state): State<AppState>,
    Json(req): Json<DocumentRequest>,
) -> ApiResult<Json<DocumentAddedResponse>> {
    info!("POST /documents: {} chars", req.content.len());
    let database = state.store()?;

    let metadata = req.metadata.clone().unwrap_or_else(empty_metadata);
    let embedding = state.embedding_service.generate(&req.content).await?;
    database
        .insert_document(&state.collection, &req.content, &metadata, embedding)
        .await?;

    Ok(Json(DocumentAddedResponse {
        message: "Document added successfully".to_string(),
        content: req.content,
        metadata: req.metadata,
    }))
}

/// Add multiple documents to the vector store.
///
/// Embeddings are generated in one batched pass; the insert runs in a
/// single transaction, so the batch lands or fails as a whole.
pub async fn add_documents(
    State(state): State<AppState>,
    Json(req): Json<DocumentListRequest>,
) -> ApiResult<Json<BatchAddedResponse>> {
    info!("POST /documents/batch: {} documents", req.documents.len());
    let database = state.store()?;

    let contents: Vec<String> = req.documents.iter().map(|d| d.content.clone()).collect();
    let embeddings = state.embedding_service.generate_batch(&contents).await?;

    let rows: Vec<(String, serde_json::Value, Vec<f32>)> = req
        .documents
        .into_iter()
        .zip(embeddings)
        .map(|(doc, embedding)| {
            (
                doc.content,
                doc.metadata.unwrap_or_else(empty_metadata),
                embedding,
            )
        })
        .collect();

    let count = database.insert_documents(&state.collection, rows).await?;

    Ok(Json(BatchAddedResponse {
        message: format!("{count} documents added successfully"),
        count,
    }))
}
