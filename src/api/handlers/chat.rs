/// General chat handler (non-RAG)
use axum::extract::State;
use axum::Json;
use tracing::info;

use super::AppState;
use crate::api::types::ChatRequest;
use crate::api::types::ChatResponse;
use crate::api::ApiResult;
use crate::llm::prompts;

/// General chat that does not touch the vector store.
///
/// The configured backend decides the conversation format: the hosted API
/// receives the messages array, local backends a flat prompt. Both paths
/// start from the same system prompt and trimmed history.
pub async fn chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> ApiResult<Json<ChatResponse>> {
    let history = req.conversation_history.unwrap_or_default();
    info!(
        "POST /chat: backend={} message_len={} history_len={}",
        state.llm_provider,
        req.message.len(),
        history.len()
    );

    let llm_service = state.llm()?;
    let messages = prompts::build_messages(prompts::CHAT_SYSTEM_PROMPT, &history, &req.message);
    let answer = llm_service.chat(&messages).await?;

    Ok(Json(ChatResponse {
        message: req.message,
        answer,
    }))
}
