//! API request and response types

use serde::Deserialize;
use serde::Serialize;

use crate::database::DocumentMatch;
use crate::llm::ChatMessage;

/// Retrieval query request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryRequest {
    pub question: String,
    #[serde(default = "default_k")]
    pub k: usize,
    #[serde(default)]
    pub conversation_history: Option<Vec<ChatMessage>>,
}

fn default_k() -> usize {
    3
}

/// Single document add request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentRequest {
    pub content: String,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

/// Multiple documents add request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentListRequest {
    pub documents: Vec<DocumentRequest>,
}

/// One retrieved document on the wire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentResult {
    pub content: String,
    pub metadata: serde_json::Value,
    pub similarity: f32,
}

impl From<DocumentMatch> for DocumentResult {
    fn from(m: DocumentMatch) -> Self {
        Self {
            content: m.content,
            metadata: m.metadata,
            similarity: m.similarity,
        }
    }
}

/// Retrieval response
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResponse {
    pub question: String,
    pub k: usize,
    pub results: Vec<DocumentResult>,
    pub count: usize,
}

/// Single document add response
#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentAddedResponse {
    pub message: String,
    pub content: String,
    pub metadata: Option<serde_json::Value>,
}

/// Batch add response
#[derive(Debug, Serialize, Deserialize)]
pub struct BatchAddedResponse {
    pub message: String,
    pub count: usize,
}

/// Chat request (non-RAG)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_history: Option<Vec<ChatMessage>>,
}

/// Chat response (non-RAG)
#[derive(Debug, Serialize, Deserialize)]
pub struct ChatResponse {
    pub message: String,
    pub answer: String,
}

/// RAG response
#[derive(Debug, Serialize, Deserialize)]
pub struct RagResponse {
    pub question: String,
    pub answer: String,
    pub retrieved_documents: Vec<DocumentResult>,
    pub retrieved_count: usize,
}

/// Health check response with store/LLM diagnostics
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub store: StoreDiagnostics,
    pub llm: LlmDiagnostics,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StoreDiagnostics {
    pub initialized: bool,
    pub collection: String,
    /// Document count; None when the store is down or uninitialized
    pub documents: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LlmDiagnostics {
    pub initialized: bool,
    pub provider: String,
    /// Model identifier; None when the backend failed to initialize
    pub model: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_request_defaults() {
        let req: QueryRequest = serde_json::from_str(r#"{"question": "best thriller?"}"#).unwrap();
        assert_eq!(req.k, 3);
        assert!(req.conversation_history.is_none());
    }

    #[test]
    fn test_query_request_with_history() {
        let req: QueryRequest = serde_json::from_str(
            r#"{
                "question": "and the sequel?",
                "k": 5,
                "conversation_history": [
                    {"role": "user", "content": "best thriller?"},
                    {"role": "assistant", "content": "Try Memories of Murder."}
                ]
            }"#,
        )
        .unwrap();
        assert_eq!(req.k, 5);
        assert_eq!(req.conversation_history.unwrap().len(), 2);
    }

    #[test]
    fn test_document_request_optional_metadata() {
        let req: DocumentRequest = serde_json::from_str(r#"{"content": "plain text"}"#).unwrap();
        assert!(req.metadata.is_none());

        let req: DocumentRequest = serde_json::from_str(
            r#"{"content": "review", "metadata": {"movie_id": "m-1", "rating": 9}}"#,
        )
        .unwrap();
        assert_eq!(req.metadata.unwrap()["movie_id"], "m-1");
    }

    #[test]
    fn test_batch_request_shape() {
        let req: DocumentListRequest = serde_json::from_str(
            r#"{"documents": [{"content": "a"}, {"content": "b", "metadata": {}}]}"#,
        )
        .unwrap();
        assert_eq!(req.documents.len(), 2);
    }
}
