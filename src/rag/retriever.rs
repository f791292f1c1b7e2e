//! Document retrieval: question embedding plus vector search

use std::sync::Arc;

use tracing::debug;

use crate::database::Database;
use crate::database::DocumentMatch;
use crate::embeddings::EmbeddingService;
use crate::errors::Result;

/// Retriever over one document collection
pub struct Retriever {
    database: Arc<Database>,
    embedding_service: Arc<EmbeddingService>,
    collection: String,
}

impl Retriever {
    /// Create a new retriever
    pub fn new(
        database: Arc<Database>,
        embedding_service: Arc<EmbeddingService>,
        collection: impl Into<String>,
    ) -> Self {
        Self {
            database,
            embedding_service,
            collection: collection.into(),
        }
    }

    /// Nearest documents to the question, by embedding similarity
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<DocumentMatch>> {
        debug!("Retrieving top {} documents for: {}", k, question);

        let query_embedding = self.embedding_service.generate(question).await?;
        self.database
            .similarity_search(&self.collection, query_embedding, k as i64)
            .await
    }

    /// The collection this retriever searches
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }
}
