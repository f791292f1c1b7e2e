//! Document rows and pgvector similarity queries

use pgvector::Vector;
use uuid::Uuid;

use super::Database;
use crate::Result;

/// A stored document row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub collection: String,
    pub content: String,
    pub metadata: serde_json::Value,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A similarity-search hit: document content plus its cosine similarity
#[derive(Debug, Clone)]
pub struct DocumentMatch {
    pub content: String,
    pub metadata: serde_json::Value,
    pub similarity: f32,
}

impl Database {
    /// Insert a single document with its embedding.
    pub async fn insert_document(
        &self,
        collection: &str,
        content: &str,
        metadata: &serde_json::Value,
        embedding: Vec<f32>,
    ) -> Result<Uuid> {
        let id = Uuid::new_v4();
        sqlx::query(
            r"
            INSERT INTO documents (id, collection, content, metadata, embedding)
            VALUES ($1, $2, $3, $4, $5)
            ",
        )
        .bind(id)
        .bind(collection)
        .bind(content)
        .bind(metadata)
        .bind(Vector::from(embedding))
        .execute(self.pool())
        .await?;

        Ok(id)
    }

    /// Insert a batch of documents in one transaction.
    ///
    /// Either every document lands or none does; a failure midway rolls the
    /// whole batch back.
    pub async fn insert_documents(
        &self,
        collection: &str,
        documents: Vec<(String, serde_json::Value, Vec<f32>)>,
    ) -> Result<usize> {
        let count = documents.len();
        let mut tx = self.pool().begin().await?;

        for (content, metadata, embedding) in documents {
            sqlx::query(
                r"
                INSERT INTO documents (id, collection, content, metadata, embedding)
                VALUES ($1, $2, $3, $4, $5)
                ",
            )
            .bind(Uuid::new_v4())
            .bind(collection)
            .bind(&content)
            .bind(&metadata)
            .bind(Vector::from(embedding))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(count)
    }

    /// Nearest documents to the query embedding, by cosine distance.
    pub async fn similarity_search(
        &self,
        collection: &str,
        query_embedding: Vec<f32>,
        limit: i64,
    ) -> Result<Vec<DocumentMatch>> {
        #[derive(sqlx::FromRow)]
        struct RawResult {
            content: String,
            metadata: serde_json::Value,
            similarity: f64, // distance operator returns FLOAT8
        }

        let raw_results = sqlx::query_as::<_, RawResult>(
            r"
            SELECT
                content,
                metadata,
                1 - (embedding <=> $1) as similarity
            FROM documents
            WHERE collection = $2
            ORDER BY embedding <=> $1
            LIMIT $3
            ",
        )
        .bind(Vector::from(query_embedding))
        .bind(collection)
        .bind(limit)
        .fetch_all(self.pool())
        .await?;

        Ok(raw_results
            .into_iter()
            .map(|r| DocumentMatch {
                content: r.content,
                metadata: r.metadata,
                similarity: r.similarity as f32,
            })
            .collect())
    }

    /// Fetch one document by id.
    pub async fn get_document(&self, id: Uuid) -> Result<Option<DocumentRow>> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, collection, content, metadata, created_at
            FROM documents
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(self.pool())
        .await?;
        Ok(row)
    }

    /// Number of documents stored under a collection.
    pub async fn count_documents(&self, collection: &str) -> Result<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM documents WHERE collection = $1")
                .bind(collection)
                .fetch_one(self.pool())
                .await?;
        Ok(count)
    }
}
