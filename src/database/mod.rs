use sqlx::PgPool;

use crate::Result;

mod documents;
pub mod url;

pub use documents::DocumentMatch;
pub use documents::DocumentRow;

/// Database connection pool wrapper
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a new database instance from configuration.
    ///
    /// The configured URL goes through the managed-provider normalization
    /// chain before the pool is created, so Neon-style connection strings
    /// (`sslmode=`, `channel_binding=`) work as-is.
    pub async fn from_config(config: &crate::config::AppConfig) -> Result<Self> {
        let connect_url = url::connect_url(config.database_url())?;

        let pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections())
            .min_connections(config.min_connections())
            .acquire_timeout(std::time::Duration::from_secs(config.connection_timeout()));

        let pool = pool_options.connect(&connect_url).await?;

        tracing::info!(
            "Database pool configured: max_connections={}, min_connections={}",
            config.max_connections(),
            config.min_connections()
        );

        Ok(Self::new(pool))
    }

    /// Create the documents table and its indexes.
    ///
    /// The embedding dimension is fixed at schema-creation time; the table
    /// layout is otherwise what pgvector needs for `<=>` search.
    pub async fn init_schema(&self, config: &crate::config::AppConfig) -> Result<()> {
        if config.store.create_extension {
            sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
                .execute(&self.pool)
                .await?;
        }

        let dimension = config.embedding_dimension();
        sqlx::query(&format!(
            r"
            CREATE TABLE IF NOT EXISTS documents (
                id UUID PRIMARY KEY,
                collection TEXT NOT NULL,
                content TEXT NOT NULL,
                metadata JSONB NOT NULL DEFAULT '{{}}'::jsonb,
                embedding vector({dimension}) NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT now()
            )
            "
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents (collection)",
        )
        .execute(&self.pool)
        .await?;

        if config.store.enable_vector_index {
            let lists = config.store.vector_index_lists;
            sqlx::query(&format!(
                r"
                CREATE INDEX IF NOT EXISTS idx_documents_embedding
                ON documents USING ivfflat (embedding vector_cosine_ops)
                WITH (lists = {lists})
                "
            ))
            .execute(&self.pool)
            .await?;
        }

        tracing::info!("Document schema initialized (dimension={})", dimension);
        Ok(())
    }

    /// Get a reference to the database pool for raw queries
    #[must_use]
    pub const fn pool(&self) -> &sqlx::PgPool {
        &self.pool
    }
}
