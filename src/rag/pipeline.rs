//! Complete RAG pipeline: Retrieve -> Assemble -> Generate

use std::sync::Arc;

use tracing::debug;
use tracing::info;

use crate::database::Database;
use crate::database::DocumentMatch;
use crate::embeddings::EmbeddingService;
use crate::errors::Result;
use crate::llm::prompts;
use crate::llm::ChatMessage;
use crate::llm::LlmService;
use crate::rag::ContextAssembler;
use crate::rag::Retriever;

/// Complete RAG service
pub struct RagService {
    retriever: Retriever,
    context_assembler: ContextAssembler,
    llm_service: Arc<LlmService>,
}

impl RagService {
    /// Create from existing services
    #[must_use]
    pub fn from_services(
        database: Arc<Database>,
        embedding_service: Arc<EmbeddingService>,
        llm_service: Arc<LlmService>,
        collection: impl Into<String>,
    ) -> Self {
        let retriever = Retriever::new(database, embedding_service, collection);
        let context_assembler = ContextAssembler::default();

        Self {
            retriever,
            context_assembler,
            llm_service,
        }
    }

    /// Answer a question grounded in retrieved documents.
    ///
    /// `history` carries earlier turns of the conversation; only the most
    /// recent valid turns participate (see [`prompts::trim_history`]).
    pub async fn query(
        &self,
        question: &str,
        k: usize,
        history: &[ChatMessage],
    ) -> Result<RagOutcome> {
        info!("Processing RAG query: {}", question);

        debug!("Step 1: Retrieving documents");
        let documents = self.retriever.retrieve(question, k).await?;
        debug!("Retrieved {} documents", documents.len());

        debug!("Step 2: Assembling context");
        let context = self.context_assembler.assemble(&documents);

        debug!("Step 3: Generating answer");
        let system = prompts::rag_system_prompt(&context);
        let messages = prompts::build_messages(&system, history, question);
        let answer = self.llm_service.chat(&messages).await?;

        info!("RAG query completed successfully");

        Ok(RagOutcome {
            question: question.to_string(),
            answer,
            documents,
        })
    }

    /// Retrieve without generation, for the /retrieve endpoint
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<DocumentMatch>> {
        self.retriever.retrieve(question, k).await
    }

    /// Get retriever reference
    #[must_use]
    pub const fn retriever(&self) -> &Retriever {
        &self.retriever
    }
}

/// Result of one RAG query
#[derive(Debug, Clone)]
pub struct RagOutcome {
    pub question: String,
    pub answer: String,
    pub documents: Vec<DocumentMatch>,
}
