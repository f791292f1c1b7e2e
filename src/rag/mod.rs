//! RAG (Retrieval-Augmented Generation) module
//!
//! End-to-end flow for grounded answers:
//! - embed the question and retrieve the nearest documents from pgvector
//! - assemble retrieved content into a bounded context block
//! - generate the answer with the configured chat backend

pub mod context;
pub mod pipeline;
pub mod retriever;

pub use context::ContextAssembler;
pub use pipeline::RagOutcome;
pub use pipeline::RagService;
pub use retriever::Retriever;
