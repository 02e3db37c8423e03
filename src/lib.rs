//! docuchat: a RAG backend for document Q&A
//!
//! Uploads are parsed to text, chunked along sentence-like boundaries,
//! embedded, and written to a durable vector store. Queries embed the
//! question, retrieve the nearest chunks, assemble a bounded context
//! block, and hand context plus question to a chat model.

pub mod config;
pub mod error;
pub mod generation;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod storage;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use generation::{assemble_context, compose_user_message};
pub use ingestion::{Chunker, Indexer};
pub use retrieval::Retriever;
pub use storage::SqliteVectorStore;
pub use types::{Chunk, ChunkMetadata, Document, Hit};
