//! Provider traits and implementations for the pipeline's external
//! collaborators: embeddings, vector storage, and chat completion.

pub mod embedding;
pub mod ollama;
pub mod vector_store;

pub use embedding::EmbeddingProvider;
pub use ollama::OllamaClient;
pub use vector_store::{VectorEntry, VectorHit, VectorStoreProvider};
