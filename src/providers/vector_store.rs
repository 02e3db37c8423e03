//! Vector store provider trait for storing and searching embeddings

use async_trait::async_trait;

use crate::error::Result;
use crate::types::ChunkMetadata;

/// One entry to persist: id, embedding, text, and provenance metadata
#[derive(Debug, Clone)]
pub struct VectorEntry {
    /// Globally unique chunk id
    pub id: String,
    /// Embedding vector; length must equal the store's dimension
    pub vector: Vec<f32>,
    /// Chunk text
    pub text: String,
    /// Provenance metadata
    pub metadata: ChunkMetadata,
}

/// One nearest-neighbor match from the store
#[derive(Debug, Clone)]
pub struct VectorHit {
    /// Chunk id
    pub id: String,
    /// Chunk text
    pub text: String,
    /// Provenance metadata
    pub metadata: ChunkMetadata,
    /// Cosine distance (ascending is better)
    pub distance: f32,
}

/// Trait for durable vector storage and similarity search
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Insert or overwrite entries. Idempotent per id; a later write with
    /// the same id wins.
    async fn upsert(&self, entries: &[VectorEntry]) -> Result<()>;

    /// Nearest neighbors of `vector`, ordered by ascending distance.
    /// Returns at most `top_k` hits; an empty store yields an empty vec.
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorHit>>;

    /// Number of stored entries
    async fn len(&self) -> Result<usize>;

    /// Check if store is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Configured embedding dimension
    fn dimensions(&self) -> usize;

    /// Provider name for logging
    fn name(&self) -> &str;
}
