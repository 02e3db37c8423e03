//! Query-time retrieval of nearest chunks

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, VectorStoreProvider};
use crate::types::Hit;

/// Embeds a question and fetches its nearest chunks from the store.
///
/// Hits come back in the store's ranked order, untouched: no re-ranking
/// happens here. The question must be embedded by the same provider used
/// at indexing time; mixing embedding spaces breaks retrieval silently.
pub struct Retriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
    ) -> Self {
        Self { embedder, store }
    }

    /// Top-`top_k` nearest chunks for `question`, ascending by distance.
    /// A reachable but empty store yields an empty vec, not an error.
    pub async fn retrieve(&self, question: &str, top_k: usize) -> Result<Vec<Hit>> {
        let query_embedding = self.embedder.embed(question).await?;

        let hits = self
            .store
            .query(&query_embedding, top_k)
            .await
            .map_err(|e| match e {
                Error::Retrieval(_) | Error::Config(_) => e,
                other => Error::Retrieval(other.to_string()),
            })?;

        tracing::debug!(top_k, returned = hits.len(), "retrieved chunks");

        Ok(hits
            .into_iter()
            .map(|h| Hit {
                id: h.id,
                text: h.text,
                metadata: h.metadata,
                distance: h.distance,
            })
            .collect())
    }
}
