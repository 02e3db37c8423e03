//! Document ingestion: parsing, chunking, and indexing

pub mod chunker;
pub mod parser;

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, VectorEntry, VectorStoreProvider};
use crate::types::{Chunk, Document};

pub use chunker::{normalize_whitespace, Chunker};
pub use parser::extract_text;

/// Indexes one document at a time: chunk, embed, and write to the vector
/// store as a single batch.
pub struct Indexer {
    chunker: Chunker,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
}

impl Indexer {
    pub fn new(
        chunker: Chunker,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
    ) -> Self {
        Self {
            chunker,
            embedder,
            store,
        }
    }

    /// Index a document record
    pub async fn index(&self, doc: &Document) -> Result<usize> {
        self.index_document(&doc.doc_id, &doc.source_name, &doc.text)
            .await
    }

    /// Index a document's text under `doc_id` and return the number of
    /// chunks written.
    ///
    /// Chunk ids are `"{doc_id}-{n}"` for n in `0..count`; re-indexing
    /// the same id overwrites those entries. Known limitation: when
    /// changed text yields fewer chunks than before, the surplus old
    /// chunks remain in the store under their higher indices.
    pub async fn index_document(
        &self,
        doc_id: &str,
        source_name: &str,
        text: &str,
    ) -> Result<usize> {
        let chunks = self.chunker.split(text);
        if chunks.is_empty() {
            return Err(Error::EmptyInput(format!(
                "document {} has no extractable text",
                doc_id
            )));
        }

        let embeddings = self.embedder.embed_batch(&chunks).await?;
        let dimensions = self.store.dimensions();

        let mut entries = Vec::with_capacity(chunks.len());
        for (n, (content, vector)) in chunks.into_iter().zip(embeddings).enumerate() {
            if vector.len() != dimensions {
                return Err(Error::Embedding(format!(
                    "embedder returned a {}-dimensional vector for chunk {} of {}, expected {}",
                    vector.len(),
                    n,
                    doc_id,
                    dimensions
                )));
            }
            let chunk = Chunk::new(doc_id, source_name, content, n as u32);
            entries.push(VectorEntry {
                id: chunk.id,
                vector,
                text: chunk.content,
                metadata: chunk.metadata,
            });
        }

        let count = entries.len();
        self.store.upsert(&entries).await?;

        tracing::info!(doc_id, source_name, chunks = count, "indexed document");
        Ok(count)
    }
}
