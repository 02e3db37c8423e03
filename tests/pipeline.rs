//! End-to-end pipeline tests: index, retrieve, assemble.
//!
//! Uses a deterministic in-process embedder and a real sqlite store in a
//! temp directory; no network involved.

use std::sync::Arc;

use async_trait::async_trait;
use docuchat::providers::{EmbeddingProvider, VectorStoreProvider};
use docuchat::{assemble_context, Chunker, Indexer, Result, Retriever, SqliteVectorStore};

const DIMS: usize = 16;

/// Character histogram folded into a fixed number of buckets. Identical
/// text always gives an identical vector, which is all retrieval needs.
struct HashEmbedder;

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut v = vec![0.0f32; DIMS];
        for (i, c) in text.chars().enumerate() {
            v[(c as usize + i) % DIMS] += 1.0;
        }
        Ok(v)
    }

    fn dimensions(&self) -> usize {
        DIMS
    }

    fn name(&self) -> &str {
        "hash"
    }
}

fn pipeline(
    dir: &tempfile::TempDir,
    chunk_chars: usize,
    overlap: usize,
) -> (Indexer, Retriever, Arc<dyn VectorStoreProvider>) {
    let store: Arc<dyn VectorStoreProvider> = Arc::new(
        SqliteVectorStore::open(dir.path().join("vectors.db"), DIMS).unwrap(),
    );
    let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashEmbedder);
    let indexer = Indexer::new(
        Chunker::new(chunk_chars, overlap).unwrap(),
        Arc::clone(&embedder),
        Arc::clone(&store),
    );
    let retriever = Retriever::new(embedder, Arc::clone(&store));
    (indexer, retriever, store)
}

#[tokio::test]
async fn round_trip_retrieves_the_matching_chunk_first() {
    let dir = tempfile::tempdir().unwrap();
    let (indexer, retriever, store) = pipeline(&dir, 5, 2);

    let count = indexer
        .index_document("abc12345", "letters.txt", "A. B. C.")
        .await
        .unwrap();
    assert_eq!(count, 3);
    assert_eq!(store.len().await.unwrap(), 3);

    // The query text equals the middle chunk, so its embedding is
    // identical and that chunk must rank first at distance ~0
    let hits = retriever.retrieve("B", 6).await.unwrap();
    assert!(!hits.is_empty());
    assert_eq!(hits[0].text, "B");
    assert_eq!(hits[0].id, "abc12345-1");
    assert!(hits[0].distance.abs() < 1e-6);
    assert!(hits.windows(2).all(|w| w[0].distance <= w[1].distance));
    assert!(hits.len() <= 6);
}

#[tokio::test]
async fn assembled_context_tags_hits_and_respects_budget() {
    let dir = tempfile::tempdir().unwrap();
    let (indexer, retriever, _store) = pipeline(&dir, 5, 2);

    indexer
        .index_document("doc1", "letters.txt", "A. B. C.")
        .await
        .unwrap();

    let hits = retriever.retrieve("B", 6).await.unwrap();
    let context = assemble_context(&hits, 6000);

    assert!(context.starts_with("[letters.txt#1]\nB\n"));
    assert!(context.len() <= 6000);

    // A tiny budget that cannot fit the first block yields no context
    assert_eq!(assemble_context(&hits, 3), "");
}

#[tokio::test]
async fn querying_a_fresh_store_returns_no_hits() {
    let dir = tempfile::tempdir().unwrap();
    let (_indexer, retriever, store) = pipeline(&dir, 900, 150);

    assert!(store.is_empty().await.unwrap());
    let hits = retriever.retrieve("anything at all", 6).await.unwrap();
    assert!(hits.is_empty());
}

#[tokio::test]
async fn reindexing_with_shorter_text_leaves_stale_chunks() {
    // Documented limitation: chunk ids overlap only up to the new count,
    // so surplus old chunks stay behind under their higher indices.
    let dir = tempfile::tempdir().unwrap();
    let (indexer, _retriever, store) = pipeline(&dir, 5, 2);

    indexer
        .index_document("doc1", "letters.txt", "A. B. C.")
        .await
        .unwrap();
    assert_eq!(store.len().await.unwrap(), 3);

    let count = indexer
        .index_document("doc1", "letters.txt", "Z")
        .await
        .unwrap();
    assert_eq!(count, 1);

    // doc1-0 was overwritten; doc1-1 and doc1-2 are orphaned but present
    assert_eq!(store.len().await.unwrap(), 3);
    let hits = store.query(&HashEmbedder.embed("Z").await.unwrap(), 10).await.unwrap();
    let first = hits.iter().find(|h| h.id == "doc1-0").unwrap();
    assert_eq!(first.text, "Z");
}

#[tokio::test]
async fn documents_are_retrievable_across_store_reopen() {
    let dir = tempfile::tempdir().unwrap();

    {
        let (indexer, _retriever, _store) = pipeline(&dir, 900, 150);
        indexer
            .index_document("doc1", "notes.txt", "The mitochondria is the powerhouse of the cell.")
            .await
            .unwrap();
    }

    let (_indexer, retriever, store) = pipeline(&dir, 900, 150);
    assert_eq!(store.len().await.unwrap(), 1);

    let hits = retriever
        .retrieve("The mitochondria is the powerhouse of the cell.", 1)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].metadata.source.as_deref(), Some("notes.txt"));
    assert!(hits[0].distance.abs() < 1e-6);
}
