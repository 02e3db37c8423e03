//! Durable sqlite-backed vector store with full-scan cosine search

use async_trait::async_trait;
use parking_lot::Mutex;
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::vector_store::{VectorEntry, VectorHit, VectorStoreProvider};
use crate::types::ChunkMetadata;

/// Vector store persisted in a single sqlite file.
///
/// Entries live in one `chunks` table with the embedding serialized as
/// little-endian f32 bytes. Search is a full scan with cosine distance
/// computed in process; fine for the corpus sizes a single upload
/// endpoint produces. Row-level sqlite atomicity gives a concurrent
/// reader either the pre- or post-write state of each entry, never a
/// torn one.
pub struct SqliteVectorStore {
    conn: Arc<Mutex<Connection>>,
    dimensions: usize,
}

impl SqliteVectorStore {
    /// Open (or create) a store at `path` with a fixed embedding
    /// dimension. Reopening an existing store with a different dimension
    /// is a configuration error.
    pub fn open(path: impl AsRef<Path>, dimensions: usize) -> Result<Self> {
        if dimensions == 0 {
            return Err(Error::Config("embedding dimension must be non-zero".into()));
        }

        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path).map_err(|e| Error::VectorDb(e.to_string()))?;
        conn.pragma_update(None, "journal_mode", "WAL")
            .map_err(|e| Error::VectorDb(e.to_string()))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS store_meta (
                key   TEXT PRIMARY KEY,
                value TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS chunks (
                id          TEXT PRIMARY KEY,
                doc_id      TEXT NOT NULL,
                source      TEXT,
                chunk_index INTEGER,
                content     TEXT NOT NULL,
                embedding   BLOB NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_chunks_doc ON chunks(doc_id);",
        )
        .map_err(|e| Error::VectorDb(e.to_string()))?;

        // Pin the dimension on first open; later opens must agree.
        let stored: Option<String> = conn
            .query_row(
                "SELECT value FROM store_meta WHERE key = 'dimensions'",
                [],
                |row| row.get(0),
            )
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(Error::VectorDb(other.to_string())),
            })?;

        match stored {
            Some(value) => {
                let existing: usize = value
                    .parse()
                    .map_err(|_| Error::VectorDb(format!("corrupt dimension value: {}", value)))?;
                if existing != dimensions {
                    return Err(Error::Config(format!(
                        "store at {} was created with dimension {}, requested {}",
                        path.display(),
                        existing,
                        dimensions
                    )));
                }
            }
            None => {
                conn.execute(
                    "INSERT INTO store_meta (key, value) VALUES ('dimensions', ?1)",
                    params![dimensions.to_string()],
                )
                .map_err(|e| Error::VectorDb(e.to_string()))?;
            }
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            dimensions,
        })
    }

    fn upsert_sync(
        conn: &Arc<Mutex<Connection>>,
        dimensions: usize,
        entries: &[VectorEntry],
    ) -> Result<()> {
        let mut conn = conn.lock();
        let tx = conn
            .transaction()
            .map_err(|e| Error::VectorDb(e.to_string()))?;
        {
            let mut stmt = tx
                .prepare(
                    "INSERT INTO chunks (id, doc_id, source, chunk_index, content, embedding)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                     ON CONFLICT(id) DO UPDATE SET
                        doc_id = excluded.doc_id,
                        source = excluded.source,
                        chunk_index = excluded.chunk_index,
                        content = excluded.content,
                        embedding = excluded.embedding",
                )
                .map_err(|e| Error::VectorDb(e.to_string()))?;

            for entry in entries {
                if entry.vector.len() != dimensions {
                    return Err(Error::Config(format!(
                        "entry {} has dimension {}, store expects {}",
                        entry.id,
                        entry.vector.len(),
                        dimensions
                    )));
                }
                stmt.execute(params![
                    entry.id,
                    entry.metadata.doc_id,
                    entry.metadata.source,
                    entry.metadata.chunk,
                    entry.text,
                    encode_vector(&entry.vector),
                ])
                .map_err(|e| Error::VectorDb(e.to_string()))?;
            }
        }
        tx.commit().map_err(|e| Error::VectorDb(e.to_string()))
    }

    fn query_sync(
        conn: &Arc<Mutex<Connection>>,
        dimensions: usize,
        vector: &[f32],
        top_k: usize,
    ) -> Result<Vec<VectorHit>> {
        if vector.len() != dimensions {
            return Err(Error::Config(format!(
                "query vector has dimension {}, store expects {}",
                vector.len(),
                dimensions
            )));
        }

        let conn = conn.lock();
        let mut stmt = conn
            .prepare("SELECT id, doc_id, source, chunk_index, content, embedding FROM chunks")
            .map_err(|e| Error::Retrieval(e.to_string()))?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, Option<String>>(2)?,
                    row.get::<_, Option<u32>>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Vec<u8>>(5)?,
                ))
            })
            .map_err(|e| Error::Retrieval(e.to_string()))?;

        let mut hits = Vec::new();
        for row in rows {
            let (id, doc_id, source, chunk_index, content, blob) =
                row.map_err(|e| Error::Retrieval(e.to_string()))?;
            let embedding = decode_vector(&blob);
            if embedding.len() != dimensions {
                return Err(Error::Retrieval(format!(
                    "stored entry {} has corrupt embedding of length {}",
                    id,
                    embedding.len()
                )));
            }
            hits.push(VectorHit {
                id,
                text: content,
                metadata: ChunkMetadata {
                    doc_id,
                    source,
                    chunk: chunk_index,
                },
                distance: cosine_distance(vector, &embedding),
            });
        }

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_k);
        Ok(hits)
    }

    fn len_sync(conn: &Arc<Mutex<Connection>>) -> Result<usize> {
        let conn = conn.lock();
        conn.query_row("SELECT COUNT(*) FROM chunks", [], |row| {
            row.get::<_, i64>(0)
        })
        .map(|n| n as usize)
        .map_err(|e| Error::VectorDb(e.to_string()))
    }
}

#[async_trait]
impl VectorStoreProvider for SqliteVectorStore {
    async fn upsert(&self, entries: &[VectorEntry]) -> Result<()> {
        let conn = Arc::clone(&self.conn);
        let dimensions = self.dimensions;
        let entries = entries.to_vec();
        tokio::task::spawn_blocking(move || Self::upsert_sync(&conn, dimensions, &entries))
            .await
            .map_err(|e| Error::Internal(format!("task join error: {}", e)))?
    }

    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<VectorHit>> {
        let conn = Arc::clone(&self.conn);
        let dimensions = self.dimensions;
        let vector = vector.to_vec();
        tokio::task::spawn_blocking(move || Self::query_sync(&conn, dimensions, &vector, top_k))
            .await
            .map_err(|e| Error::Internal(format!("task join error: {}", e)))?
    }

    async fn len(&self) -> Result<usize> {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || Self::len_sync(&conn))
            .await
            .map_err(|e| Error::Internal(format!("task join error: {}", e)))?
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}

fn encode_vector(vector: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vector.len() * 4);
    for value in vector {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

fn decode_vector(bytes: &[u8]) -> Vec<f32> {
    bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

/// Cosine distance in [0, 2]; zero-norm vectors compare as maximally far.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }
    1.0 - dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, vector: Vec<f32>, text: &str) -> VectorEntry {
        VectorEntry {
            id: id.to_string(),
            vector,
            text: text.to_string(),
            metadata: ChunkMetadata::new("doc", "test.txt", 0),
        }
    }

    #[test]
    fn vector_codec_round_trips() {
        let vector = vec![0.0, 1.5, -2.25, f32::MIN_POSITIVE];
        assert_eq!(decode_vector(&encode_vector(&vector)), vector);
    }

    #[test]
    fn cosine_distance_basics() {
        assert!(cosine_distance(&[1.0, 0.0], &[1.0, 0.0]).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[0.0, 1.0]) - 1.0).abs() < 1e-6);
        assert!((cosine_distance(&[1.0, 0.0], &[-1.0, 0.0]) - 2.0).abs() < 1e-6);
        assert_eq!(cosine_distance(&[0.0, 0.0], &[1.0, 0.0]), 1.0);
    }

    #[tokio::test]
    async fn query_orders_by_ascending_distance_and_respects_top_k() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteVectorStore::open(dir.path().join("vectors.db"), 2).unwrap();

        store
            .upsert(&[
                entry("a", vec![1.0, 0.0], "exact"),
                entry("b", vec![0.7, 0.7], "diagonal"),
                entry("c", vec![0.0, 1.0], "orthogonal"),
            ])
            .await
            .unwrap();

        let hits = store.query(&[1.0, 0.0], 2).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, "a");
        assert_eq!(hits[1].id, "b");
        assert!(hits[0].distance <= hits[1].distance);

        // top_k larger than the store never over-returns
        let hits = store.query(&[1.0, 0.0], 10).await.unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[tokio::test]
    async fn empty_store_returns_no_hits() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteVectorStore::open(dir.path().join("vectors.db"), 3).unwrap();
        let hits = store.query(&[1.0, 0.0, 0.0], 6).await.unwrap();
        assert!(hits.is_empty());
        assert!(store.is_empty().await.unwrap());
    }

    #[tokio::test]
    async fn later_write_with_same_id_wins() {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteVectorStore::open(dir.path().join("vectors.db"), 2).unwrap();

        store
            .upsert(&[entry("a", vec![1.0, 0.0], "first")])
            .await
            .unwrap();
        store
            .upsert(&[entry("a", vec![0.0, 1.0], "second")])
            .await
            .unwrap();

        assert_eq!(store.len().await.unwrap(), 1);
        let hits = store.query(&[0.0, 1.0], 1).await.unwrap();
        assert_eq!(hits[0].text, "second");
        assert!(hits[0].distance.abs() < 1e-6);
    }

    #[tokio::test]
    async fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.db");

        {
            let store = SqliteVectorStore::open(&path, 2).unwrap();
            store
                .upsert(&[entry("a", vec![1.0, 0.0], "persisted")])
                .await
                .unwrap();
        }

        let store = SqliteVectorStore::open(&path, 2).unwrap();
        assert_eq!(store.len().await.unwrap(), 1);
        let hits = store.query(&[1.0, 0.0], 1).await.unwrap();
        assert_eq!(hits[0].text, "persisted");
    }

    #[tokio::test]
    async fn rejects_mismatched_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vectors.db");

        let store = SqliteVectorStore::open(&path, 2).unwrap();
        let result = store.upsert(&[entry("a", vec![1.0, 0.0, 0.0], "bad")]).await;
        assert!(matches!(result, Err(Error::Config(_))));

        let result = store.query(&[1.0], 1).await;
        assert!(matches!(result, Err(Error::Config(_))));

        // Reopening with a different dimension is rejected too
        drop(store);
        assert!(matches!(
            SqliteVectorStore::open(&path, 5),
            Err(Error::Config(_))
        ));
    }
}
