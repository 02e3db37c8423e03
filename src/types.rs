//! Core data model: documents, chunks, and retrieval hits

use serde::{Deserialize, Serialize};

/// An uploaded document. Append-only: once indexed it is never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Opaque unique identifier (caller-supplied or generated at upload)
    pub doc_id: String,
    /// Display label, usually the original filename
    pub source_name: String,
    /// Raw extracted text
    pub text: String,
}

impl Document {
    pub fn new(
        doc_id: impl Into<String>,
        source_name: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            doc_id: doc_id.into(),
            source_name: source_name.into(),
            text: text.into(),
        }
    }
}

/// Provenance metadata attached to every stored chunk.
///
/// Used for display and filtering only, never for ranking. Optional fields
/// get their display defaults in one place (`assemble_context`), not at
/// each call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Owning document id
    pub doc_id: String,
    /// Display label of the source document
    pub source: Option<String>,
    /// 0-based position of the chunk within its document
    pub chunk: Option<u32>,
}

impl ChunkMetadata {
    pub fn new(doc_id: impl Into<String>, source: impl Into<String>, chunk: u32) -> Self {
        Self {
            doc_id: doc_id.into(),
            source: Some(source.into()),
            chunk: Some(chunk),
        }
    }
}

/// A chunk of a document's normalized text, the unit of embedding and
/// retrieval. Owned by exactly one document; never mutated after indexing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Globally unique id, `"{doc_id}-{chunk_index}"`
    pub id: String,
    /// Chunk text
    pub content: String,
    /// 0-based position within the document
    pub chunk_index: u32,
    /// Provenance metadata
    pub metadata: ChunkMetadata,
}

impl Chunk {
    /// Build a chunk for position `index` of document `doc_id`
    pub fn new(doc_id: &str, source_name: &str, content: String, index: u32) -> Self {
        Self {
            id: format!("{}-{}", doc_id, index),
            content,
            chunk_index: index,
            metadata: ChunkMetadata::new(doc_id, source_name, index),
        }
    }
}

/// One retrieval result. Produced by the retriever, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hit {
    /// Chunk id
    pub id: String,
    /// Chunk text
    pub text: String,
    /// Provenance metadata
    pub metadata: ChunkMetadata,
    /// Cosine distance as reported by the store (ascending is better)
    pub distance: f32,
}
