//! Application state for the RAG server

use std::sync::Arc;

use crate::config::RagConfig;
use crate::error::Result;
use crate::ingestion::{Chunker, Indexer};
use crate::providers::{EmbeddingProvider, OllamaClient, VectorStoreProvider};
use crate::retrieval::Retriever;
use crate::storage::SqliteVectorStore;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: RagConfig,
    ollama: Arc<OllamaClient>,
    indexer: Indexer,
    retriever: Retriever,
}

impl AppState {
    /// Create application state with the default providers: an Ollama
    /// client for embeddings and chat, and a sqlite vector store at the
    /// configured path.
    pub fn new(config: RagConfig) -> Result<Self> {
        config.chunking.validate()?;

        let store: Arc<dyn VectorStoreProvider> = Arc::new(SqliteVectorStore::open(
            &config.storage.vector_db_path,
            config.embeddings.dimensions,
        )?);
        tracing::info!(
            path = %config.storage.vector_db_path.display(),
            dimensions = config.embeddings.dimensions,
            "vector store opened"
        );

        let ollama = Arc::new(OllamaClient::new(&config.llm, &config.embeddings));
        let embedder: Arc<dyn EmbeddingProvider> = Arc::clone(&ollama) as _;

        std::fs::create_dir_all(&config.storage.upload_dir)?;

        Self::with_providers(config, ollama, embedder, store)
    }

    /// Create state from explicitly constructed providers. Exists so
    /// tests can swap in fakes without a running Ollama or a real store
    /// location.
    pub fn with_providers(
        config: RagConfig,
        ollama: Arc<OllamaClient>,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
    ) -> Result<Self> {
        config.chunking.validate()?;
        let chunker = Chunker::from_config(&config.chunking)?;

        let indexer = Indexer::new(chunker, Arc::clone(&embedder), Arc::clone(&store));
        let retriever = Retriever::new(embedder, store);

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                ollama,
                indexer,
                retriever,
            }),
        })
    }

    pub fn config(&self) -> &RagConfig {
        &self.inner.config
    }

    pub fn ollama(&self) -> &Arc<OllamaClient> {
        &self.inner.ollama
    }

    pub fn indexer(&self) -> &Indexer {
        &self.inner.indexer
    }

    pub fn retriever(&self) -> &Retriever {
        &self.inner.retriever
    }
}
