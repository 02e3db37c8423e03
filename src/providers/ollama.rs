//! Ollama client for embeddings and chat completion

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};

use super::embedding::EmbeddingProvider;

/// HTTP client for a local Ollama server, covering both the embedding
/// endpoint and non-streaming chat completion.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: String,
    embed_model: String,
    chat_model: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatResponseMessage,
}

impl OllamaClient {
    /// Create a new client. The chat model and endpoint come from the
    /// LLM section; the embedding model and dimension come from the
    /// embeddings section.
    pub fn new(llm: &LlmConfig, embeddings: &EmbeddingConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(llm.timeout_secs))
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: llm.base_url.trim_end_matches('/').to_string(),
            embed_model: embeddings.model.clone(),
            chat_model: llm.chat_model.clone(),
            dimensions: embeddings.dimensions,
        }
    }

    /// Model used for chat replies
    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    /// Model used for embeddings
    pub fn embed_model(&self) -> &str {
        &self.embed_model
    }

    /// Single chat completion with a system instruction and user message
    pub async fn chat(&self, system: &str, user: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.chat_model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system,
                },
                ChatMessage {
                    role: "user",
                    content: user,
                },
            ],
            stream: false,
        };

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Llm(format!("chat request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Llm(format!(
                "chat request returned {}",
                response.status()
            )));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::Llm(format!("invalid chat response: {}", e)))?;

        Ok(body.message.content)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let request = EmbeddingRequest {
            model: &self.embed_model,
            prompt: text,
        };

        let response = self
            .client
            .post(format!("{}/api/embeddings", self.base_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("embedding request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::Embedding(format!(
                "embedding request returned {}",
                response.status()
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("invalid embedding response: {}", e)))?;

        if body.embedding.len() != self.dimensions {
            return Err(Error::Embedding(format!(
                "model {} returned a {}-dimensional vector, expected {}",
                self.embed_model,
                body.embedding.len(),
                self.dimensions
            )));
        }

        Ok(body.embedding)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "ollama"
    }
}
