//! Error types for the RAG pipeline

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the RAG pipeline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid configuration (degenerate chunking parameters, dimension mismatch at open)
    #[error("configuration error: {0}")]
    Config(String),

    /// Input text normalized to empty at indexing time
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// Embedder failed or returned a malformed vector
    #[error("embedding error: {0}")]
    Embedding(String),

    /// Vector store unreachable or corrupted at query time
    #[error("retrieval error: {0}")]
    Retrieval(String),

    /// File extension not handled by any parser
    #[error("unsupported file type: {0}")]
    UnsupportedFileType(String),

    /// A supported file could not be parsed
    #[error("failed to parse {filename}: {reason}")]
    FileParse { filename: String, reason: String },

    /// LLM call failed
    #[error("llm error: {0}")]
    Llm(String),

    /// Vector store write/read failure
    #[error("vector store error: {0}")]
    VectorDb(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Convenience constructor for file parse errors
    pub fn file_parse(filename: impl Into<String>, reason: impl ToString) -> Self {
        Self::FileParse {
            filename: filename.into(),
            reason: reason.to_string(),
        }
    }

    /// HTTP status code this error maps to
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::EmptyInput(_) | Error::UnsupportedFileType(_) => StatusCode::BAD_REQUEST,
            Error::Config(_) => StatusCode::BAD_REQUEST,
            Error::FileParse { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("request failed: {}", self);
        } else {
            tracing::warn!("request rejected: {}", self);
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}
