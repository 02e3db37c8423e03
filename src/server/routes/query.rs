//! RAG query endpoint

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::generation::{assemble_context, compose_user_message, RAG_SYSTEM_PROMPT};
use crate::server::state::AppState;
use crate::types::Hit;

#[derive(Debug, Deserialize)]
pub struct QueryRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct QueryResponse {
    pub answer: String,
    pub hits: Vec<Hit>,
}

/// POST /query - retrieve nearest chunks and answer with their context
pub async fn query(
    State(state): State<AppState>,
    Json(request): Json<QueryRequest>,
) -> Result<Json<QueryResponse>> {
    let question = request.question.trim();
    if question.is_empty() {
        return Err(Error::EmptyInput("question required".into()));
    }

    tracing::info!(question, "rag query");

    let top_k = state.config().llm.top_k;
    let hits = state.retriever().retrieve(question, top_k).await?;

    let context = assemble_context(&hits, state.config().llm.max_context_chars);
    let user_message = compose_user_message(&context, question);

    let answer = state.ollama().chat(RAG_SYSTEM_PROMPT, &user_message).await?;

    Ok(Json(QueryResponse { answer, hits }))
}
