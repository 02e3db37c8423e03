//! Direct chat endpoint (no retrieval)

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::generation::CHAT_SYSTEM_PROMPT;
use crate::server::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub model_used: String,
    pub reply: String,
}

/// POST /chat - one-shot chat completion without document context
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>> {
    if request.message.is_empty() {
        return Err(Error::EmptyInput("no message provided".into()));
    }

    let reply = state
        .ollama()
        .chat(CHAT_SYSTEM_PROMPT, &request.message)
        .await?;

    Ok(Json(ChatResponse {
        model_used: state.ollama().chat_model().to_string(),
        reply,
    }))
}
