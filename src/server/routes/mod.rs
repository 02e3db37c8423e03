//! API routes for the RAG server

pub mod chat;
pub mod query;
pub mod upload;

use axum::{
    extract::DefaultBodyLimit,
    routing::post,
    Router,
};

use crate::server::state::AppState;

/// Build all API routes
pub fn api_routes(max_upload_size: usize) -> Router<AppState> {
    Router::new()
        .route(
            "/upload",
            post(upload::upload).layer(DefaultBodyLimit::max(max_upload_size)),
        )
        .route("/chat", post(chat::chat))
        .route("/query", post(query::query))
}
