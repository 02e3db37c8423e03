//! RAG server binary
//!
//! Run with: cargo run --bin docuchat-server [config.toml]

use docuchat::{server::RagServer, RagConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docuchat=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::args().nth(1).unwrap_or_else(|| "docuchat.toml".to_string());
    let config = RagConfig::load(&config_path)?;

    tracing::info!("configuration loaded from {}", config_path);
    tracing::info!("  - embedding model: {}", config.embeddings.model);
    tracing::info!("  - embedding dimensions: {}", config.embeddings.dimensions);
    tracing::info!("  - chat model: {}", config.llm.chat_model);
    tracing::info!(
        "  - chunking: {} chars, {} overlap",
        config.chunking.chunk_chars,
        config.chunking.overlap
    );

    // A missing Ollama is a warning, not a startup failure
    let client = reqwest::Client::new();
    match client
        .get(format!("{}/api/tags", config.llm.base_url))
        .send()
        .await
    {
        Ok(resp) if resp.status().is_success() => {
            tracing::info!("ollama is running at {}", config.llm.base_url);
        }
        _ => {
            tracing::warn!("ollama not reachable at {}", config.llm.base_url);
            tracing::warn!("start it with `ollama serve` and pull the models:");
            tracing::warn!(
                "  ollama pull {} && ollama pull {}",
                config.embeddings.model,
                config.llm.chat_model
            );
        }
    }

    let server = RagServer::new(config)?;
    tracing::info!("endpoints: POST /upload, POST /chat, POST /query, GET /health");
    server.start().await?;

    Ok(())
}
