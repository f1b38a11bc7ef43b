//! Router server binary
//!
//! Run with: cargo run -p rag-router --bin rag-router-server [config.toml]

use rag_router::{config::RouterConfig, server::state::AppState, server::RouterServer};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rag_router=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = RouterConfig::load(config_path.as_deref())?;

    tracing::info!("Configuration loaded");
    tracing::info!("  - Chat model: {}", config.llm.chat_model);
    tracing::info!("  - Embedding model: {} ({} dims)", config.embeddings.model, config.embeddings.dimensions);
    tracing::info!("  - Index: {}", config.vector_db.storage_path.display());
    tracing::info!("  - Chunk size: {} tokens", config.chunking.chunk_size);
    if config.web_search.api_key.is_none() {
        tracing::warn!("SERP_API_KEY is not set; questions routed to web search will fail");
    }

    let state = AppState::from_config(config).await?;

    if state.config().server.ingest_on_startup {
        let report = state.ingest_configured_sources().await?;
        for skipped in &report.skipped {
            tracing::warn!("  - skipped {}: {}", skipped.source, skipped.reason);
        }
    }

    let server = RouterServer::new(state);

    println!("\nServer starting...");
    println!("  API: http://{}", server.address());
    println!("  Health: http://{}/health", server.address());
    println!("\nEndpoints:");
    println!("  GET  /                          - Welcome message");
    println!("  POST /route_question?question=  - Route a question");
    println!("\nPress Ctrl+C to stop\n");

    server.start().await?;

    Ok(())
}
