//! Ingestion CLI: populate the similarity index
//!
//! Run with: cargo run -p rag-router --features cli --bin rag-router-ingest -- [URL...]

use anyhow::Context;
use clap::Parser;
use rag_router::{config::RouterConfig, server::state::AppState};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(
    name = "rag-router-ingest",
    version,
    about = "Fetch, chunk, embed and index source documents for similarity routing"
)]
struct IngestCli {
    /// Source URLs (defaults to `ingestion.sources` from the configuration)
    sources: Vec<String>,

    /// TOML configuration file
    #[arg(long, short)]
    config: Option<PathBuf>,

    /// Override the index location
    #[arg(long)]
    index: Option<PathBuf>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rag_router=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = IngestCli::parse();

    let mut config = RouterConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(index) = cli.index {
        config.vector_db.storage_path = index;
    }
    if !cli.sources.is_empty() {
        config.ingestion.sources = cli.sources;
    }
    anyhow::ensure!(!config.ingestion.sources.is_empty(), "no sources to ingest");

    let state = AppState::from_config(config).await?;
    let report = state.ingest_configured_sources().await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Sources loaded:  {}", report.sources_loaded);
    println!("Documents:       {}", report.documents);
    println!("Chunks:          {}", report.chunks);
    println!("Entries written: {}", report.entries_written);
    println!("Elapsed:         {}ms", report.elapsed_ms);
    if !report.skipped.is_empty() {
        println!("Skipped:");
        for skipped in &report.skipped {
            println!("  {} ({})", skipped.source, skipped.reason);
        }
    }

    Ok(())
}
