//! Application state for the router server

use std::sync::Arc;

use crate::config::RouterConfig;
use crate::error::Result;
use crate::ingestion::{IngestPipeline, IngestReport, TextChunker};
use crate::providers::Capabilities;
use crate::routing::Orchestrator;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Configuration
    config: RouterConfig,
    /// Capability handles (embedder, index, classifier, adapters, loader)
    capabilities: Capabilities,
    /// Stateless per-request orchestrator
    orchestrator: Orchestrator,
}

impl AppState {
    /// Create new application state from already constructed capabilities
    pub fn new(config: RouterConfig, capabilities: Capabilities) -> Self {
        let orchestrator = Orchestrator::from_config(&config, &capabilities);
        Self {
            inner: Arc::new(AppStateInner {
                config,
                capabilities,
                orchestrator,
            }),
        }
    }

    /// Build the hosted clients described by `config` and check the index
    /// matches the embedding model
    pub async fn from_config(config: RouterConfig) -> Result<Self> {
        tracing::info!("Initializing router state...");
        let capabilities = Capabilities::from_config(&config)?;
        Self::from_capabilities(config, capabilities).await
    }

    /// Like [`new`](Self::new), refusing an index built with another embedding width
    pub async fn from_capabilities(config: RouterConfig, capabilities: Capabilities) -> Result<Self> {
        capabilities.check_dimensions().await?;
        Ok(Self::new(config, capabilities))
    }

    pub fn config(&self) -> &RouterConfig {
        &self.inner.config
    }

    pub fn capabilities(&self) -> &Capabilities {
        &self.inner.capabilities
    }

    pub fn orchestrator(&self) -> &Orchestrator {
        &self.inner.orchestrator
    }

    /// Ingestion pipeline over this state's loader, embedder and index
    pub fn ingest_pipeline(&self) -> Result<IngestPipeline> {
        let caps = &self.inner.capabilities;
        let chunker = TextChunker::cl100k(self.inner.config.chunking.chunk_size)?;
        Ok(IngestPipeline::new(
            Arc::clone(&caps.loader),
            chunker,
            Arc::clone(&caps.embedder),
            Arc::clone(&caps.store),
        )
        .configure(&self.inner.config))
    }

    /// Ingest the configured sources
    pub async fn ingest_configured_sources(&self) -> Result<IngestReport> {
        let pipeline = self.ingest_pipeline()?;
        pipeline.ingest(&self.inner.config.ingestion.sources).await
    }
}
