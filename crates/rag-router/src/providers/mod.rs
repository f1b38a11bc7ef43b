//! Provider abstractions for the external capabilities the router depends on
//!
//! Each capability (embeddings, vector storage, classification, encyclopedia,
//! web search, document loading) sits behind a trait so the pipeline can run
//! against hosted services in production and in-process fakes in tests.

use std::sync::Arc;

use crate::config::RouterConfig;
use crate::error::{Error, Result};

pub mod classifier;
pub mod document_loader;
pub mod embedding;
pub mod encyclopedia;
pub mod vector_store;
pub mod web_search;

pub mod local;
pub mod openai;
pub mod serpapi;
pub mod web_loader;
pub mod wikipedia;

pub use classifier::ClassificationProvider;
pub use document_loader::DocumentLoader;
pub use embedding::EmbeddingProvider;
pub use encyclopedia::{EncyclopediaLookup, EncyclopediaProvider};
pub use vector_store::VectorStoreProvider;
pub use web_search::{SearchRecord, SearchResponse, WebSearchProvider};

pub use local::LocalVectorStore;
pub use openai::OpenAiClient;
pub use serpapi::SerpApiClient;
pub use web_loader::WebLoader;
pub use wikipedia::WikipediaClient;

/// Shared handles to every external capability
#[derive(Clone)]
pub struct Capabilities {
    /// Embedding model shared by ingestion and retrieval
    pub embedder: Arc<dyn EmbeddingProvider>,
    /// Similarity index
    pub store: Arc<dyn VectorStoreProvider>,
    /// Routing classifier
    pub classifier: Arc<dyn ClassificationProvider>,
    pub encyclopedia: Arc<dyn EncyclopediaProvider>,
    pub web_search: Arc<dyn WebSearchProvider>,
    /// Source loader for ingestion
    pub loader: Arc<dyn DocumentLoader>,
}

impl Capabilities {
    /// Build the hosted clients and open the on-disk index.
    ///
    /// Fails when the OpenAI key is missing. The SerpApi key is checked when
    /// the web branch runs.
    pub fn from_config(config: &RouterConfig) -> Result<Self> {
        let t = &config.timeouts;
        let openai = Arc::new(OpenAiClient::new(
            &config.llm,
            &config.embeddings,
            t.classifier().max(t.embedding()),
        )?);
        tracing::info!(
            "OpenAI client ready (chat: {}, embeddings: {})",
            config.llm.chat_model,
            config.embeddings.model
        );

        let store = Arc::new(LocalVectorStore::open(&config.vector_db.storage_path)?);

        Ok(Self {
            embedder: openai.clone(),
            store,
            classifier: openai,
            encyclopedia: Arc::new(WikipediaClient::new(&config.encyclopedia, t.encyclopedia())?),
            web_search: Arc::new(SerpApiClient::new(&config.web_search, t.web_search())?),
            loader: Arc::new(WebLoader::new(&config.ingestion.user_agent, t.fetch())?),
        })
    }

    /// Fail when the index already holds vectors of another width than the
    /// embedder produces, e.g. after switching embedding models
    pub async fn check_dimensions(&self) -> Result<()> {
        let actual = self.embedder.dimensions();
        match self.store.dimensions().await? {
            Some(expected) if expected != actual => {
                tracing::error!(
                    "{} holds {}-dimensional vectors but {} produces {}",
                    self.store.name(),
                    expected,
                    self.embedder.name(),
                    actual
                );
                Err(Error::DimensionMismatch { expected, actual })
            }
            _ => Ok(()),
        }
    }
}
