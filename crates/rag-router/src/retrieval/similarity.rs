//! Similarity retrieval over the ingested corpus

use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::providers::{EmbeddingProvider, VectorStoreProvider};
use crate::timeout::with_timeout;

/// Embeds a question and returns the nearest chunk texts
pub struct SimilarityRetriever {
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    top_k: usize,
    embed_timeout: Duration,
    index_timeout: Duration,
}

impl SimilarityRetriever {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
        top_k: usize,
    ) -> Self {
        Self {
            embedder,
            store,
            top_k,
            embed_timeout: Duration::from_secs(30),
            index_timeout: Duration::from_secs(10),
        }
    }

    /// Set the embedding and index query budgets
    pub fn with_timeouts(mut self, embed: Duration, index: Duration) -> Self {
        self.embed_timeout = embed;
        self.index_timeout = index;
        self
    }

    /// Chunk texts nearest to `question`, closest first.
    ///
    /// An empty index yields an empty list without calling the embedder.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<String>> {
        let Some(expected) = self.store.dimensions().await? else {
            tracing::info!("Similarity index is empty, nothing to retrieve");
            return Ok(Vec::new());
        };

        let query = with_timeout("query embedding", self.embed_timeout, self.embedder.embed(question)).await?;
        if query.len() != expected {
            return Err(Error::DimensionMismatch {
                expected,
                actual: query.len(),
            });
        }

        let hits = with_timeout("index query", self.index_timeout, self.store.query(&query, self.top_k)).await?;
        tracing::debug!(
            "Similarity search returned {} hits (best distance {:?})",
            hits.len(),
            hits.first().map(|h| h.distance)
        );

        Ok(hits.into_iter().map(|hit| hit.chunk.content).collect())
    }
}
