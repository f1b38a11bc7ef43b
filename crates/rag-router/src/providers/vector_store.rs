//! Vector store provider trait for storing and searching embeddings

use async_trait::async_trait;
use crate::error::Result;
use crate::types::{IndexEntry, ScoredEntry};

/// Trait for vector storage and similarity search
///
/// Implementations:
/// - `LocalVectorStore`: redb-backed index with brute-force cosine search
#[async_trait]
pub trait VectorStoreProvider: Send + Sync {
    /// Insert or replace entries by ID. Returns the number of entries written.
    async fn upsert(&self, entries: &[IndexEntry]) -> Result<usize>;

    /// Return up to `k` entries ordered by ascending distance to `vector`
    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredEntry>>;

    /// Get total number of entries stored
    async fn len(&self) -> Result<usize>;

    /// Check if store is empty
    async fn is_empty(&self) -> Result<bool> {
        Ok(self.len().await? == 0)
    }

    /// Dimension of the stored vectors, `None` while the store is empty
    async fn dimensions(&self) -> Result<Option<usize>>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
