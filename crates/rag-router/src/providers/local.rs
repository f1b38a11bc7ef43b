//! Local vector store provider over the redb index

use async_trait::async_trait;
use std::path::Path;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::retrieval::VectorIndex;
use crate::types::{IndexEntry, ScoredEntry};

use super::vector_store::VectorStoreProvider;

/// Local vector store wrapping the synchronous [`VectorIndex`]
pub struct LocalVectorStore {
    index: Arc<VectorIndex>,
}

impl LocalVectorStore {
    /// Create from an existing index
    pub fn new(index: Arc<VectorIndex>) -> Self {
        Self { index }
    }

    /// Open the index stored at `path`
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(Arc::new(VectorIndex::open(path)?)))
    }

    /// Non-persistent store
    pub fn in_memory() -> Result<Self> {
        Ok(Self::new(Arc::new(VectorIndex::in_memory()?)))
    }
}

#[async_trait]
impl VectorStoreProvider for LocalVectorStore {
    async fn upsert(&self, entries: &[IndexEntry]) -> Result<usize> {
        // redb writes are blocking, keep them off the runtime threads
        let index = self.index.clone();
        let entries = entries.to_vec();
        tokio::task::spawn_blocking(move || index.upsert(&entries))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    async fn query(&self, vector: &[f32], k: usize) -> Result<Vec<ScoredEntry>> {
        let index = self.index.clone();
        let vector = vector.to_vec();
        tokio::task::spawn_blocking(move || index.query(&vector, k))
            .await
            .map_err(|e| Error::Internal(format!("Task join error: {}", e)))?
    }

    async fn len(&self) -> Result<usize> {
        Ok(self.index.len())
    }

    async fn dimensions(&self) -> Result<Option<usize>> {
        Ok(self.index.dimensions())
    }

    fn name(&self) -> &str {
        "local-redb"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Chunk;

    #[tokio::test]
    async fn test_async_roundtrip() {
        let store = LocalVectorStore::in_memory().unwrap();
        assert!(store.is_empty().await.unwrap());

        let chunk = Chunk::new("doc", "hello".to_string(), 0, 5, 0);
        let written = store.upsert(&[IndexEntry::new(chunk, vec![0.5, 0.5])]).await.unwrap();
        assert_eq!(written, 1);
        assert_eq!(store.len().await.unwrap(), 1);
        assert_eq!(store.dimensions().await.unwrap(), Some(2));

        let hits = store.query(&[0.5, 0.5], 4).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].chunk.content, "hello");
    }
}
