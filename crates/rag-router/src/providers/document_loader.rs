//! Document loader trait for ingestion sources

use async_trait::async_trait;
use crate::error::Result;
use crate::types::RawDocument;

/// Trait for turning a source identifier into documents
///
/// Implementations:
/// - `WebLoader`: fetch a URL and extract visible HTML text
#[async_trait]
pub trait DocumentLoader: Send + Sync {
    /// Load one source. A source may yield several documents.
    async fn load(&self, source: &str) -> Result<Vec<RawDocument>>;

    /// Get loader name for logging
    fn name(&self) -> &str;
}
