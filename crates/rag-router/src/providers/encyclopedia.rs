//! Encyclopedia provider trait for summary lookups

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::Result;

/// Outcome of one encyclopedia lookup
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EncyclopediaLookup {
    /// Rendered summary, `None` when nothing matched
    pub summary: Option<String>,
    /// Titles of the pages that contributed to the summary
    #[serde(default)]
    pub titles: Vec<String>,
}

impl EncyclopediaLookup {
    pub fn not_found() -> Self {
        Self::default()
    }
}

/// Trait for encyclopedia lookups
///
/// Implementations:
/// - `WikipediaClient`: MediaWiki search + intro extracts
#[async_trait]
pub trait EncyclopediaProvider: Send + Sync {
    /// Look up a question. "Not found" is `Ok` with no summary.
    async fn lookup(&self, question: &str) -> Result<EncyclopediaLookup>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}
