//! Encyclopedia branch

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::providers::EncyclopediaProvider;
use crate::timeout::with_timeout;

/// Document returned when the lookup found nothing
pub const NO_SUMMARY: &str = "No Wikipedia summary found.";

/// Wraps an encyclopedia lookup into a one-document result
pub struct EncyclopediaRetriever {
    provider: Arc<dyn EncyclopediaProvider>,
    timeout: Duration,
}

impl EncyclopediaRetriever {
    pub fn new(provider: Arc<dyn EncyclopediaProvider>) -> Self {
        Self {
            provider,
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Always exactly one document: the summary or [`NO_SUMMARY`].
    /// Lookup failures propagate.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<String>> {
        let lookup = with_timeout("encyclopedia lookup", self.timeout, self.provider.lookup(question)).await?;

        let document = match lookup.summary {
            Some(summary) if !summary.trim().is_empty() => {
                tracing::debug!("{} matched pages {:?}", self.provider.name(), lookup.titles);
                summary
            }
            _ => {
                tracing::info!("{} has no summary for the question", self.provider.name());
                NO_SUMMARY.to_string()
            }
        };
        Ok(vec![document])
    }
}
