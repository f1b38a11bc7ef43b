//! Web search branch with tiered extraction
//!
//! Tiers, each tried only when the previous produced nothing:
//! organic snippets, then top story links, then related search links. At most
//! three of the leading records of a section are considered.

use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::providers::{SearchRecord, SearchResponse, WebSearchProvider};
use crate::timeout::with_timeout;

/// Records considered per section
const RECORDS_PER_TIER: usize = 3;

/// Runs one search and extracts result passages. Fails open.
pub struct WebRetriever {
    provider: Arc<dyn WebSearchProvider>,
    api_key: Option<String>,
    timeout: Duration,
}

impl WebRetriever {
    pub fn new(provider: Arc<dyn WebSearchProvider>, api_key: Option<String>) -> Self {
        Self {
            provider,
            api_key,
            timeout: Duration::from_secs(15),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Search passages for `question`.
    ///
    /// A missing credential is a configuration error. Any failure of the
    /// search itself is logged and yields an empty list.
    pub async fn retrieve(&self, question: &str) -> Result<Vec<String>> {
        let api_key = self
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::config("SERP_API_KEY is not set"))?;

        let search = self.provider.search(question, api_key);
        match with_timeout("web search", self.timeout, search).await {
            Ok(response) => Ok(extract(&response)),
            Err(e) if e.is_configuration() => Err(e),
            Err(e) => {
                tracing::warn!("{} search failed, returning no results: {}", self.provider.name(), e);
                Ok(Vec::new())
            }
        }
    }
}

/// Apply the extraction tiers to a search response
pub fn extract(response: &SearchResponse) -> Vec<String> {
    let snippets = tier(&response.organic_results, |r| r.snippet.clone());
    if !snippets.is_empty() {
        return snippets;
    }

    let stories = tier(&response.top_stories, |r| {
        r.link.as_ref().map(|link| format!("Top story: {}", link))
    });
    if !stories.is_empty() {
        return stories;
    }

    tier(&response.related_searches, |r| {
        r.link.as_ref().map(|link| format!("Related search: {}", link))
    })
}

fn tier(records: &[SearchRecord], field: impl Fn(&SearchRecord) -> Option<String>) -> Vec<String> {
    records.iter().take(RECORDS_PER_TIER).filter_map(field).collect()
}
