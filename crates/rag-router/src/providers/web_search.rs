//! Web search provider trait and response shape

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use crate::error::Result;

/// One record from any result section
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub snippet: Option<String>,
}

/// Search response sections (SerpApi layout). Absent sections deserialize as empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub organic_results: Vec<SearchRecord>,
    #[serde(default)]
    pub top_stories: Vec<SearchRecord>,
    #[serde(default)]
    pub related_searches: Vec<SearchRecord>,
}

/// Trait for web search
///
/// Implementations:
/// - `SerpApiClient`: SerpApi Google engine
#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    /// Run one search with the given credential
    async fn search(&self, question: &str, api_key: &str) -> Result<SearchResponse>;

    /// Get provider name for logging
    fn name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_sections_default_to_empty() {
        let response: SearchResponse = serde_json::from_str(
            r#"{"search_metadata": {"status": "Success"},
                "related_searches": [{"query": "agents", "link": "https://example.com/r"}]}"#,
        )
        .unwrap();

        assert!(response.organic_results.is_empty());
        assert!(response.top_stories.is_empty());
        assert_eq!(response.related_searches.len(), 1);
        assert_eq!(response.related_searches[0].link.as_deref(), Some("https://example.com/r"));
        assert_eq!(response.related_searches[0].snippet, None);
    }
}
