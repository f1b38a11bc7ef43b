//! Wikipedia encyclopedia provider
//!
//! Uses a single MediaWiki `action=query` call: a search generator feeding the
//! TextExtracts intro of each hit.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

use crate::config::EncyclopediaConfig;
use crate::error::{Error, Result};

use super::encyclopedia::{EncyclopediaLookup, EncyclopediaProvider};

/// CirrusSearch rejects longer search strings
pub const MAX_QUERY_CHARS: usize = 300;

/// Wikipedia API client
pub struct WikipediaClient {
    client: Client,
    api_url: String,
    top_k_results: usize,
    max_summary_chars: usize,
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    query: Option<QueryPages>,
    /// MediaWiki reports API failures in the body of a 200 response
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    #[serde(default)]
    info: String,
}

impl QueryResponse {
    /// Pages of a successful response, or the API error
    fn into_pages(self) -> Result<Vec<Page>> {
        if let Some(err) = self.error {
            return Err(Error::Encyclopedia(format!("{}: {}", err.code, err.info)));
        }
        Ok(self.query.map(|q| q.pages).unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct QueryPages {
    #[serde(default)]
    pages: Vec<Page>,
}

#[derive(Debug, Deserialize)]
struct Page {
    title: String,
    /// Search rank of the page
    #[serde(default)]
    index: u32,
    #[serde(default)]
    extract: Option<String>,
}

impl WikipediaClient {
    /// Create a new Wikipedia client
    pub fn new(config: &EncyclopediaConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            top_k_results: config.top_k_results.max(1),
            max_summary_chars: config.max_summary_chars,
        })
    }

    /// Render pages as `Page: ..\nSummary: ..` blocks in search order
    fn compose(&self, mut pages: Vec<Page>) -> EncyclopediaLookup {
        pages.sort_by_key(|p| p.index);

        let mut titles = Vec::new();
        let mut blocks = Vec::new();
        for page in pages.into_iter().take(self.top_k_results) {
            let extract = match page.extract.as_deref().map(str::trim) {
                Some(text) if !text.is_empty() => text.to_string(),
                _ => continue,
            };
            blocks.push(format!("Page: {}\nSummary: {}", page.title, extract));
            titles.push(page.title);
        }

        if blocks.is_empty() {
            return EncyclopediaLookup::not_found();
        }

        let summary = truncate_chars(&blocks.join("\n\n"), self.max_summary_chars);
        EncyclopediaLookup {
            summary: Some(summary),
            titles,
        }
    }
}

/// Truncate to at most `max` characters
fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((cut, _)) => text[..cut].to_string(),
        None => text.to_string(),
    }
}

#[async_trait]
impl EncyclopediaProvider for WikipediaClient {
    async fn lookup(&self, question: &str) -> Result<EncyclopediaLookup> {
        let limit = self.top_k_results.to_string();
        let search = truncate_chars(question, MAX_QUERY_CHARS);
        let response = self
            .client
            .get(&self.api_url)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("formatversion", "2"),
                ("generator", "search"),
                ("gsrsearch", search.as_str()),
                ("gsrlimit", limit.as_str()),
                ("prop", "extracts"),
                ("exintro", "1"),
                ("explaintext", "1"),
                ("exlimit", "max"),
            ])
            .send()
            .await
            .map_err(|e| Error::Encyclopedia(format!("Wikipedia request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Encyclopedia(format!("Wikipedia HTTP {} - {}", status, body)));
        }

        let parsed: QueryResponse = response
            .json()
            .await
            .map_err(|e| Error::Encyclopedia(format!("Failed to parse Wikipedia response: {}", e)))?;

        let pages = parsed.into_pages()?;
        tracing::debug!("Wikipedia returned {} pages", pages.len());

        Ok(self.compose(pages))
    }

    fn name(&self) -> &str {
        "wikipedia"
    }
}
