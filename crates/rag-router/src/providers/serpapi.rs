//! SerpApi web search provider

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::config::WebSearchConfig;
use crate::error::{Error, Result};

use super::web_search::{SearchResponse, WebSearchProvider};

/// SerpApi client (Google engine by default)
pub struct SerpApiClient {
    client: Client,
    endpoint: String,
    engine: String,
}

impl SerpApiClient {
    /// Create a new SerpApi client
    pub fn new(config: &WebSearchConfig, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            engine: config.engine.clone(),
        })
    }
}

#[async_trait]
impl WebSearchProvider for SerpApiClient {
    async fn search(&self, question: &str, api_key: &str) -> Result<SearchResponse> {
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("q", question), ("api_key", api_key), ("engine", self.engine.as_str())])
            .send()
            .await
            .map_err(|e| Error::WebSearch(format!("SerpApi request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::WebSearch(format!("HTTP {} - {}", status, body)));
        }

        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| Error::WebSearch(format!("Failed to parse SerpApi response: {}", e)))
    }

    fn name(&self) -> &str {
        "serpapi"
    }
}
