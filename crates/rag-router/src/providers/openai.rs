//! OpenAI client for embeddings and structured route classification
//!
//! One client serves both capabilities so ingestion and retrieval share the
//! same embedding model.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::sleep;

use crate::config::{EmbeddingConfig, LlmConfig};
use crate::error::{Error, Result};
use crate::types::RouteQuery;

use super::classifier::ClassificationProvider;
use super::embedding::EmbeddingProvider;

/// OpenAI API client
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    chat_model: String,
    embed_model: String,
    dimensions: usize,
    batch_size: usize,
    max_retries: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    index: usize,
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct Message<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: &'static str,
    strict: bool,
    schema: serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ChatMessage {
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

/// Route output as returned on the wire; the label is validated by the caller
#[derive(Deserialize)]
struct RawRouteQuery {
    datasource: String,
}

impl OpenAiClient {
    /// Create a client. Fails with a configuration error when no API key is set.
    pub fn new(llm: &LlmConfig, embeddings: &EmbeddingConfig, timeout: Duration) -> Result<Self> {
        let api_key = llm
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .ok_or_else(|| Error::config("OPENAI_API_KEY not set"))?
            .to_string();

        let client = Client::builder()
            .timeout(timeout)
            .pool_max_idle_per_host(5)
            .build()
            .map_err(|e| Error::config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: llm.base_url.trim_end_matches('/').to_string(),
            api_key,
            chat_model: llm.chat_model.clone(),
            embed_model: embeddings.model.clone(),
            dimensions: embeddings.dimensions,
            batch_size: embeddings.batch_size.max(1),
            max_retries: embeddings.max_retries,
            temperature: llm.temperature,
        })
    }

    /// Retry a request with exponential backoff while its failures are
    /// transient
    async fn retry_request<F, Fut, T>(&self, operation: F) -> Result<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = std::result::Result<T, RequestFailure>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(failure) if failure.retryable && attempt < self.max_retries => {
                    let delay = backoff(attempt);
                    tracing::warn!(
                        "{} (attempt {}/{}), retrying in {:?}",
                        failure.error,
                        attempt + 1,
                        self.max_retries + 1,
                        delay
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(failure) => return Err(failure.error),
            }
        }
    }

    async fn embed_request(&self, texts: &[String]) -> std::result::Result<Vec<Vec<f32>>, RequestFailure> {
        let url = format!("{}/embeddings", self.base_url);
        let request = EmbedRequest {
            model: &self.embed_model,
            input: texts,
        };

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| RequestFailure {
                error: Error::embedding(format!("Embedding request failed: {}", e)),
                retryable: true,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RequestFailure {
                error: Error::embedding(format!("Embedding failed: HTTP {} - {}", status, body)),
                retryable: is_retryable_status(status),
            });
        }

        let parsed: EmbedResponse = response.json().await.map_err(|e| {
            RequestFailure::fatal(Error::embedding(format!("Failed to parse embedding response: {}", e)))
        })?;

        order_embeddings(parsed.data, texts.len()).map_err(RequestFailure::fatal)
    }
}

/// A failed request attempt and whether repeating it could succeed
struct RequestFailure {
    error: Error,
    retryable: bool,
}

impl RequestFailure {
    fn fatal(error: Error) -> Self {
        Self {
            error,
            retryable: false,
        }
    }
}

/// Rate limiting and server errors; other client errors fail the same way again
fn is_retryable_status(status: StatusCode) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error()
}

/// Delay before retry `attempt` (0-based): 500ms doubling, capped at 32s
fn backoff(attempt: u32) -> Duration {
    Duration::from_millis(500 * 2u64.pow(attempt.min(6)))
}

/// Restore input order and check the response covers every input
fn order_embeddings(mut data: Vec<EmbedData>, expected: usize) -> Result<Vec<Vec<f32>>> {
    data.sort_by_key(|d| d.index);
    if data.len() != expected {
        return Err(Error::embedding(format!(
            "OpenAI returned {} embeddings for {} inputs",
            data.len(),
            expected
        )));
    }
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

/// JSON schema for `T` in the form OpenAI strict mode accepts:
/// every object closed with `additionalProperties: false`, every property
/// required, and all `$ref`s inlined.
pub fn strict_schema<T: JsonSchema>() -> serde_json::Value {
    let mut value = serde_json::to_value(schema_for!(T)).unwrap_or_default();

    let definitions = value.get("definitions").cloned();
    if let Some(defs) = definitions {
        inline_refs(&mut value, &defs);
    }
    close_objects(&mut value);

    if let serde_json::Value::Object(map) = &mut value {
        map.remove("definitions");
        map.remove("$schema");
    }
    value
}

fn close_objects(value: &mut serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            if map.get("type").and_then(|t| t.as_str()) == Some("object") {
                map.insert("additionalProperties".to_string(), serde_json::Value::Bool(false));
                if let Some(serde_json::Value::Object(props)) = map.get("properties") {
                    let keys = props.keys().cloned().map(serde_json::Value::String).collect();
                    map.insert("required".to_string(), serde_json::Value::Array(keys));
                }
            }
            for (_, v) in map.iter_mut() {
                close_objects(v);
            }
        }
        serde_json::Value::Array(items) => items.iter_mut().for_each(close_objects),
        _ => {}
    }
}

fn inline_refs(value: &mut serde_json::Value, definitions: &serde_json::Value) {
    match value {
        serde_json::Value::Object(map) => {
            // schemars wraps a described `$ref` as `allOf: [{"$ref": ..}]`
            let single = match map.get("allOf") {
                Some(serde_json::Value::Array(all)) if all.len() == 1 => all[0].as_object().cloned(),
                _ => None,
            };
            if let Some(inner) = single {
                map.remove("allOf");
                for (k, v) in inner {
                    map.entry(k).or_insert(v);
                }
            }

            let target = map
                .get("$ref")
                .and_then(|r| r.as_str())
                .and_then(|r| r.strip_prefix("#/definitions/"))
                .and_then(|name| definitions.get(name))
                .cloned();
            if let Some(def) = target {
                // Keep the field description schemars attaches next to the ref
                let description = map.get("description").cloned();
                *value = def;
                if let (Some(desc), serde_json::Value::Object(m)) = (description, &mut *value) {
                    m.entry("description").or_insert(desc);
                }
                inline_refs(value, definitions);
                return;
            }
            for (_, v) in map.iter_mut() {
                inline_refs(v, definitions);
            }
        }
        serde_json::Value::Array(items) => {
            for item in items.iter_mut() {
                inline_refs(item, definitions);
            }
        }
        _ => {}
    }
}

/// Pull the raw datasource label out of a chat response body
fn parse_route_label(response: ChatResponse) -> Result<String> {
    let message = response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message)
        .ok_or_else(|| Error::classification("No choices in classifier response"))?;

    if let Some(refusal) = message.refusal {
        return Err(Error::classification(format!("Classifier refused: {}", refusal)));
    }

    let content = message
        .content
        .ok_or_else(|| Error::classification("Classifier response has no content"))?;

    let route: RawRouteQuery = serde_json::from_str(&content).map_err(|e| {
        Error::classification(format!("Malformed classifier output '{}': {}", content, e))
    })?;

    Ok(route.datasource)
}

#[async_trait]
impl EmbeddingProvider for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let input = [text.to_string()];
        self.retry_request(|| self.embed_request(&input))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::embedding("No embedding from OpenAI"))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.batch_size) {
            embeddings.extend(self.retry_request(|| self.embed_request(batch)).await?);
        }
        Ok(embeddings)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    fn name(&self) -> &str {
        "openai"
    }
}

#[async_trait]
impl ClassificationProvider for OpenAiClient {
    async fn classify(&self, policy: &str, question: &str) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.chat_model,
            messages: vec![
                Message { role: "system", content: policy },
                Message { role: "user", content: question },
            ],
            temperature: self.temperature,
            response_format: ResponseFormat {
                format_type: "json_schema",
                json_schema: JsonSchemaFormat {
                    name: "RouteQuery",
                    strict: true,
                    schema: strict_schema::<RouteQuery>(),
                },
            },
        };

        // Single shot: routing is never retried
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::classification(format!(
                "Classifier request failed: HTTP {} - {}",
                status, body
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::classification(format!("Failed to parse classifier response: {}", e)))?;

        parse_route_label(parsed)
    }

    fn name(&self) -> &str {
        "openai"
    }

    fn model(&self) -> &str {
        &self.chat_model
    }
}
