//! In-process fakes for every capability trait

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use rag_router::config::{RouterConfig, DEFAULT_SOURCES};
use rag_router::ingestion::{IngestPipeline, TextChunker};
use rag_router::providers::{
    Capabilities, ClassificationProvider, DocumentLoader, EmbeddingProvider, EncyclopediaLookup,
    EncyclopediaProvider, LocalVectorStore, SearchResponse, WebSearchProvider,
};
use rag_router::{Error, RawDocument, Result};

pub const DIMS: usize = 64;

/// Bag-of-words embedder: each lowercase word is hashed into one of `dims` buckets
pub struct HashEmbedder {
    dims: usize,
    pub calls: AtomicUsize,
}

impl HashEmbedder {
    pub fn new(dims: usize) -> Arc<Self> {
        Arc::new(Self {
            dims,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

fn bucket(word: &str, dims: usize) -> usize {
    // FNV-1a
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in word.bytes() {
        hash ^= byte as u64;
        hash = hash.wrapping_mul(0x100000001b3);
    }
    (hash % dims as u64) as usize
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut vector = vec![0.0f32; self.dims];
        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            vector[bucket(&word.to_lowercase(), self.dims)] += 1.0;
        }
        Ok(vector)
    }

    fn dimensions(&self) -> usize {
        self.dims
    }

    fn name(&self) -> &str {
        "hash"
    }
}

/// Classifier that always answers with the same label
pub struct FixedClassifier {
    label: String,
    pub calls: AtomicUsize,
}

impl FixedClassifier {
    pub fn new(label: &str) -> Arc<Self> {
        Arc::new(Self {
            label: label.to_string(),
            calls: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl ClassificationProvider for FixedClassifier {
    async fn classify(&self, _policy: &str, _question: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.label.clone())
    }

    fn name(&self) -> &str {
        "fixed"
    }

    fn model(&self) -> &str {
        "fixed"
    }
}

/// Loader serving canned page text; unknown sources fail to fetch
pub struct CannedLoader {
    pages: HashMap<String, String>,
}

impl CannedLoader {
    pub fn new(pages: impl IntoIterator<Item = (String, String)>) -> Arc<Self> {
        Arc::new(Self {
            pages: pages.into_iter().collect(),
        })
    }
}

#[async_trait]
impl DocumentLoader for CannedLoader {
    async fn load(&self, source: &str) -> Result<Vec<RawDocument>> {
        self.pages
            .get(source)
            .map(|text| vec![RawDocument::new(source, text.clone())])
            .ok_or_else(|| Error::fetch(source, "HTTP 404 Not Found"))
    }

    fn name(&self) -> &str {
        "canned"
    }
}

/// Loader returning several documents for every source, like a paginated page
pub struct MultiDocLoader {
    parts: Vec<String>,
}

impl MultiDocLoader {
    pub fn new(parts: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            parts: parts.iter().map(|p| p.to_string()).collect(),
        })
    }
}

#[async_trait]
impl DocumentLoader for MultiDocLoader {
    async fn load(&self, source: &str) -> Result<Vec<RawDocument>> {
        Ok(self
            .parts
            .iter()
            .map(|part| RawDocument::new(source, part.clone()))
            .collect())
    }

    fn name(&self) -> &str {
        "multi-doc"
    }
}

/// Encyclopedia returning a fixed lookup, or failing
pub enum FakeEncyclopedia {
    Summary(Option<String>),
    Down,
}

#[async_trait]
impl EncyclopediaProvider for FakeEncyclopedia {
    async fn lookup(&self, _question: &str) -> Result<EncyclopediaLookup> {
        match self {
            Self::Summary(summary) => Ok(EncyclopediaLookup {
                summary: summary.clone(),
                titles: Vec::new(),
            }),
            Self::Down => Err(Error::Encyclopedia("connection refused".into())),
        }
    }

    fn name(&self) -> &str {
        "fake-wiki"
    }
}

/// Web search returning a fixed response, or an HTTP error
pub enum FakeWebSearch {
    Respond(SearchResponse),
    HttpError(u16),
}

#[async_trait]
impl WebSearchProvider for FakeWebSearch {
    async fn search(&self, _question: &str, _api_key: &str) -> Result<SearchResponse> {
        match self {
            Self::Respond(response) => Ok(response.clone()),
            Self::HttpError(status) => Err(Error::WebSearch(format!("HTTP {} - quota exceeded", status))),
        }
    }

    fn name(&self) -> &str {
        "fake-serp"
    }
}

/// Encyclopedia and web search that answer only after `delay`
pub struct SlowBackend {
    pub delay: Duration,
}

#[async_trait]
impl EncyclopediaProvider for SlowBackend {
    async fn lookup(&self, _question: &str) -> Result<EncyclopediaLookup> {
        tokio::time::sleep(self.delay).await;
        Ok(EncyclopediaLookup {
            summary: Some("late".to_string()),
            titles: Vec::new(),
        })
    }

    fn name(&self) -> &str {
        "slow"
    }
}

#[async_trait]
impl WebSearchProvider for SlowBackend {
    async fn search(&self, _question: &str, _api_key: &str) -> Result<SearchResponse> {
        tokio::time::sleep(self.delay).await;
        Ok(SearchResponse::default())
    }

    fn name(&self) -> &str {
        "slow"
    }
}

/// Canned text for the three canonical corpus sources
pub fn corpus() -> Vec<(String, String)> {
    let texts = [
        "LLM Powered Autonomous Agents. An agent system has planning, memory and tool use. \
         Memory comes in several types: sensory memory, short-term memory which is in-context \
         learning, and long-term memory backed by an external vector store with fast retrieval.",
        "Prompt Engineering. Prompt engineering is about steering model behaviour without \
         updating weights. Techniques include few-shot prompting, chain-of-thought and \
         self-consistency sampling.",
        "Adversarial Attacks on LLMs. Jailbreak prompts and adversarial suffixes try to make \
         aligned models produce unsafe content. Token manipulation and gradient based attacks \
         are common.",
    ];
    DEFAULT_SOURCES
        .iter()
        .zip(texts)
        .map(|(source, text)| (source.to_string(), text.to_string()))
        .collect()
}

/// Test harness: capabilities over fakes plus a handle on the embedder
pub struct Harness {
    pub config: RouterConfig,
    pub embedder: Arc<HashEmbedder>,
    pub classifier: Arc<FixedClassifier>,
    pub capabilities: Capabilities,
}

impl Harness {
    pub fn new(label: &str, encyclopedia: FakeEncyclopedia, web: FakeWebSearch) -> Self {
        let mut config = RouterConfig::default();
        config.web_search.api_key = Some("test-key".to_string());

        let embedder = HashEmbedder::new(DIMS);
        let classifier = FixedClassifier::new(label);
        let capabilities = Capabilities {
            embedder: embedder.clone(),
            store: Arc::new(LocalVectorStore::in_memory().unwrap()),
            classifier: classifier.clone(),
            encyclopedia: Arc::new(encyclopedia),
            web_search: Arc::new(web),
            loader: CannedLoader::new(corpus()),
        };

        Self {
            config,
            embedder,
            classifier,
            capabilities,
        }
    }

    /// Harness whose encyclopedia and web fakes are never expected to run
    pub fn routing_to(label: &str) -> Self {
        Self::new(
            label,
            FakeEncyclopedia::Summary(None),
            FakeWebSearch::Respond(SearchResponse::default()),
        )
    }

    pub fn pipeline(&self) -> IngestPipeline {
        IngestPipeline::new(
            self.capabilities.loader.clone(),
            TextChunker::cl100k(self.config.chunking.chunk_size).unwrap(),
            self.capabilities.embedder.clone(),
            self.capabilities.store.clone(),
        )
        .configure(&self.config)
    }

    /// Ingest the canonical corpus
    pub async fn ingest_corpus(&self) {
        let sources: Vec<String> = DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect();
        let report = self.pipeline().ingest(&sources).await.unwrap();
        assert_eq!(report.sources_loaded, 3);
    }
}
