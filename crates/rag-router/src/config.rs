//! Configuration for the query router

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};

/// Canonical corpus for the similarity index
pub const DEFAULT_SOURCES: [&str; 3] = [
    "https://lilianweng.github.io/posts/2023-06-23-agent/",
    "https://lilianweng.github.io/posts/2023-03-15-prompt-engineering/",
    "https://lilianweng.github.io/posts/2023-10-25-adv-attack-llm/",
];

/// Main router configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RouterConfig {
    /// Server configuration
    pub server: ServerConfig,
    /// Embedding configuration
    pub embeddings: EmbeddingConfig,
    /// Chunking configuration
    pub chunking: ChunkingConfig,
    /// LLM (classifier) configuration
    pub llm: LlmConfig,
    /// Vector index configuration
    pub vector_db: VectorDbConfig,
    /// Similarity retrieval configuration
    pub retrieval: RetrievalConfig,
    /// Encyclopedia (Wikipedia) configuration
    pub encyclopedia: EncyclopediaConfig,
    /// Web search (SerpApi) configuration
    pub web_search: WebSearchConfig,
    /// Ingestion configuration
    pub ingestion: IngestionConfig,
    /// Per-call time budgets
    pub timeouts: TimeoutConfig,
}

impl RouterConfig {
    /// Load configuration: defaults, then an optional TOML file, then environment overrides.
    ///
    /// A `.env` file in the working directory is read first if present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        if let Ok(env_file) = dotenvy::dotenv() {
            tracing::debug!("Loaded environment from {}", env_file.display());
        }

        let mut config = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML configuration file. Missing sections fall back to defaults.
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml_str(&raw)
    }

    /// Parse TOML configuration text
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| Error::config(format!("Invalid TOML configuration: {}", e)))
    }

    /// Overlay credentials and paths from the process environment
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        if let Ok(key) = std::env::var("SERP_API_KEY") {
            self.web_search.api_key = Some(key);
        }
        if let Ok(agent) = std::env::var("WIKIPEDIA_USER_AGENT") {
            self.encyclopedia.user_agent = agent;
        }
        if let Ok(path) = std::env::var("RAG_ROUTER_INDEX_PATH") {
            self.vector_db.storage_path = PathBuf::from(path);
        }
    }

    /// Reject settings that would make the pipeline misbehave
    pub fn validate(&self) -> Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(Error::config("chunking.chunk_size must be greater than zero"));
        }
        if self.chunking.chunk_overlap != 0 {
            return Err(Error::config(
                "chunking.chunk_overlap must be zero: chunks partition the source text",
            ));
        }
        if self.retrieval.top_k == 0 {
            return Err(Error::config("retrieval.top_k must be greater than zero"));
        }
        if self.embeddings.batch_size == 0 {
            return Err(Error::config("embeddings.batch_size must be greater than zero"));
        }
        let t = &self.timeouts;
        if [t.classifier_secs, t.embedding_secs, t.index_secs, t.encyclopedia_secs, t.web_search_secs, t.fetch_secs]
            .contains(&0)
        {
            return Err(Error::config("timeouts must be greater than zero"));
        }
        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Run ingestion over `ingestion.sources` before serving
    pub ingest_on_startup: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            enable_cors: true,
            ingest_on_startup: false,
        }
    }
}

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Embedding model name
    pub model: String,
    /// Embedding dimensions (1536 for ada-002 and text-embedding-3-small)
    pub dimensions: usize,
    /// Texts per embedding request
    pub batch_size: usize,
    /// Retries for failed embedding requests
    pub max_retries: u32,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            model: "text-embedding-ada-002".to_string(),
            dimensions: 1536,
            batch_size: 64,
            max_retries: 2,
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size in cl100k tokens
    pub chunk_size: usize,
    /// Overlap between chunks in tokens (must stay 0)
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 0,
        }
    }
}

/// LLM configuration for the routing classifier (OpenAI-compatible API)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    /// API base URL
    pub base_url: String,
    /// API key (usually from OPENAI_API_KEY)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
    /// Chat model used for classification
    pub chat_model: String,
    /// Temperature for classification
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            api_key: None,
            chat_model: "gpt-4o-mini".to_string(),
            temperature: 0.0,
        }
    }
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VectorDbConfig {
    /// Storage path for the index database
    pub storage_path: PathBuf,
}

impl Default for VectorDbConfig {
    fn default() -> Self {
        let storage_path = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("rag-router")
            .join("index.redb");

        Self { storage_path }
    }
}

/// Similarity retrieval configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of nearest chunks returned
    pub top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { top_k: 4 }
    }
}

/// Wikipedia configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EncyclopediaConfig {
    /// MediaWiki API endpoint
    pub api_url: String,
    /// User agent sent with every request (Wikipedia rejects anonymous clients)
    pub user_agent: String,
    /// Pages folded into one summary
    pub top_k_results: usize,
    /// Summary length cap in characters
    pub max_summary_chars: usize,
}

impl Default for EncyclopediaConfig {
    fn default() -> Self {
        Self {
            api_url: "https://en.wikipedia.org/w/api.php".to_string(),
            user_agent: format!("rag-router/{} (contact@example.com)", env!("CARGO_PKG_VERSION")),
            top_k_results: 3,
            max_summary_chars: 4000,
        }
    }
}

/// Web search configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebSearchConfig {
    /// SerpApi search endpoint
    pub endpoint: String,
    /// Search engine parameter
    pub engine: String,
    /// API key (usually from SERP_API_KEY)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for WebSearchConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://serpapi.com/search".to_string(),
            engine: "google".to_string(),
            api_key: None,
        }
    }
}

/// Ingestion configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Source URLs loaded into the similarity index
    pub sources: Vec<String>,
    /// User agent for page fetches
    pub user_agent: String,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            sources: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
            user_agent: format!("rag-router/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Time budget per external call, in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub classifier_secs: u64,
    pub embedding_secs: u64,
    pub index_secs: u64,
    pub encyclopedia_secs: u64,
    pub web_search_secs: u64,
    /// Page fetch during ingestion
    pub fetch_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            classifier_secs: 30,
            embedding_secs: 30,
            index_secs: 10,
            encyclopedia_secs: 15,
            web_search_secs: 15,
            fetch_secs: 30,
        }
    }
}

impl TimeoutConfig {
    pub fn classifier(&self) -> Duration {
        Duration::from_secs(self.classifier_secs)
    }

    pub fn embedding(&self) -> Duration {
        Duration::from_secs(self.embedding_secs)
    }

    pub fn index(&self) -> Duration {
        Duration::from_secs(self.index_secs)
    }

    pub fn encyclopedia(&self) -> Duration {
        Duration::from_secs(self.encyclopedia_secs)
    }

    pub fn web_search(&self) -> Duration {
        Duration::from_secs(self.web_search_secs)
    }

    pub fn fetch(&self) -> Duration {
        Duration::from_secs(self.fetch_secs)
    }
}
