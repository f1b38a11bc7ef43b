//! Document, chunk and index entry types

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;

/// A fetched source document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    /// Source identifier (URL or query)
    pub source: String,
    /// Full extracted text
    pub content: String,
    /// Content hash (sha256 hex) of `content`
    pub content_hash: String,
    /// Fetch timestamp
    pub fetched_at: chrono::DateTime<chrono::Utc>,
    /// Source metadata (title, description, language, ...)
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
}

impl RawDocument {
    /// Create a new document from its source and text
    pub fn new(source: impl Into<String>, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            source: source.into(),
            content_hash: hash_content(&content),
            content,
            fetched_at: chrono::Utc::now(),
            metadata: HashMap::new(),
        }
    }

    /// Attach a metadata value
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Document title, if the loader found one
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").and_then(|v| v.as_str())
    }
}

/// A contiguous slice of a document's text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    /// Stable chunk ID derived from source and position
    pub id: String,
    /// Originating document source
    pub source: String,
    /// Text content (exact substring of the document)
    pub content: String,
    /// Byte range in the originating document
    pub char_start: usize,
    pub char_end: usize,
    /// Chunk index within the document
    pub chunk_index: u32,
}

impl Chunk {
    /// Create a new chunk; the ID is derived from `source` and `chunk_index`
    pub fn new(
        source: impl Into<String>,
        content: String,
        char_start: usize,
        char_end: usize,
        chunk_index: u32,
    ) -> Self {
        let source = source.into();
        Self {
            id: Self::entry_id(&source, chunk_index),
            source,
            content,
            char_start,
            char_end,
            chunk_index,
        }
    }

    /// Deterministic index key for a chunk position in a source
    pub fn entry_id(source: &str, chunk_index: u32) -> String {
        let mut hasher = Sha256::new();
        hasher.update(source.as_bytes());
        hasher.update(b"#");
        hasher.update(chunk_index.to_be_bytes());
        hex::encode(hasher.finalize())
    }
}

/// A chunk with its embedding, as persisted in the index
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Index key
    pub id: String,
    /// The indexed chunk
    pub chunk: Chunk,
    /// Embedding vector
    pub embedding: Vec<f32>,
}

impl IndexEntry {
    /// Pair a chunk with its embedding
    pub fn new(chunk: Chunk, embedding: Vec<f32>) -> Self {
        Self {
            id: chunk.id.clone(),
            chunk,
            embedding,
        }
    }

    pub fn dimensions(&self) -> usize {
        self.embedding.len()
    }
}

/// An index hit with its distance to the query (lower is closer)
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    /// The matched chunk
    pub chunk: Chunk,
    /// Cosine distance (0.0 identical, 2.0 opposite)
    pub distance: f32,
}

/// Hash content for change detection
pub fn hash_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}
