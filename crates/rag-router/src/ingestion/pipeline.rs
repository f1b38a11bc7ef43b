//! Ingestion pipeline orchestration: fetch, chunk, embed, index

use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::config::RouterConfig;
use crate::error::{Error, Result};
use crate::providers::{DocumentLoader, EmbeddingProvider, VectorStoreProvider};
use crate::timeout::with_timeout;
use crate::types::{Chunk, IndexEntry, RawDocument};

use super::chunker::TextChunker;

/// A source that could not be fetched
#[derive(Debug, Clone, Serialize)]
pub struct SkippedSource {
    pub source: String,
    pub reason: String,
}

/// Outcome of one ingestion run
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    /// Sources fetched successfully
    pub sources_loaded: usize,
    /// Sources skipped after a fetch failure
    pub skipped: Vec<SkippedSource>,
    /// Documents produced by the loaded sources
    pub documents: usize,
    /// Chunks produced from those documents
    pub chunks: usize,
    /// Index entries written (inserted or replaced)
    pub entries_written: usize,
    /// Wall time in milliseconds
    pub elapsed_ms: u64,
}

/// Budgets for the calls made during ingestion
#[derive(Debug, Clone, Copy)]
struct Budgets {
    fetch: Duration,
    embed: Duration,
    index: Duration,
}

/// Main ingestion pipeline
pub struct IngestPipeline {
    loader: Arc<dyn DocumentLoader>,
    chunker: TextChunker,
    embedder: Arc<dyn EmbeddingProvider>,
    store: Arc<dyn VectorStoreProvider>,
    batch_size: usize,
    budgets: Budgets,
}

impl IngestPipeline {
    /// Create a new ingestion pipeline
    pub fn new(
        loader: Arc<dyn DocumentLoader>,
        chunker: TextChunker,
        embedder: Arc<dyn EmbeddingProvider>,
        store: Arc<dyn VectorStoreProvider>,
    ) -> Self {
        Self {
            loader,
            chunker,
            embedder,
            store,
            batch_size: 64,
            budgets: Budgets {
                fetch: Duration::from_secs(30),
                embed: Duration::from_secs(30),
                index: Duration::from_secs(10),
            },
        }
    }

    /// Take batch size and time budgets from the configuration
    pub fn configure(mut self, config: &RouterConfig) -> Self {
        self.batch_size = config.embeddings.batch_size.max(1);
        self.budgets = Budgets {
            fetch: config.timeouts.fetch(),
            embed: config.timeouts.embedding(),
            index: config.timeouts.index(),
        };
        self
    }

    /// Ingest `sources` in order.
    ///
    /// A source that fails to load is logged and skipped. Embedding and index
    /// failures abort the run.
    pub async fn ingest(&self, sources: &[String]) -> Result<IngestReport> {
        let start = Instant::now();
        let mut report = IngestReport::default();

        tracing::info!("Ingesting {} sources with {}", sources.len(), self.loader.name());
        let documents = self.load_all(sources, &mut report).await;
        report.documents = documents.len();

        let chunks = self.chunk_all(&documents);
        report.chunks = chunks.len();
        tracing::info!(
            "Split {} documents into {} chunks (budget {} tokens)",
            report.documents,
            report.chunks,
            self.chunker.chunk_size()
        );

        for batch in chunks.chunks(self.batch_size) {
            report.entries_written += self.index_batch(batch).await?;
        }

        report.elapsed_ms = start.elapsed().as_millis() as u64;
        tracing::info!(
            "Ingestion complete: {} sources loaded, {} skipped, {} entries written in {}ms",
            report.sources_loaded,
            report.skipped.len(),
            report.entries_written,
            report.elapsed_ms
        );
        Ok(report)
    }

    async fn load_all(&self, sources: &[String], report: &mut IngestReport) -> Vec<RawDocument> {
        let mut documents = Vec::new();
        for source in sources {
            match with_timeout("fetch", self.budgets.fetch, self.loader.load(source)).await {
                Ok(docs) => {
                    tracing::debug!("Loaded {} documents from {}", docs.len(), source);
                    report.sources_loaded += 1;
                    documents.extend(docs);
                }
                Err(e) => {
                    tracing::warn!("Skipping source {}: {}", source, e);
                    report.skipped.push(SkippedSource {
                        source: source.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }
        documents
    }

    /// Chunk every document, numbering chunks per source so a source that
    /// yields several documents gets one contiguous index range
    fn chunk_all(&self, documents: &[RawDocument]) -> Vec<Chunk> {
        let mut next_index: HashMap<&str, u32> = HashMap::new();
        let mut chunks = Vec::new();
        for doc in documents {
            let next = next_index.entry(doc.source.as_str()).or_insert(0);
            let doc_chunks = self.chunker.chunk_from(&doc.source, &doc.content, *next);
            *next += doc_chunks.len() as u32;
            chunks.extend(doc_chunks);
        }
        chunks
    }

    async fn index_batch(&self, batch: &[Chunk]) -> Result<usize> {
        let texts: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
        let embeddings = with_timeout("embedding", self.budgets.embed, self.embedder.embed_batch(&texts)).await?;

        if embeddings.len() != batch.len() {
            return Err(Error::embedding(format!(
                "{} returned {} embeddings for {} chunks",
                self.embedder.name(),
                embeddings.len(),
                batch.len()
            )));
        }

        let entries: Vec<IndexEntry> = batch
            .iter()
            .cloned()
            .zip(embeddings)
            .map(|(chunk, embedding)| IndexEntry::new(chunk, embedding))
            .collect();

        let written = with_timeout("index upsert", self.budgets.index, self.store.upsert(&entries)).await?;
        tracing::debug!("Indexed {} entries into {}", written, self.store.name());
        Ok(written)
    }
}
