mod common;

use std::sync::Arc;

use common::{CannedLoader, HashEmbedder, Harness, MultiDocLoader, DIMS};
use rag_router::config::DEFAULT_SOURCES;
use rag_router::ingestion::{IngestPipeline, TextChunker};
use rag_router::providers::{LocalVectorStore, VectorStoreProvider};
use rag_router::Error;

fn sources() -> Vec<String> {
    DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn test_ingest_corpus_report() {
    let harness = Harness::routing_to("vectorstore");
    let report = harness.pipeline().ingest(&sources()).await.unwrap();

    assert_eq!(report.sources_loaded, 3);
    assert!(report.skipped.is_empty());
    assert_eq!(report.documents, 3);
    assert_eq!(report.chunks, 3);
    assert_eq!(report.entries_written, 3);
    assert_eq!(harness.capabilities.store.len().await.unwrap(), 3);
    assert_eq!(harness.capabilities.store.dimensions().await.unwrap(), Some(DIMS));
}

#[tokio::test]
async fn test_failed_source_is_skipped() {
    let harness = Harness::routing_to("vectorstore");
    let mut list = sources();
    list.insert(1, "https://example.com/missing".to_string());

    let report = harness.pipeline().ingest(&list).await.unwrap();

    assert_eq!(report.sources_loaded, 3);
    assert_eq!(report.skipped.len(), 1);
    assert_eq!(report.skipped[0].source, "https://example.com/missing");
    assert!(report.skipped[0].reason.contains("404"));
    assert_eq!(report.entries_written, 3);
}

#[tokio::test]
async fn test_reingest_is_idempotent() {
    let harness = Harness::routing_to("vectorstore");
    let pipeline = harness.pipeline();

    pipeline.ingest(&sources()).await.unwrap();
    let report = pipeline.ingest(&sources()).await.unwrap();

    assert_eq!(report.entries_written, 3);
    assert_eq!(harness.capabilities.store.len().await.unwrap(), 3);
}

#[tokio::test]
async fn test_chunks_partition_long_document() {
    let text = "Short-term memory holds the current context. ".repeat(200);
    let loader = CannedLoader::new([("mem://long".to_string(), text.clone())]);
    let store = Arc::new(LocalVectorStore::in_memory().unwrap());
    let chunker = TextChunker::cl100k(100).unwrap();

    let pipeline = IngestPipeline::new(loader, TextChunker::cl100k(100).unwrap(), HashEmbedder::new(DIMS), store.clone());
    let report = pipeline.ingest(&["mem://long".to_string()]).await.unwrap();
    assert!(report.chunks > 1);

    let chunks = chunker.chunk("mem://long", &text);
    assert_eq!(chunks.len(), report.chunks);
    assert_eq!(chunks.iter().map(|c| c.content.as_str()).collect::<String>(), text);
    assert!(chunks.iter().all(|c| chunker.count_tokens(&c.content) <= 100));
    assert_eq!(store.len().await.unwrap(), report.chunks);
}

#[tokio::test]
async fn test_embedding_model_change_is_rejected() {
    let harness = Harness::routing_to("vectorstore");
    harness.ingest_corpus().await;

    let pipeline = IngestPipeline::new(
        harness.capabilities.loader.clone(),
        TextChunker::cl100k(500).unwrap(),
        HashEmbedder::new(DIMS + 1),
        harness.capabilities.store.clone(),
    );
    let err = pipeline.ingest(&sources()).await.unwrap_err();
    assert!(matches!(err, Error::DimensionMismatch { expected: DIMS, actual } if actual == DIMS + 1));
}

#[tokio::test]
async fn test_persistent_index_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("index.redb");

    {
        let store = Arc::new(LocalVectorStore::open(&path).unwrap());
        let pipeline = IngestPipeline::new(
            CannedLoader::new(common::corpus()),
            TextChunker::cl100k(500).unwrap(),
            HashEmbedder::new(DIMS),
            store,
        );
        pipeline.ingest(&sources()).await.unwrap();
    }

    let store = LocalVectorStore::open(&path).unwrap();
    assert_eq!(store.len().await.unwrap(), 3);
}

#[tokio::test]
async fn test_documents_sharing_a_source_keep_distinct_chunks() {
    let loader = MultiDocLoader::new(&[
        "Page one covers task decomposition.",
        "Page two covers self reflection.",
    ]);
    let store = Arc::new(LocalVectorStore::in_memory().unwrap());
    let pipeline = IngestPipeline::new(loader, TextChunker::cl100k(500).unwrap(), HashEmbedder::new(DIMS), store.clone());

    let report = pipeline.ingest(&["mem://paged".to_string()]).await.unwrap();

    assert_eq!(report.documents, 2);
    assert_eq!(report.chunks, 2);
    assert_eq!(report.entries_written, 2);
    assert_eq!(store.len().await.unwrap(), 2);

    let again = pipeline.ingest(&["mem://paged".to_string()]).await.unwrap();
    assert_eq!(again.entries_written, 2);
    assert_eq!(store.len().await.unwrap(), 2);
}
