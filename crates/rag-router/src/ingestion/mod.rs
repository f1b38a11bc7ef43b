//! Document ingestion: fetch sources, chunk, embed and index them

mod chunker;
mod pipeline;

pub use chunker::TextChunker;
pub use pipeline::{IngestPipeline, IngestReport, SkippedSource};
