//! rag-router: query routing over a vector index, Wikipedia and web search
//!
//! A classifier picks one retrieval strategy per question (similarity search
//! over an ingested corpus, an encyclopedia lookup, or a live web search) and
//! the chosen branch returns a list of passages. The ingestion pipeline
//! (fetch, chunk, embed, index) populates the similarity corpus ahead of time.

pub mod config;
pub mod error;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod routing;
pub mod server;
pub mod timeout;
pub mod types;

pub use config::RouterConfig;
pub use error::{Error, Result};
pub use providers::Capabilities;
pub use routing::{Orchestrator, RouteState};
pub use types::{Chunk, IndexEntry, RawDocument, RetrievalResult, RouteDecision};
