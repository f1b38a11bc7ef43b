//! Core types for the router

pub mod document;
pub mod route;

pub use document::{Chunk, IndexEntry, RawDocument, ScoredEntry};
pub use route::{RetrievalResult, RouteDecision, RouteQuery};
