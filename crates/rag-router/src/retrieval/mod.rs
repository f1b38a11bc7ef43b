//! Retrieval branches and the vector index they read from

mod encyclopedia;
mod index;
mod similarity;
mod web;

pub use encyclopedia::{EncyclopediaRetriever, NO_SUMMARY};
pub use index::{cosine_distance, VectorIndex};
pub use similarity::SimilarityRetriever;
pub use web::{extract as extract_web_results, WebRetriever};
