//! HTTP routes for the router server

pub mod query;

use axum::{
    routing::{get, post},
    Json, Router,
};

use crate::server::state::AppState;

/// Landing message
pub const WELCOME: &str = "Welcome to the Multi-Agent RAG System!\n\n\
This application routes your questions to the most suitable data source:\n\
- Questions about AI agents, prompt engineering, or adversarial attacks search a specialized vector index.\n\
- Broader or factual questions may pull results from Wikipedia.\n\
- Trending or recent information comes from Google search via SerpApi.\n\n\
Post your question to `/route_question?question=...` and the system will do the rest!";

/// Build all routes
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(welcome))
        .route("/route_question", post(query::route_question))
        .route("/route_question/", post(query::route_question))
        .route("/api/info", get(info))
}

/// GET / - landing message
pub async fn welcome() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "message": WELCOME }))
}

/// API info endpoint
async fn info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "rag-router",
        "version": env!("CARGO_PKG_VERSION"),
        "description": "Routes questions to a vector index, Wikipedia, or web search",
        "endpoints": {
            "GET /": "Welcome message",
            "POST /route_question?question=...": "Route a question and return retrieved documents",
            "GET /health": "Health check",
        }
    }))
}
