//! Question routing endpoint

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::Result;
use crate::server::state::AppState;

/// Query string of `POST /route_question`
#[derive(Debug, Deserialize)]
pub struct RouteParams {
    pub question: String,
}

/// Output of one visited graph node
#[derive(Debug, Serialize)]
pub struct NodeOutput {
    /// Node name (`retrieve`, `wiki_search` or `google_search`)
    pub node: &'static str,
    pub documents: Vec<String>,
}

/// POST /route_question?question=... - route and retrieve
pub async fn route_question(
    State(state): State<AppState>,
    Query(params): Query<RouteParams>,
) -> Result<Json<Vec<NodeOutput>>> {
    let start = Instant::now();
    tracing::info!("Question: \"{}\"", params.question);

    let run = state.orchestrator().run(&params.question).await?;

    // Only branch states produce documents
    let nodes: Vec<NodeOutput> = run
        .trace
        .iter()
        .filter_map(|s| s.decision())
        .map(|decision| NodeOutput {
            node: decision.node_name(),
            documents: run.result.documents.clone(),
        })
        .collect();

    tracing::info!(
        "Answered via {} in {}ms",
        run.result.branch,
        start.elapsed().as_millis()
    );
    Ok(Json(nodes))
}
