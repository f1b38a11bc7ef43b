//! Question routing and orchestration

mod classifier;
mod graph;

pub use classifier::{QueryRouter, ROUTING_POLICY};
pub use graph::{Orchestrator, RouteRun, RouteState};
