//! Orchestration state machine
//!
//! `START -> ROUTING -> {SIMILARITY | ENCYCLOPEDIA | WEB} -> END`. Each run
//! visits exactly one branch and keeps no state between runs.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::config::RouterConfig;
use crate::error::{Error, Result};
use crate::providers::Capabilities;
use crate::retrieval::{EncyclopediaRetriever, SimilarityRetriever, WebRetriever};
use crate::types::{RetrievalResult, RouteDecision};

use super::classifier::QueryRouter;

/// States of one orchestration run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RouteState {
    Start,
    Routing,
    Similarity,
    Encyclopedia,
    Web,
    End,
}

impl RouteState {
    /// Branch state for a routing decision
    pub fn branch(decision: RouteDecision) -> Self {
        match decision {
            RouteDecision::Similarity => Self::Similarity,
            RouteDecision::Encyclopedia => Self::Encyclopedia,
            RouteDecision::Web => Self::Web,
        }
    }

    /// Next state. `ROUTING` needs the decision, every other state ignores it.
    pub fn advance(self, decision: Option<RouteDecision>) -> Result<Self> {
        match (self, decision) {
            (Self::Start, _) => Ok(Self::Routing),
            (Self::Routing, Some(decision)) => Ok(Self::branch(decision)),
            (Self::Routing, None) => Err(Error::internal("ROUTING requires a decision")),
            (Self::Similarity | Self::Encyclopedia | Self::Web, _) => Ok(Self::End),
            (Self::End, _) => Err(Error::internal("END is terminal")),
        }
    }

    /// The decision a branch state executes
    pub fn decision(&self) -> Option<RouteDecision> {
        match self {
            Self::Similarity => Some(RouteDecision::Similarity),
            Self::Encyclopedia => Some(RouteDecision::Encyclopedia),
            Self::Web => Some(RouteDecision::Web),
            _ => None,
        }
    }
}

impl fmt::Display for RouteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "START",
            Self::Routing => "ROUTING",
            Self::Similarity => "SIMILARITY",
            Self::Encyclopedia => "ENCYCLOPEDIA",
            Self::Web => "WEB",
            Self::End => "END",
        };
        f.write_str(name)
    }
}

/// A completed run: the result and the states visited
#[derive(Debug, Clone, Serialize)]
pub struct RouteRun {
    pub result: RetrievalResult,
    pub trace: Vec<RouteState>,
}

/// Routes a question and runs the selected branch
pub struct Orchestrator {
    router: QueryRouter,
    similarity: SimilarityRetriever,
    encyclopedia: EncyclopediaRetriever,
    web: WebRetriever,
}

impl Orchestrator {
    pub fn new(
        router: QueryRouter,
        similarity: SimilarityRetriever,
        encyclopedia: EncyclopediaRetriever,
        web: WebRetriever,
    ) -> Self {
        Self {
            router,
            similarity,
            encyclopedia,
            web,
        }
    }

    /// Wire the classifier and the three branches from shared capabilities
    pub fn from_config(config: &RouterConfig, capabilities: &Capabilities) -> Self {
        let t = &config.timeouts;
        Self::new(
            QueryRouter::new(Arc::clone(&capabilities.classifier)).with_timeout(t.classifier()),
            SimilarityRetriever::new(
                Arc::clone(&capabilities.embedder),
                Arc::clone(&capabilities.store),
                config.retrieval.top_k,
            )
            .with_timeouts(t.embedding(), t.index()),
            EncyclopediaRetriever::new(Arc::clone(&capabilities.encyclopedia))
                .with_timeout(t.encyclopedia()),
            WebRetriever::new(Arc::clone(&capabilities.web_search), config.web_search.api_key.clone())
                .with_timeout(t.web_search()),
        )
    }

    /// Route `question` and return the documents of the chosen branch
    pub async fn route(&self, question: &str) -> Result<RetrievalResult> {
        Ok(self.run(question).await?.result)
    }

    /// Like [`route`](Self::route), also returning the visited states
    pub async fn run(&self, question: &str) -> Result<RouteRun> {
        let mut trace = vec![RouteState::Start];
        let mut state = RouteState::Start.advance(None)?;
        trace.push(state);

        let decision = self.router.route(question).await?;
        state = state.advance(Some(decision))?;
        trace.push(state);

        let documents = match decision {
            RouteDecision::Similarity => self.similarity.retrieve(question).await?,
            RouteDecision::Encyclopedia => self.encyclopedia.retrieve(question).await?,
            RouteDecision::Web => self.web.retrieve(question).await?,
        };
        tracing::info!("{} branch returned {} documents", decision, documents.len());

        state = state.advance(None)?;
        trace.push(state);

        Ok(RouteRun {
            result: RetrievalResult::new(question, documents, decision),
            trace,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transitions() {
        let routing = RouteState::Start.advance(None).unwrap();
        assert_eq!(routing, RouteState::Routing);

        for decision in RouteDecision::ALL {
            let branch = routing.advance(Some(decision)).unwrap();
            assert_eq!(branch.decision(), Some(decision));
            assert_eq!(branch.advance(None).unwrap(), RouteState::End);
        }
    }

    #[test]
    fn test_no_reentry() {
        assert!(RouteState::End.advance(None).is_err());
        assert!(RouteState::Routing.advance(None).is_err());
        assert_eq!(RouteState::Start.decision(), None);
    }

    #[test]
    fn test_state_names() {
        assert_eq!(RouteState::Encyclopedia.to_string(), "ENCYCLOPEDIA");
        assert_eq!(serde_json::to_value(RouteState::Start).unwrap(), "START");
    }
}
