//! Route decisions and retrieval results

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Retrieval strategy chosen for a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteDecision {
    /// Nearest-neighbour search over the ingested corpus
    Similarity,
    /// Wikipedia summary lookup
    Encyclopedia,
    /// Live web search
    Web,
}

impl RouteDecision {
    pub const ALL: [RouteDecision; 3] = [Self::Similarity, Self::Encyclopedia, Self::Web];

    /// Label the classifier is constrained to emit for this decision
    pub fn classifier_label(&self) -> &'static str {
        match self {
            Self::Similarity => "vectorstore",
            Self::Encyclopedia => "wiki_search",
            Self::Web => "google_search",
        }
    }

    /// Node name reported in the orchestration trace
    pub fn node_name(&self) -> &'static str {
        match self {
            Self::Similarity => "retrieve",
            Self::Encyclopedia => "wiki_search",
            Self::Web => "google_search",
        }
    }

    /// All classifier labels, in declaration order
    pub fn classifier_labels() -> Vec<&'static str> {
        Self::ALL.iter().map(|d| d.classifier_label()).collect()
    }
}

impl fmt::Display for RouteDecision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Similarity => "similarity",
            Self::Encyclopedia => "encyclopedia",
            Self::Web => "web",
        };
        f.write_str(name)
    }
}

impl FromStr for RouteDecision {
    type Err = Error;

    /// Parse a classifier label. Anything outside the enumeration is a classification error.
    fn from_str(label: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|d| d.classifier_label() == label.trim())
            .ok_or_else(|| {
                Error::classification(format!(
                    "unrecognized datasource '{}' (expected one of {:?})",
                    label,
                    Self::classifier_labels()
                ))
            })
    }
}

/// Datasource enumeration presented to the classifier as a JSON schema
#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
pub enum Datasource {
    #[serde(rename = "vectorstore")]
    Vectorstore,
    #[serde(rename = "wiki_search")]
    WikiSearch,
    #[serde(rename = "google_search")]
    GoogleSearch,
}

/// Structured classifier output: route a user query to the most relevant datasource
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RouteQuery {
    /// Given a user question choose to route it to wikipedia, a vectorstore or google search
    pub datasource: Datasource,
}

/// Orchestrator output for one question
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// The original question
    pub question: String,
    /// Retrieved passages, best first
    pub documents: Vec<String>,
    /// Branch that produced the documents
    pub branch: RouteDecision,
}

impl RetrievalResult {
    pub fn new(question: impl Into<String>, documents: Vec<String>, branch: RouteDecision) -> Self {
        Self {
            question: question.into(),
            documents,
            branch,
        }
    }
}
