//! Routing classifier: one structured call per question

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::providers::ClassificationProvider;
use crate::timeout::with_timeout;
use crate::types::RouteDecision;

/// System prompt for the routing call
pub const ROUTING_POLICY: &str = "You are an expert at routing a user question to a vectorstore, \
wikipedia or Google search.\n\
The vectorstore contains documents related to agents, prompt engineering, and adversarial attacks \
on large language models.\n\
Use the vectorstore for questions on these topics. Otherwise, use wiki_search for broad or \
factual questions and google_search for trending or recent information.";

/// Maps a question to exactly one [`RouteDecision`]
pub struct QueryRouter {
    provider: Arc<dyn ClassificationProvider>,
    policy: String,
    timeout: Duration,
}

impl QueryRouter {
    pub fn new(provider: Arc<dyn ClassificationProvider>) -> Self {
        Self {
            provider,
            policy: ROUTING_POLICY.to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    /// Replace the routing policy prompt
    pub fn with_policy(mut self, policy: impl Into<String>) -> Self {
        self.policy = policy.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Classify `question`. A label outside the enumeration is a
    /// classification error; there is no fallback branch and no retry.
    pub async fn route(&self, question: &str) -> Result<RouteDecision> {
        let label = with_timeout(
            "routing classification",
            self.timeout,
            self.provider.classify(&self.policy, question),
        )
        .await?;

        let decision: RouteDecision = label.parse()?;
        tracing::info!(
            "Routed question to {} ({} via {})",
            decision,
            self.provider.name(),
            self.provider.model()
        );
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use async_trait::async_trait;
    use parking_lot::Mutex;

    struct Scripted {
        label: &'static str,
        seen: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ClassificationProvider for Scripted {
        async fn classify(&self, policy: &str, question: &str) -> Result<String> {
            self.seen.lock().push((policy.to_string(), question.to_string()));
            Ok(self.label.to_string())
        }

        fn name(&self) -> &str {
            "scripted"
        }

        fn model(&self) -> &str {
            "none"
        }
    }

    fn scripted(label: &'static str) -> Arc<Scripted> {
        Arc::new(Scripted {
            label,
            seen: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_route_passes_policy_and_question() {
        let provider = scripted("wiki_search");
        let router = QueryRouter::new(provider.clone());

        let decision = router.route("Who was Ada Lovelace?").await.unwrap();
        assert_eq!(decision, RouteDecision::Encyclopedia);

        let seen = provider.seen.lock();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, ROUTING_POLICY);
        assert_eq!(seen[0].1, "Who was Ada Lovelace?");
    }

    #[tokio::test]
    async fn test_unknown_label_is_not_retried() {
        let provider = scripted("bing_search");
        let router = QueryRouter::new(provider.clone());

        let err = router.route("anything").await.unwrap_err();
        assert!(matches!(err, Error::Classification(_)));
        assert_eq!(provider.seen.lock().len(), 1);
    }

    #[test]
    fn test_policy_names_every_label() {
        for label in RouteDecision::classifier_labels() {
            assert!(ROUTING_POLICY.contains(label), "policy does not mention {}", label);
        }
    }
}
