//! Classification provider trait for routing decisions

use async_trait::async_trait;
use crate::error::Result;

/// Trait for the structured routing call
///
/// The model is constrained to the `RouteQuery` schema; the returned value is
/// the raw `datasource` label. The caller validates it, providers must not
/// substitute a default.
///
/// Implementations:
/// - `OpenAiClient`: chat completion with a strict JSON-schema response format
#[async_trait]
pub trait ClassificationProvider: Send + Sync {
    /// Classify `question` under the `policy` system prompt
    async fn classify(&self, policy: &str, question: &str) -> Result<String>;

    /// Get provider name for logging
    fn name(&self) -> &str;

    /// Get the model being used
    fn model(&self) -> &str;
}
