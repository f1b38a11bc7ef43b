//! Time budgets for external calls

use std::future::Future;
use std::time::Duration;

use crate::error::{Error, Result};

/// Run `call` within `budget`, mapping an elapsed budget to [`Error::Timeout`]
pub async fn with_timeout<T, F>(operation: &str, budget: Duration, call: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(budget, call).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("{} exceeded its {}s budget", operation, budget.as_secs());
            Err(Error::Timeout {
                operation: operation.to_string(),
                secs: budget.as_secs(),
            })
        }
    }
}
