//! Time-bounded calls into the revocation store

use std::future::Future;
use std::time::Duration;

use crate::errors::{DomainError, DomainResult};

/// Runs a store operation, failing with `StoreUnavailable` once `timeout` elapses
pub(crate) async fn bounded<T, F>(timeout: Duration, operation: &'static str, call: F) -> DomainResult<T>
where
    F: Future<Output = DomainResult<T>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(DomainError::store(format!(
            "{} timed out after {}ms",
            operation,
            timeout.as_millis()
        ))),
    }
}
