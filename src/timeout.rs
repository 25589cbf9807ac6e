//! Per-provider deadline enforcement.
//!
//! The guard races an operation against a timer. When the timer wins, the
//! operation future is dropped, which cancels whatever it was awaiting (for the
//! HTTP adapters, the in-flight request and its response body). Callers only
//! ever observe the typed [`ProviderError::Timeout`]; a late result from the
//! provider is never delivered.

use std::future::Future;
use std::time::Duration;

use crate::ProviderError;

/// Run `operation`, failing with `Timeout(label, timeout)` if it does not settle in time.
pub async fn with_timeout<T, F>(operation: F, timeout: Duration, label: &str) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::timeout(label, timeout)),
    }
}
