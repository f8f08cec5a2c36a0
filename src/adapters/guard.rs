//! Failure boundary around external calls.

use super::provider::{AdapterError, AdapterResult};
use crate::metrics;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

/// Run an adapter call with its own timeout.
///
/// Errors and timeouts are logged with the subject they concern, counted, and
/// turned into `None`: a failed signal contributes nothing and never aborts
/// the caller.
pub async fn guarded<T, F>(
    adapter: &'static str,
    operation: &str,
    subject: &str,
    timeout: Duration,
    call: F,
) -> Option<T>
where
    F: Future<Output = AdapterResult<T>>,
{
    let outcome = match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(AdapterError::Timeout(timeout)),
    };

    match outcome {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("{} {} failed for {}: {}", adapter, operation, subject, e);
            metrics::record_adapter_failure(adapter, e.kind());
            None
        }
    }
}
