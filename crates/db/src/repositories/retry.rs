//! Optimistic-concurrency retry loop.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use kasa_core::LedgerError;

use crate::error::StoreError;

/// Backoff multiplier cap, so the wait stops growing after a few rounds.
const MAX_BACKOFF_STEPS: u64 = 8;

/// Runs `attempt` until it commits, retrying on store conflicts.
///
/// Each attempt must re-read everything it writes. At most `max_retries`
/// retries follow the first attempt; after that the caller gets
/// `CONCURRENT_UPDATE_CONFLICT`. Non-conflict errors return immediately.
pub(crate) async fn with_optimistic_retry<T, F, Fut>(
    operation: &'static str,
    max_retries: u32,
    backoff_ms: u64,
    mut attempt: F,
) -> Result<T, LedgerError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, StoreError>>,
{
    let mut attempts: u32 = 0;
    loop {
        attempts += 1;
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_conflict() => {
                if attempts > max_retries {
                    warn!(operation, attempts, "Giving up after repeated conflicts");
                    return Err(LedgerError::ConcurrentUpdateConflict { attempts });
                }
                warn!(operation, attempt = attempts, error = %err, "Write conflict, retrying");
                tokio::time::sleep(backoff(backoff_ms, attempts)).await;
            }
            Err(err) => return Err(err.into()),
        }
    }
}

fn backoff(base_ms: u64, attempt: u32) -> Duration {
    let steps = u64::from(attempt).min(MAX_BACKOFF_STEPS);
    let jitter = rand::rng().random_range(0..=base_ms);
    Duration::from_millis(base_ms.saturating_mul(steps).saturating_add(jitter))
}
