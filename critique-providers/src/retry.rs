//! Exponential backoff with jitter around a bounded number of attempts.

use std::future::Future;
use std::time::Duration;

use rand::Rng as _;
use tracing::warn;

use crate::errors::ProviderError;

/// Retries `op` up to `max_retries` additional times (so `max_retries == 0`
/// means "try once, no retry") when the error is retryable. Backoff doubles
/// from `base_delay` each attempt with up to 50% jitter added.
pub async fn with_backoff<T, F, Fut>(max_retries: u32, base_delay: Duration, mut op: F) -> Result<T, ProviderError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProviderError>>,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_retries && err.is_retryable() => {
                let backoff = base_delay.saturating_mul(1 << attempt);
                let jitter_ms = rand::thread_rng().gen_range(0..=backoff.as_millis() as u64 / 2 + 1);
                let delay = backoff + Duration::from_millis(jitter_ms);
                warn!(attempt, ?delay, error = %err, "provider call failed, retrying");
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
