//! Retry policy for page fetches. Source adapters never retry on their own.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

/// Network failures, 429 and 5xx may succeed on a later attempt; anything
/// else fails the same way again.
fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::RateLimited { .. } | ScraperError::Http(_) => true,
        ScraperError::UnexpectedStatus { status, .. } => (500..600).contains(status),
        _ => false,
    }
}

/// Longest server-requested pause honoured between attempts.
const MAX_RETRY_AFTER_SECS: u64 = 30;

/// Delay before retry number `retry` (zero-based) after `err`.
///
/// Exponential in `backoff_base_secs`. A 429 that asks for a longer pause
/// through `Retry-After` gets that pause instead, up to
/// [`MAX_RETRY_AFTER_SECS`].
fn backoff_delay(backoff_base_secs: u64, retry: u32, err: &ScraperError) -> Duration {
    let exponential = backoff_base_secs.saturating_mul(1u64 << retry.min(62));
    let requested = match err {
        ScraperError::RateLimited {
            retry_after_secs, ..
        } => (*retry_after_secs).min(MAX_RETRY_AFTER_SECS),
        _ => 0,
    };
    Duration::from_secs(exponential.max(requested))
}

/// Runs `operation` until it succeeds, fails permanently, or has been retried
/// `max_retries` times; the last error is returned in the latter cases.
///
/// With `max_retries = 0` the operation runs exactly once.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_secs: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
{
    let mut retry = 0u32;
    loop {
        let err = match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if retry < max_retries && is_retriable(&err) => err,
            Err(err) => return Err(err),
        };

        let delay = backoff_delay(backoff_base_secs, retry, &err);
        retry += 1;
        tracing::warn!(
            retry,
            max_retries,
            delay_ms = delay.as_millis(),
            kind = %err.kind(),
            error = %err,
            "transient fetch error; retrying"
        );
        tokio::time::sleep(delay).await;
    }
}
