//! Retry with exponential back-off and jitter for platform calls.
//!
//! [`retry_with_backoff`] wraps any fallible async operation and retries on
//! transient errors (network failures, 429, 5xx). Quota, auth and payload
//! errors are returned immediately so one creator cannot burn the daily
//! quota on retries.

use std::future::Future;
use std::time::Duration;

use crate::error::PlatformError;

/// Upper bound on any single back-off sleep.
const MAX_DELAY_MS: u64 = 60_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
pub(crate) fn is_retriable(err: &PlatformError) -> bool {
    match err {
        PlatformError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        PlatformError::RateLimited { .. } => true,
        PlatformError::ApiError { status, .. } => *status >= 500,
        PlatformError::NotFound(_)
        | PlatformError::Deserialize { .. }
        | PlatformError::TokenRefresh(_)
        | PlatformError::InvalidBaseUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient
/// errors.
///
/// The n-th retry sleeps `backoff_base_ms * 2^(n-1)` ± 25 % jitter, capped
/// at 60 s. A 429 with a `Retry-After` longer than the computed delay waits
/// the server's requested time instead (still capped).
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, PlatformError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, PlatformError>>,
{
    let mut attempt = 0u32;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                if !is_retriable(&err) || attempt >= max_retries {
                    return Err(err);
                }
                attempt += 1;
                let delay_ms = backoff_delay_ms(backoff_base_ms, attempt, &err);
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "platform: transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

fn backoff_delay_ms(backoff_base_ms: u64, attempt: u32, err: &PlatformError) -> u64 {
    let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
    #[allow(
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        clippy::cast_precision_loss
    )]
    let jittered = (computed.min(MAX_DELAY_MS) as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;

    let requested = match err {
        PlatformError::RateLimited {
            retry_after_secs, ..
        } if backoff_base_ms > 0 => retry_after_secs.saturating_mul(1_000),
        _ => 0,
    };
    jittered.max(requested).min(MAX_DELAY_MS)
}
