//! Retry with exponential back-off and jitter for source API requests.
//!
//! Only transient failures are retried: timeouts, refused connections,
//! `429 Too Many Requests`, and 5xx answers. Everything else is returned on
//! the first attempt.

use std::future::Future;
use std::time::Duration;

use crate::error::SourceError;

const MAX_DELAY_MS: u64 = 30_000;

pub(crate) fn is_retriable(err: &SourceError) -> bool {
    match err {
        SourceError::Http(e) => {
            e.is_timeout()
                || e.is_connect()
                || e.status()
                    .is_some_and(|s| s.is_server_error() || s.as_u16() == 429)
        }
        SourceError::Status { status, .. } => *status == 429 || *status >= 500,
        SourceError::MissingToken
        | SourceError::InvalidToken
        | SourceError::InvalidUrl { .. }
        | SourceError::Parse { .. }
        | SourceError::PaginationLimit { .. } => false,
    }
}

/// Runs `operation`, retrying up to `max_retries` more times on transient
/// errors. The delay doubles from `backoff_base_ms` with ±25% jitter and is
/// capped at 30 s.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, SourceError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, SourceError>>,
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
                let computed = backoff_base_ms.saturating_mul(1u64 << (attempt - 1).min(10));
                let capped = computed.min(MAX_DELAY_MS);
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let delay_ms = (capped as f64 * (rand::random::<f64>() * 0.5 + 0.75)) as u64;
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "source: transient error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}
