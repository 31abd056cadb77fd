//! Retry logic for transient fetch failures
//!
//! Image downloads retry a bounded number of times with a fixed pause between
//! attempts. Exhausting the retries is not fatal to the run — callers fall
//! back to the original remote reference.

use crate::config::RetryConfig;
use crate::error::Error;
use std::future::Future;

/// Trait for errors that can be classified as retryable or not
///
/// Transient failures (timeouts, connection resets, server-side statuses)
/// should return `true`. Structural failures (malformed input, unknown
/// ancestors) should return `false`.
pub trait IsRetryable {
    /// Returns true if the error is transient and the operation should be retried
    fn is_retryable(&self) -> bool;
}

impl IsRetryable for Error {
    fn is_retryable(&self) -> bool {
        match self {
            // Any transport-level failure during a fetch is worth retrying
            Error::Network(_) => true,
            // Non-200 image responses retry up to the attempt limit
            Error::ImageUnavailable { .. } => true,
            // Transient I/O conditions
            Error::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::ConnectionRefused
                    | std::io::ErrorKind::ConnectionReset
                    | std::io::ErrorKind::ConnectionAborted
                    | std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::Interrupted
            ),
            // Document-level outcomes are handled as skips, not retries
            Error::DocumentUnavailable { .. } | Error::MalformedDocument { .. } => false,
            // Listing failures are fatal
            Error::ListingNotFound(_) | Error::ListingUnavailable { .. } => false,
            // Malformed payloads are permanent
            Error::Serialization(_) => false,
            // Data-integrity contract violation, never retried
            Error::UnknownAncestor { .. } => false,
        }
    }
}

/// Execute an async operation with bounded, fixed-delay retry
///
/// Runs `operation` up to `config.max_attempts` times, pausing
/// `config.delay` between attempts. Each failed attempt is logged with its
/// attempt count. No pause is taken after the final failure. Non-retryable
/// errors are returned immediately.
pub async fn fetch_with_retry<F, Fut, T>(
    config: &RetryConfig,
    context: &str,
    mut operation: F,
) -> crate::error::Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = crate::error::Result<T>>,
{
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if e.is_retryable() && attempt < config.max_attempts => {
                tracing::warn!(
                    error = %e,
                    attempt,
                    max_attempts = config.max_attempts,
                    context,
                    "Fetch failed, retrying"
                );
                tokio::time::sleep(config.delay).await;
                attempt += 1;
            }
            Err(e) => {
                if e.is_retryable() {
                    tracing::warn!(
                        error = %e,
                        attempts = attempt,
                        context,
                        "Fetch failed after all retry attempts"
                    );
                }
                return Err(e);
            }
        }
    }
}
