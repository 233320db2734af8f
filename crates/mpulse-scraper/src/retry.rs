//! Exponential back-off with jitter for outbound provider calls.
//!
//! Network failures, HTTP 429 and 5xx responses are retried. Everything else,
//! including a missing key or a malformed payload, is returned at once.

use std::future::Future;
use std::time::Duration;

use crate::error::ScraperError;

const MAX_DELAY_MS: u64 = 30_000;

/// Returns `true` for errors that are worth retrying after a back-off delay.
pub(crate) fn is_retriable(err: &ScraperError) -> bool {
    match err {
        ScraperError::Http(e) => {
            e.is_timeout() || e.is_connect() || e.status().is_some_and(|s| s.is_server_error())
        }
        ScraperError::RateLimited { .. } => true,
        ScraperError::UnexpectedStatus { status, .. } => *status >= 500,
        ScraperError::MissingApiKey { .. }
        | ScraperError::Deserialize { .. }
        | ScraperError::NotFound { .. }
        | ScraperError::Provider { .. }
        | ScraperError::InvalidUrl { .. } => false,
    }
}

/// Runs `operation` with up to `max_retries` additional attempts on transient errors.
///
/// The wait before retry `n` is `backoff_base_ms * 2^(n-1)` scaled by a random
/// factor in `[0.75, 1.25)`, capped at 30 s. A rate-limit response with a
/// `Retry-After` longer than the computed delay waits that long instead, within
/// the same cap.
pub(crate) async fn retry_with_backoff<T, F, Fut>(
    max_retries: u32,
    backoff_base_ms: u64,
    mut operation: F,
) -> Result<T, ScraperError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ScraperError>>,
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
                let factor = rand::random::<f64>() * 0.5 + 0.75;
                #[allow(
                    clippy::cast_possible_truncation,
                    clippy::cast_sign_loss,
                    clippy::cast_precision_loss
                )]
                let jittered = (computed.min(MAX_DELAY_MS) as f64 * factor) as u64;
                let delay_ms = match &err {
                    ScraperError::RateLimited {
                        retry_after_secs, ..
                    } if backoff_base_ms > 0 => jittered
                        .max(retry_after_secs.saturating_mul(1_000))
                        .min(MAX_DELAY_MS),
                    _ => jittered,
                };
                tracing::warn!(
                    attempt,
                    max_retries,
                    delay_ms,
                    error = %err,
                    "transient provider error, retrying after back-off"
                );
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use mpulse_core::NewsSource;

    use super::*;

    fn deserialize_err() -> ScraperError {
        let source = serde_json::from_str::<()>("invalid").unwrap_err();
        ScraperError::Deserialize {
            context: "test".to_owned(),
            source,
        }
    }

    #[test]
    fn rate_limit_and_server_errors_are_retriable() {
        assert!(is_retriable(&ScraperError::RateLimited {
            provider: NewsSource::Finnhub,
            retry_after_secs: 1,
        }));
        assert!(is_retriable(&ScraperError::UnexpectedStatus {
            status: 503,
            url: "https://finnhub.io".to_owned(),
        }));
    }

    #[test]
    fn client_errors_are_not_retriable() {
        assert!(!is_retriable(&ScraperError::UnexpectedStatus {
            status: 401,
            url: "https://newsapi.org".to_owned(),
        }));
        assert!(!is_retriable(&ScraperError::MissingApiKey {
            provider: NewsSource::NewsApi,
        }));
        assert!(!is_retriable(&deserialize_err()));
    }

    #[tokio::test]
    async fn succeeds_immediately_on_first_try() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Ok::<u32, ScraperError>(42)
            }
        })
        .await;
        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn retries_server_errors_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                let attempt = c.fetch_add(1, Ordering::SeqCst) + 1;
                if attempt < 3 {
                    Err(ScraperError::UnexpectedStatus {
                        status: 502,
                        url: "https://api.marketaux.com".to_owned(),
                    })
                } else {
                    Ok(7)
                }
            }
        })
        .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<(), _> = retry_with_backoff(2, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(ScraperError::RateLimited {
                    provider: NewsSource::Google,
                    retry_after_secs: 60,
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 3, "first try plus two retries");
        assert!(matches!(result, Err(ScraperError::RateLimited { .. })));
    }

    #[tokio::test]
    async fn does_not_retry_missing_key() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = Arc::clone(&calls);
        let result: Result<(), _> = retry_with_backoff(3, 0, || {
            let c = Arc::clone(&c);
            async move {
                c.fetch_add(1, Ordering::SeqCst);
                Err(ScraperError::MissingApiKey {
                    provider: NewsSource::Marketaux,
                })
            }
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(matches!(result, Err(ScraperError::MissingApiKey { .. })));
    }
}
