use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::classify::{should_retry, ExtractError, FetchFailure, RateLimitSignature};
use crate::config::FetchConfig;

/// How many times to retry and how long to wait between attempts
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt, so at most `max_retries + 1` attempts run
    pub max_retries: u32,

    /// Delay before the first retry; later retries double it each time
    pub initial_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &FetchConfig) -> Self {
        Self {
            max_retries: config.max_retries,
            initial_delay: Duration::from_secs(config.initial_delay_secs),
        }
    }

    /// Delay slept before retry number `attempt` (1-based)
    fn backoff_before(&self, attempt: u32) -> Duration {
        self.initial_delay * 2u32.pow(attempt.saturating_sub(1))
    }
}

/// Runs `op` until it succeeds, its failure is terminal, or attempts run out
///
/// Attempt 0 runs immediately. Before retry `k` the loop sleeps
/// `initial_delay * 2^(k-1)`, so with a 5 second initial delay the waits go
/// 5s, 10s, 20s. Whether a failure is retried at all is decided by
/// [`should_retry`]; when every attempt is used up the error keeps the last
/// failure so callers still see its classification.
pub async fn retry_with_backoff<T, F, Fut>(
    policy: &RetryPolicy,
    signature: &RateLimitSignature,
    mut op: F,
) -> Result<T, ExtractError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, FetchFailure>>,
{
    let mut attempt: u32 = 0;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(failure) => {
                if !should_retry(&failure, signature) {
                    return Err(ExtractError::Fetch(failure));
                }
                if attempt == policy.max_retries {
                    return Err(ExtractError::Exhausted {
                        attempts: attempt + 1,
                        last: failure,
                    });
                }
                attempt += 1;
                let delay = policy.backoff_before(attempt);
                warn!(
                    "Attempt {}/{} failed ({}), retrying in {}s",
                    attempt,
                    policy.max_retries + 1,
                    failure,
                    delay.as_secs()
                );
                tokio::time::sleep(delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::classify::FailureKind;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    fn policy(max_retries: u32, initial_secs: u64) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            initial_delay: Duration::from_secs(initial_secs),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_on_first_attempt_sleeps_nothing() {
        let start = Instant::now();
        let result = retry_with_backoff(&policy(5, 5), &RateLimitSignature::default(), || async {
            Ok::<_, FetchFailure>(7)
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_doubles_between_attempts() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let start = Instant::now();

        let result = retry_with_backoff(
            &policy(5, 5),
            &RateLimitSignature::default(),
            move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                        Err(FetchFailure::rate_limited("Rate limited (HTTP 429)"))
                    } else {
                        Ok("caption".to_string())
                    }
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), "caption");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        // 5s before the first retry, 10s before the second
        assert_eq!(start.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_terminal_failure_stops_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let start = Instant::now();

        let result: Result<(), _> = retry_with_backoff(
            &policy(5, 5),
            &RateLimitSignature::default(),
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(FetchFailure::forbidden("Login required (HTTP 401)"))
                }
            },
        )
        .await;

        let error = result.unwrap_err();
        assert_eq!(error.kind(), FailureKind::Forbidden);
        assert!(matches!(error, ExtractError::Fetch(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_preserves_last_failure() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();
        let start = Instant::now();

        let result: Result<(), _> = retry_with_backoff(
            &policy(2, 5),
            &RateLimitSignature::default(),
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(FetchFailure::rate_limited("Rate limited (HTTP 429)"))
                }
            },
        )
        .await;

        match result.unwrap_err() {
            ExtractError::Exhausted { attempts, last } => {
                assert_eq!(attempts, 3);
                assert_eq!(last.kind, FailureKind::RateLimited);
            }
            other => panic!("expected exhaustion, got {:?}", other),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(start.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_without_signature_match_is_terminal() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result: Result<(), _> = retry_with_backoff(
            &policy(5, 5),
            &RateLimitSignature::default(),
            move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Err(FetchFailure::transport("connection refused"))
                }
            },
        )
        .await;

        assert_eq!(result.unwrap_err().kind(), FailureKind::Transport);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_with_signature_match_retries() {
        let calls = Arc::new(AtomicU32::new(0));
        let counter = calls.clone();

        let result = retry_with_backoff(
            &policy(5, 1),
            &RateLimitSignature::default(),
            move || {
                let counter = counter.clone();
                async move {
                    if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                        Err(FetchFailure::transport("read timed out: too many requests"))
                    } else {
                        Ok(1u8)
                    }
                }
            },
        )
        .await;

        assert_eq!(result.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
