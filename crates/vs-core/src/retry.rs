//! Shared exponential-backoff retry helper.
//!
//! Used by the GitHub client and the LLM client so both honor the same
//! "retry 5xx/timeout with exponential backoff up to three attempts" rule
//! (spec.md §4.1, §4.3) without duplicating the loop in each crate.

use std::future::Future;
use std::time::Duration;

/// Retry `f` up to `max_attempts` times with exponential backoff starting at
/// `base_delay`, doubling each attempt. `is_retryable` decides whether an
/// error is worth retrying; non-retryable errors return immediately.
pub async fn with_backoff<T, E, F, Fut, R>(
    max_attempts: u32,
    base_delay: Duration,
    is_retryable: R,
    mut f: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
{
    let mut attempt = 0;
    loop {
        attempt += 1;
        match f().await {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts && is_retryable(&err) => {
                let delay = base_delay * 2u32.pow(attempt - 1);
                tracing::warn!(attempt, delay_ms = delay.as_millis() as u64, "retrying after transient error");
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let attempts = AtomicU32::new(0);
        let result: Result<u32, &str> = with_backoff(
            5,
            Duration::from_millis(1),
            |_: &&str| true,
            || {
                let n = attempts.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 {
                        Err("transient")
                    } else {
                        Ok(42)
                    }
                }
            },
        )
        .await;

        assert_eq!(result, Ok(42));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_attempts() {
        let attempts = AtomicU32::new(0);
        let result: Result<u32, &str> = with_backoff(
            3,
            Duration::from_millis(1),
            |_: &&str| true,
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async move { Err("still failing") }
            },
        )
        .await;

        assert_eq!(result, Err("still failing"));
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_returns_immediately() {
        let attempts = AtomicU32::new(0);
        let result: Result<u32, &str> = with_backoff(
            5,
            Duration::from_millis(1),
            |_: &&str| false,
            || {
                attempts.fetch_add(1, Ordering::SeqCst);
                async move { Err("fatal") }
            },
        )
        .await;

        assert_eq!(result, Err("fatal"));
        assert_eq!(attempts.load(Ordering::SeqCst), 1);
    }
}
