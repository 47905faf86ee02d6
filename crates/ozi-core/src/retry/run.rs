//! Retry loop: run a closure until success or policy says stop.

use std::time::Duration;

use super::classify;
use super::error::FetchError;
use super::policy::{RetryDecision, RetryPolicy};

/// Runs `f` until it succeeds or the retry policy says to stop.
///
/// On retryable failure, reports the attempt on the tracing side channel,
/// calls `sleep` with the backoff duration, then tries again. `f` receives the
/// 1-based attempt number. The last error is returned once attempts run out.
pub fn run_with_retry<T, F, S>(
    policy: &RetryPolicy,
    target: &str,
    mut sleep: S,
    mut f: F,
) -> Result<T, FetchError>
where
    F: FnMut(u32) -> Result<T, FetchError>,
    S: FnMut(Duration),
{
    let mut attempt = 1u32;
    loop {
        match f(attempt) {
            Ok(v) => return Ok(v),
            Err(e) => {
                let kind = classify::classify(&e);
                let remaining = policy.remaining_after(attempt);
                match policy.decide(attempt, kind) {
                    RetryDecision::NoRetry => {
                        tracing::warn!(
                            attempt,
                            remaining,
                            url = target,
                            error = %e,
                            "API request failed, giving up"
                        );
                        return Err(e);
                    }
                    RetryDecision::RetryAfter(d) => {
                        tracing::warn!(
                            attempt,
                            remaining,
                            url = target,
                            error = %e,
                            delay_ms = d.as_millis() as u64,
                            "API request failed, retrying"
                        );
                        sleep(d);
                        attempt += 1;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            retry_delay: Duration::from_millis(1),
            rate_limit_cooldown: Duration::from_millis(7),
        }
    }

    #[test]
    fn succeeds_after_transient_failures() {
        let mut sleeps = Vec::new();
        let out = run_with_retry(&fast_policy(5), "t", |d| sleeps.push(d), |attempt| {
            if attempt < 3 {
                Err(FetchError::Http(502))
            } else {
                Ok(attempt)
            }
        });
        assert_eq!(out, Ok(3));
        assert_eq!(sleeps, vec![Duration::from_millis(1); 2]);
    }

    #[test]
    fn returns_last_error_without_trailing_sleep() {
        let mut sleeps = Vec::new();
        let out: Result<(), _> = run_with_retry(&fast_policy(2), "t", |d| sleeps.push(d), |_| {
            Err(FetchError::RateLimited)
        });
        assert_eq!(out, Err(FetchError::RateLimited));
        assert_eq!(sleeps, vec![Duration::from_millis(7)]);
    }
}
