use std::time::Duration;

use crate::config::RetryConfig;

/// High-level classification of a failed request for retry purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Server asked us to slow down (429).
    RateLimited,
    /// Non-2xx status other than 429.
    Http(u16),
    /// Network-level failure (connection reset, DNS, timeout).
    Transport,
    /// Body could not be decoded.
    Malformed,
}

/// Decision returned by the retry policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Do not retry; surface the failure.
    NoRetry,
    /// Retry after the given delay.
    RetryAfter(Duration),
}

/// Fixed-interval retry policy with a longer cooldown for rate limiting.
///
/// Every error kind is retried until `max_attempts` is reached; only the
/// sleep length differs.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Maximum number of attempts (including the first).
    pub max_attempts: u32,
    /// Sleep before retrying after an HTTP, transport, or decode failure.
    pub retry_delay: Duration,
    /// Sleep before retrying after a 429.
    pub rate_limit_cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay: Duration::from_secs(1),
            rate_limit_cooldown: Duration::from_secs(10),
        }
    }
}

/// Seconds from config as a Duration; negative, NaN, infinite or overflowing
/// values fall back to `default`.
fn secs_or(secs: f64, default: Duration) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or(default)
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(cfg: &RetryConfig) -> Self {
        let defaults = RetryPolicy::default();
        Self {
            max_attempts: cfg.max_attempts.max(1),
            retry_delay: secs_or(cfg.retry_delay_secs, defaults.retry_delay),
            rate_limit_cooldown: secs_or(cfg.rate_limit_cooldown_secs, defaults.rate_limit_cooldown),
        }
    }
}

impl RetryPolicy {
    /// Decide what to do after attempt number `attempt` (1-based) failed with `kind`.
    ///
    /// Returns `RetryDecision::NoRetry` once the final attempt has failed, so no
    /// sleep ever follows the last attempt.
    pub fn decide(&self, attempt: u32, kind: ErrorKind) -> RetryDecision {
        if attempt >= self.max_attempts {
            return RetryDecision::NoRetry;
        }

        match kind {
            ErrorKind::RateLimited => RetryDecision::RetryAfter(self.rate_limit_cooldown),
            ErrorKind::Http(_) | ErrorKind::Transport | ErrorKind::Malformed => {
                RetryDecision::RetryAfter(self.retry_delay)
            }
        }
    }

    /// Attempts left after `attempt` (1-based) has been used.
    pub fn remaining_after(&self, attempt: u32) -> u32 {
        self.max_attempts.saturating_sub(attempt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limit_uses_cooldown() {
        let p = RetryPolicy::default();
        assert_eq!(
            p.decide(1, ErrorKind::RateLimited),
            RetryDecision::RetryAfter(Duration::from_secs(10))
        );
    }

    #[test]
    fn other_failures_use_short_delay() {
        let p = RetryPolicy::default();
        for kind in [ErrorKind::Http(500), ErrorKind::Http(404), ErrorKind::Transport, ErrorKind::Malformed] {
            assert_eq!(
                p.decide(1, kind),
                RetryDecision::RetryAfter(Duration::from_secs(1)),
                "{kind:?}"
            );
        }
    }

    #[test]
    fn respects_max_attempts() {
        let mut p = RetryPolicy::default();
        p.max_attempts = 3;
        assert!(matches!(
            p.decide(1, ErrorKind::RateLimited),
            RetryDecision::RetryAfter(_)
        ));
        assert!(matches!(
            p.decide(2, ErrorKind::RateLimited),
            RetryDecision::RetryAfter(_)
        ));
        assert_eq!(p.decide(3, ErrorKind::RateLimited), RetryDecision::NoRetry);
        assert_eq!(p.remaining_after(3), 0);
        assert_eq!(p.remaining_after(1), 2);
    }

    #[test]
    fn from_config_clamps_attempts() {
        let cfg = RetryConfig {
            max_attempts: 0,
            retry_delay_secs: 0.5,
            rate_limit_cooldown_secs: 2.0,
        };
        let p = RetryPolicy::from(&cfg);
        assert_eq!(p.max_attempts, 1);
        assert_eq!(p.retry_delay, Duration::from_millis(500));
        assert_eq!(p.rate_limit_cooldown, Duration::from_secs(2));
    }

    #[test]
    fn from_config_rejects_unrepresentable_delays() {
        let cfg: RetryConfig = toml::from_str(
            r#"
                max_attempts = 4
                retry_delay_secs = inf
                rate_limit_cooldown_secs = 1e300
            "#,
        )
        .unwrap();
        let p = RetryPolicy::from(&cfg);
        assert_eq!(p.max_attempts, 4);
        assert_eq!(p.retry_delay, Duration::from_secs(1));
        assert_eq!(p.rate_limit_cooldown, Duration::from_secs(10));

        let cfg = RetryConfig {
            max_attempts: 2,
            retry_delay_secs: -3.0,
            rate_limit_cooldown_secs: f64::NAN,
        };
        let p = RetryPolicy::from(&cfg);
        assert_eq!(p.retry_delay, Duration::from_secs(1));
        assert_eq!(p.rate_limit_cooldown, Duration::from_secs(10));
    }
}
