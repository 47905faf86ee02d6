//! Retry and backoff policy for API calls.
//!
//! This module classifies failed requests (rate limiting, HTTP errors,
//! transport failures, undecodable bodies) and decides how long to wait
//! before the next attempt, so the API clients share one consistent policy.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_http_status};
pub use error::FetchError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
