//! Error returned by a single API request, and by the retrying client once
//! its attempts are exhausted.

use thiserror::Error;

/// Failure of one GET against an extraction API.
///
/// Callers treat any of these, after retries, as "no data for this key".
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Server answered 429 Too Many Requests.
    #[error("rate limited (HTTP 429)")]
    RateLimited,
    /// Any other non-2xx status.
    #[error("HTTP {0}")]
    Http(u16),
    /// Connection, DNS, or timeout failure before a response was read.
    #[error("transport: {0}")]
    Transport(String),
    /// 2xx response whose body is not valid JSON.
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl From<curl::Error> for FetchError {
    fn from(e: curl::Error) -> Self {
        FetchError::Transport(e.to_string())
    }
}
