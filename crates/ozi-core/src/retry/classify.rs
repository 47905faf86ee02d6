//! Classify HTTP statuses and fetch errors into retry policy error kinds.

use crate::retry::error::FetchError;
use crate::retry::policy::ErrorKind;

/// Classify a non-2xx HTTP status code for retry decisions.
pub fn classify_http_status(code: u16) -> ErrorKind {
    match code {
        429 => ErrorKind::RateLimited,
        _ => ErrorKind::Http(code),
    }
}

/// Classify a fetch error into an ErrorKind.
pub fn classify(e: &FetchError) -> ErrorKind {
    match e {
        FetchError::RateLimited => ErrorKind::RateLimited,
        FetchError::Http(code) => classify_http_status(*code),
        FetchError::Transport(_) => ErrorKind::Transport,
        FetchError::MalformedResponse(_) => ErrorKind::Malformed,
    }
}
