//! Blocking HTTP GET transport.
//!
//! Uses the curl crate (libcurl). Runs in the current thread; the extraction
//! pipeline drives it from a blocking task.

use std::time::Duration;

use crate::retry::FetchError;

/// Status and raw body of one GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One GET against a fully built URL. Implementations must not retry; the
/// retrying client owns that policy.
pub trait HttpTransport: Send + Sync {
    fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse, FetchError>;
}

/// Append URL-encoded query parameters to `base`.
pub fn build_url(base: &str, params: &[(&str, String)]) -> Result<String, FetchError> {
    let url = url::Url::parse_with_params(base, params.iter().map(|(k, v)| (*k, v.as_str())))
        .map_err(|e| FetchError::Transport(format!("invalid URL {}: {}", base, e)))?;
    Ok(url.into())
}

/// libcurl-backed transport. Follows redirects.
#[derive(Debug, Clone)]
pub struct CurlTransport {
    pub connect_timeout: Duration,
    pub timeout: Duration,
}

impl Default for CurlTransport {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(15),
            timeout: Duration::from_secs(120),
        }
    }
}

impl HttpTransport for CurlTransport {
    fn get(&self, url: &str, headers: &[(String, String)]) -> Result<HttpResponse, FetchError> {
        let mut body: Vec<u8> = Vec::new();

        let mut easy = curl::easy::Easy::new();
        easy.url(url)?;
        easy.follow_location(true)?;
        easy.max_redirections(10)?;
        easy.connect_timeout(self.connect_timeout)?;
        easy.timeout(self.timeout)?;
        easy.useragent(concat!("ozi-etl/", env!("CARGO_PKG_VERSION")))?;

        let mut list = curl::easy::List::new();
        for (k, v) in headers {
            list.append(&format!("{}: {}", k.trim(), v.trim()))?;
        }
        if !headers.is_empty() {
            easy.http_headers(list)?;
        }

        {
            let mut transfer = easy.transfer();
            transfer.write_function(|data| {
                body.extend_from_slice(data);
                Ok(data.len())
            })?;
            transfer.perform()?;
        }

        let status = easy.response_code()? as u16;
        Ok(HttpResponse { status, body })
    }
}
