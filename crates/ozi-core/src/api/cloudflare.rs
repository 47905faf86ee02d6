//! Cloudflare Radar API.

use serde_json::Value;

use super::client::RetryingClient;
use crate::retry::FetchError;

/// Window requested for every Radar time series.
const DATE_RANGE: &str = "52w";

#[derive(Clone)]
pub struct CloudflareClient {
    client: RetryingClient,
    base_url: String,
}

impl CloudflareClient {
    pub fn new(client: RetryingClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn auth(token: &str) -> [(String, String); 1] {
        [("Authorization".to_string(), format!("Bearer {}", token))]
    }

    /// Traffic volume time series for `country`.
    pub fn get_traffic(&self, country: &str, token: &str) -> Result<Value, FetchError> {
        self.client.call_with_headers(
            &format!("{}/netflows/timeseries", self.base_url),
            &[
                ("name", "main".to_string()),
                ("location", country.to_string()),
                ("dateRange", DATE_RANGE.to_string()),
            ],
            &Self::auth(token),
        )
    }

    /// Bandwidth quality percentiles (p25/p50/p75) for `country`.
    pub fn get_quality(&self, country: &str, token: &str) -> Result<Value, FetchError> {
        self.client.call_with_headers(
            &format!("{}/quality/iqi/timeseries_groups", self.base_url),
            &[
                ("name", "main".to_string()),
                ("location", country.to_string()),
                ("metric", "bandwidth".to_string()),
                ("interpolation", "true".to_string()),
                ("dateRange", DATE_RANGE.to_string()),
            ],
            &Self::auth(token),
        )
    }
}
