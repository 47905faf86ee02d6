//! RIPE Stat data API.

use chrono::NaiveDate;
use serde_json::Value;

use super::client::RetryingClient;
use crate::retry::FetchError;

/// Adapter for the RIPE Stat data calls used by the extraction kinds.
#[derive(Clone)]
pub struct RipeClient {
    client: RetryingClient,
    base_url: String,
}

/// RIPE expects midnight UTC timestamps for point-in-time queries.
fn query_time(date: NaiveDate) -> String {
    format!("{}T00:00:00Z", date.format("%Y-%m-%d"))
}

impl RipeClient {
    pub fn new(client: RetryingClient, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn endpoint(&self, call: &str) -> String {
        format!("{}/{}/data.json", self.base_url, call)
    }

    /// Routed and non-routed ASNs registered to `country` on `date`.
    pub fn get_asns(&self, country: &str, date: NaiveDate) -> Result<Value, FetchError> {
        self.client.call(
            &self.endpoint("country-asns"),
            &[
                ("resource", country.to_string()),
                ("query_time", query_time(date)),
                ("lod", "1".to_string()),
            ],
        )
    }

    /// Prefix/ASN visibility statistics for `country` over `[from, to]`.
    /// `resolution` is passed through (`1d`, `5m`, ...).
    pub fn get_stats(
        &self,
        country: &str,
        resolution: &str,
        from: &str,
        to: &str,
    ) -> Result<Value, FetchError> {
        self.client.call(
            &self.endpoint("country-resource-stats"),
            &[
                ("resource", country.to_string()),
                ("resolution", resolution.to_string()),
                ("starttime", from.to_string()),
                ("endtime", to.to_string()),
            ],
        )
    }

    /// Neighbours of `asn` as seen on `date`.
    pub fn get_neighbours(&self, asn: &str, date: NaiveDate) -> Result<Value, FetchError> {
        self.client.call(
            &self.endpoint("asn-neighbours"),
            &[
                ("resource", asn.to_string()),
                ("query_time", query_time(date)),
            ],
        )
    }
}
