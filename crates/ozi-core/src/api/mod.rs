//! Extraction API access.
//!
//! A blocking HTTP transport (libcurl), the retrying client that wraps it, and
//! thin adapters for the two upstream APIs: RIPE Stat (AS inventories,
//! resource stats, AS neighbours) and Cloudflare Radar (traffic, quality).

mod client;
mod cloudflare;
mod ripe;
mod transport;

pub use client::{RetryingClient, Sleeper};
pub use cloudflare::CloudflareClient;
pub use ripe::RipeClient;
pub use transport::{build_url, CurlTransport, HttpResponse, HttpTransport};
