//! Task code -> batch sequence for one country.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde_json::Value;

use super::batch::BatchExtractor;
use super::dates::year_windows;
use super::parse;
use super::progress::ExtractionProgress;
use super::records::{AsnRecord, RecordBatch, StatRecord};
use crate::api::{CloudflareClient, RipeClient};
use crate::retry::FetchError;
use crate::tasks::{Task, TaskCode};

/// API adapters available to extraction jobs.
#[derive(Clone)]
pub struct JobClients {
    pub ripe: RipeClient,
    pub cloudflare: CloudflareClient,
    /// Radar bearer token; Cloudflare kinds cannot run without it.
    pub cloudflare_token: Option<String>,
}

/// Lazy batches for one (task, country) plus the counters they drive.
pub struct ExtractionJob {
    pub label: String,
    pub progress: ExtractionProgress,
    pub batches: Box<dyn Iterator<Item = RecordBatch> + Send>,
}

/// Records for one key, or none when the call failed or the envelope is missing.
fn records_or_skip<T>(
    what: &str,
    key: &str,
    fetched: Result<Value, FetchError>,
    parse: impl FnOnce(&Value) -> Option<Vec<T>>,
) -> Vec<T> {
    match fetched {
        Ok(payload) => parse(&payload).unwrap_or_else(|| {
            tracing::info!(key, "no {} data in response", what);
            Vec::new()
        }),
        Err(e) => {
            tracing::error!(key, error = %e, "{} request failed, skipping key", what);
            Vec::new()
        }
    }
}

fn ymd(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

/// Flat mode over dates: ASNs registered to `country` per date.
fn asn_batches(
    ripe: RipeClient,
    country: String,
    dates: Vec<NaiveDate>,
    batch_size: usize,
    progress: ExtractionProgress,
) -> impl Iterator<Item = Vec<AsnRecord>> + Send {
    let shown = progress.clone();
    BatchExtractor::new(dates, batch_size, progress, move |date: &NaiveDate| {
        let key = ymd(*date);
        shown.set_current(key.clone());
        records_or_skip("ASN", &key, ripe.get_asns(&country, *date), |p| {
            parse::parse_asns(p, *date)
        })
    })
}

/// Build the batch sequence for `task` restricted to `country`.
///
/// `dates` are the generated query dates of the task. Fails only when a
/// Cloudflare kind has no token.
pub fn build_job(
    task: &Task,
    country: &str,
    dates: &[NaiveDate],
    clients: &JobClients,
    batch_size: usize,
    asn_batch_size: usize,
) -> Result<ExtractionJob> {
    let progress = ExtractionProgress::new();
    let country = country.to_string();
    let ripe = clients.ripe.clone();

    let batches: Box<dyn Iterator<Item = RecordBatch> + Send> = match task.code {
        TaskCode::Asns => Box::new(
            asn_batches(ripe, country.clone(), dates.to_vec(), batch_size, progress.clone())
                .map(RecordBatch::Asns),
        ),

        TaskCode::Stats1d => {
            let span = match (dates.iter().min(), dates.iter().max()) {
                (Some(from), Some(to)) => vec![(*from, *to)],
                _ => Vec::new(),
            };
            Box::new(
                stat_batches(ripe, country.clone(), "1d", span, batch_size, progress.clone())
                    .map(|rows| RecordBatch::Stats {
                        resolution: "1d".to_string(),
                        rows,
                    }),
            )
        }

        TaskCode::Stats5m => {
            // Window ends are exclusive.
            let windows = year_windows(task.date_from, task.date_to);
            Box::new(
                stat_batches(ripe, country.clone(), "5m", windows, batch_size, progress.clone())
                    .map(|rows| RecordBatch::Stats {
                        resolution: "5m".to_string(),
                        rows,
                    }),
            )
        }

        TaskCode::AsnNeighbours => {
            let shown = progress.clone();
            let c = country.clone();
            let extractor = BatchExtractor::new(
                dates.to_vec(),
                batch_size,
                progress.clone(),
                move |date: &NaiveDate| {
                    let date = *date;
                    shown.set_current(ymd(date));
                    let inner_ripe = ripe.clone();
                    // Inner flat run lists the date's ASNs; its counters are private.
                    asn_batches(
                        ripe.clone(),
                        c.clone(),
                        vec![date],
                        asn_batch_size,
                        ExtractionProgress::new(),
                    )
                    .flatten()
                    .flat_map(move |rec| {
                        let key = format!("AS{} {}", rec.asn, ymd(date));
                        records_or_skip(
                            "neighbour",
                            &key,
                            inner_ripe.get_neighbours(&rec.asn.to_string(), date),
                            |p| parse::parse_neighbours(p, rec.asn, date),
                        )
                    })
                },
            );
            Box::new(extractor.map(RecordBatch::Neighbours))
        }

        TaskCode::Traffic => {
            let Some(token) = clients.cloudflare_token.clone() else {
                bail!("Cloudflare API token not set, skipping traffic for {}", country);
            };
            let cf = clients.cloudflare.clone();
            let shown = progress.clone();
            let extractor = BatchExtractor::new(
                vec![country.clone()],
                batch_size,
                progress.clone(),
                move |c: &String| {
                    shown.set_current(c.clone());
                    records_or_skip("traffic", c, cf.get_traffic(c, &token), parse::parse_traffic)
                },
            );
            Box::new(extractor.map(RecordBatch::Traffic))
        }

        TaskCode::InternetQuality => {
            let Some(token) = clients.cloudflare_token.clone() else {
                bail!(
                    "Cloudflare API token not set, skipping internet quality for {}",
                    country
                );
            };
            let cf = clients.cloudflare.clone();
            let shown = progress.clone();
            let extractor = BatchExtractor::new(
                vec![country.clone()],
                batch_size,
                progress.clone(),
                move |c: &String| {
                    shown.set_current(c.clone());
                    records_or_skip("quality", c, cf.get_quality(c, &token), parse::parse_quality)
                },
            );
            Box::new(extractor.map(RecordBatch::Quality))
        }
    };

    Ok(ExtractionJob {
        label: format!("{} for {}", task.code, country),
        progress,
        batches,
    })
}

/// One `country-resource-stats` query per `[from, to]` span.
fn stat_batches(
    ripe: RipeClient,
    country: String,
    resolution: &'static str,
    spans: Vec<(NaiveDate, NaiveDate)>,
    batch_size: usize,
    progress: ExtractionProgress,
) -> impl Iterator<Item = Vec<StatRecord>> + Send {
    let shown = progress.clone();
    BatchExtractor::new(spans, batch_size, progress, move |(from, to): &(NaiveDate, NaiveDate)| {
        let (from, to) = (ymd(*from), ymd(*to));
        let key = format!("{}..{}", from, to);
        shown.set_current(from.clone());
        records_or_skip(
            "stats",
            &key,
            ripe.get_stats(&country, resolution, &from, &to),
            parse::parse_stats,
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{HttpResponse, HttpTransport, RetryingClient};
    use crate::retry::RetryPolicy;
    use crate::tasks::Resolution;
    use std::sync::Arc;
    use std::time::Duration;

    /// Answers by URL substring; unknown URLs get a 500.
    struct RouteTransport {
        routes: Vec<(&'static str, &'static str)>,
    }

    impl HttpTransport for RouteTransport {
        fn get(&self, url: &str, _headers: &[(String, String)]) -> Result<HttpResponse, FetchError> {
            for (needle, body) in &self.routes {
                if url.contains(needle) {
                    return Ok(HttpResponse {
                        status: 200,
                        body: body.as_bytes().to_vec(),
                    });
                }
            }
            Ok(HttpResponse { status: 500, body: Vec::new() })
        }
    }

    fn clients(routes: Vec<(&'static str, &'static str)>, token: Option<&str>) -> JobClients {
        let policy = RetryPolicy {
            max_attempts: 2,
            retry_delay: Duration::ZERO,
            rate_limit_cooldown: Duration::ZERO,
        };
        let rc = RetryingClient::new(Arc::new(RouteTransport { routes }), policy)
            .with_sleeper(Arc::new(|_| {}));
        JobClients {
            ripe: RipeClient::new(rc.clone(), "http://ripe.test/data"),
            cloudflare: CloudflareClient::new(rc, "http://cf.test/radar"),
            cloudflare_token: token.map(str::to_string),
        }
    }

    fn task(code: TaskCode) -> Task {
        Task {
            code,
            countries: vec!["LU".into()],
            date_from: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
            resolution: Resolution::D,
        }
    }

    fn dates() -> Vec<NaiveDate> {
        vec![
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2023, 1, 2).unwrap(),
        ]
    }

    #[test]
    fn asns_job_batches_and_counts() {
        let c = clients(
            vec![(
                "country-asns",
                r#"{"data": {"countries": [{"routed": "{AsnSingle(1), AsnSingle(2)}", "non_routed": "{AsnSingle(3)}"}]}}"#,
            )],
            None,
        );
        let job = build_job(&task(TaskCode::Asns), "LU", &dates(), &c, 4, 100).unwrap();
        let progress = job.progress.clone();
        let sizes: Vec<_> = job.batches.map(|b| b.len()).collect();
        assert_eq!(sizes, vec![4, 2]);
        let counters = progress.snapshot();
        assert_eq!(counters.total_dates, 2);
        assert_eq!(counters.dates_processed, 2);
        assert_eq!(counters.received_from_api, 6);
        assert_eq!(progress.current().as_deref(), Some("2023-01-02"));
    }

    #[test]
    fn neighbours_nested_per_asn() {
        let c = clients(
            vec![
                (
                    "country-asns",
                    r#"{"data": {"countries": [{"routed": "{AsnSingle(10), AsnSingle(20)}", "non_routed": "{}"}]}}"#,
                ),
                (
                    "resource=10&",
                    r#"{"data": {"neighbours": [{"asn": 1, "type": "left", "power": 1, "v4_peers": 1, "v6_peers": 0}]}}"#,
                ),
                // AS20 hits no route: 500 until retries run out, contributes nothing.
            ],
            None,
        );
        let job = build_job(&task(TaskCode::AsnNeighbours), "LU", &dates(), &c, 10, 1).unwrap();
        let progress = job.progress.clone();
        let batches: Vec<_> = job.batches.collect();
        assert_eq!(batches.len(), 1);
        let RecordBatch::Neighbours(rows) = &batches[0] else {
            panic!("expected neighbour batch");
        };
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.asn_req == 10 && r.asn == 1));
        assert_eq!(rows[0].date, dates()[0]);
        assert_eq!(rows[1].date, dates()[1]);

        let counters = progress.snapshot();
        assert_eq!(counters.total_dates, 2);
        assert_eq!(counters.dates_processed, 2);
        assert_eq!(counters.received_from_api, 2);
    }

    #[test]
    fn stats_1d_single_span() {
        let c = clients(
            vec![(
                "starttime=2023-01-01&endtime=2023-01-02",
                r#"{"data": {"stats": [{"timeline": [{"starttime": "2023-01-01T00:00:00"}], "asns_ris": 5}]}}"#,
            )],
            None,
        );
        let job = build_job(&task(TaskCode::Stats1d), "LU", &dates(), &c, 10, 1).unwrap();
        let batches: Vec<_> = job.batches.collect();
        assert_eq!(batches.len(), 1);
        match &batches[0] {
            RecordBatch::Stats { resolution, rows } => {
                assert_eq!(resolution, "1d");
                assert_eq!(rows[0].asns_ris, Some(5));
            }
            other => panic!("unexpected batch {:?}", other),
        }
    }

    #[test]
    fn cloudflare_kinds_need_token() {
        let c = clients(vec![], None);
        assert!(build_job(&task(TaskCode::Traffic), "LU", &dates(), &c, 10, 1).is_err());
        assert!(build_job(&task(TaskCode::InternetQuality), "LU", &dates(), &c, 10, 1).is_err());
    }

    #[test]
    fn traffic_with_token() {
        let c = clients(
            vec![(
                "netflows",
                r#"{"success": true, "result": {"main": {"timestamps": ["t1", "t2"], "values": ["1", "2"]}}}"#,
            )],
            Some("tok"),
        );
        let job = build_job(&task(TaskCode::Traffic), "LU", &dates(), &c, 10, 1).unwrap();
        let batches: Vec<_> = job.batches.collect();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 2);
        assert_eq!(batches[0].table(), "country_traffic");
    }
}
