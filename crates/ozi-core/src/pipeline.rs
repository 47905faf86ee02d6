//! Extraction side of the orchestrator: one task, every country, batches from
//! the API into the warehouse.
//!
//! The extractor is blocking (curl, retry sleeps), so it runs on a blocking
//! thread and hands batches over a bounded channel to the async loader.

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;

use crate::api::{CloudflareClient, CurlTransport, RetryingClient, RipeClient};
use crate::config::OziConfig;
use crate::extract::report::print_progress;
use crate::extract::{build_job, generate_dates, JobClients, RecordBatch};
use crate::retry::RetryPolicy;
use crate::tasks::{Resolution, Task};
use crate::warehouse::Warehouse;

/// Batches buffered between producer and loader.
const CHANNEL_DEPTH: usize = 4;

const RULE: &str = "--------------------------------------------------";

/// Batch sizes for one run.
#[derive(Debug, Clone, Copy)]
pub struct ExtractionSettings {
    pub batch_size: usize,
    pub asn_batch_size: usize,
}

impl From<&OziConfig> for ExtractionSettings {
    fn from(cfg: &OziConfig) -> Self {
        Self {
            batch_size: cfg.batch_size,
            asn_batch_size: cfg.asn_batch_size,
        }
    }
}

/// Totals over every country of one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    pub countries: usize,
    pub skipped_countries: usize,
    pub batches: u64,
    pub received: u64,
    pub stored: u64,
}

/// API clients wired from config: curl transport, retry policy, and the
/// Cloudflare token read from the configured environment variable.
pub fn clients_from_config(cfg: &OziConfig) -> JobClients {
    let policy = RetryPolicy::from(&cfg.retry_config());
    let client = RetryingClient::new(Arc::new(CurlTransport::default()), policy);
    let cloudflare_token = std::env::var(&cfg.cloudflare.token_env)
        .ok()
        .filter(|t| !t.trim().is_empty());
    JobClients {
        ripe: RipeClient::new(client.clone(), cfg.ripe.base_url.clone()),
        cloudflare: CloudflareClient::new(client, cfg.cloudflare.base_url.clone()),
        cloudflare_token,
    }
}

fn resolution_name(r: Resolution) -> &'static str {
    match r {
        Resolution::D => "daily",
        Resolution::W => "weekly",
        Resolution::M => "monthly",
    }
}

/// Upper-cased country codes, duplicates dropped, first occurrence kept.
fn unique_countries(countries: &[String]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(countries.len());
    for c in countries {
        let c = c.trim().to_ascii_uppercase();
        if !c.is_empty() && !out.contains(&c) {
            out.push(c);
        }
    }
    out
}

/// Run `task` for each of its countries in order.
///
/// Per-key fetch failures, missing tokens and failed inserts are logged and
/// skipped; only a crashed producer thread is an error.
pub async fn run_extraction(
    task: &Task,
    clients: &JobClients,
    warehouse: &Warehouse,
    settings: ExtractionSettings,
) -> Result<ExtractionSummary> {
    let mut summary = ExtractionSummary::default();
    let dates = generate_dates(task.date_from, task.date_to, task.resolution);
    if dates.is_empty() {
        tracing::warn!(
            "no dates for {}..{} at resolution {}, nothing to do",
            task.date_from,
            task.date_to,
            task.resolution
        );
        return Ok(summary);
    }

    for country in unique_countries(&task.countries) {
        println!();
        println!("{}", RULE);
        println!("Started:    {} for {}", task.code, country);
        println!("At:         {}", Local::now().format("%Y-%m-%d %H:%M:%S"));
        println!("Period:     {} to {}", task.date_from, task.date_to);
        println!(
            "Resolution: {} ({} date(s))",
            resolution_name(task.resolution),
            dates.len()
        );
        println!("{}", RULE);

        let job = match build_job(
            task,
            &country,
            &dates,
            clients,
            settings.batch_size,
            settings.asn_batch_size,
        ) {
            Ok(job) => job,
            Err(e) => {
                tracing::error!(country = %country, "{:#}", e);
                summary.skipped_countries += 1;
                continue;
            }
        };

        let label = job.label.clone();
        let progress = job.progress.clone();
        let (tx, mut rx) = tokio::sync::mpsc::channel::<RecordBatch>(CHANNEL_DEPTH);
        let batches = job.batches;
        let producer = tokio::task::spawn_blocking(move || {
            for batch in batches {
                if tx.blocking_send(batch).is_err() {
                    break;
                }
            }
        });

        print_progress(&progress, &format!("Starting {}", label));
        while let Some(batch) = rx.recv().await {
            summary.batches += 1;
            match warehouse.insert(&country, &batch).await {
                Ok(n) => progress.add_stored(n),
                Err(e) => tracing::error!(
                    country = %country,
                    table = batch.table(),
                    rows = batch.len(),
                    "insert failed: {:#}",
                    e
                ),
            }
            print_progress(&progress, &label);
        }
        producer
            .await
            .with_context(|| format!("extraction thread for {} failed", label))?;

        let counters = progress.snapshot();
        print_progress(&progress, &format!("Finished {}", label));
        summary.countries += 1;
        summary.received += counters.received_from_api;
        summary.stored += counters.stored_to_database;

        println!();
        println!("{}", RULE);
        println!(
            "Finished:   {} for {} at {}",
            task.code,
            country,
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );
        println!("{}", RULE);
        tracing::info!(
            country = %country,
            received = counters.received_from_api,
            stored = counters.stored_to_database,
            "{} done",
            label
        );
    }

    Ok(summary)
}
