//! `ozi extract` – run one task in this process (the scheduler's child).

use anyhow::Result;
use ozi_core::config::OziConfig;
use ozi_core::logging;
use ozi_core::pipeline::{self, ExtractionSettings};
use ozi_core::tasks::Task;
use ozi_core::warehouse::Warehouse;

pub async fn run_extract(cfg: &OziConfig, task: Task) -> Result<()> {
    logging::init_logging_stderr();
    tracing::debug!("loaded config: {:?}", cfg);

    let warehouse = match &cfg.warehouse.path {
        Some(path) => Warehouse::open_at(path).await?,
        None => Warehouse::open_default().await?,
    };
    let clients = pipeline::clients_from_config(cfg);

    let summary =
        pipeline::run_extraction(&task, &clients, &warehouse, ExtractionSettings::from(cfg))
            .await?;
    tracing::info!(
        countries = summary.countries,
        skipped = summary.skipped_countries,
        batches = summary.batches,
        received = summary.received,
        stored = summary.stored,
        "{} finished",
        task.describe()
    );
    Ok(())
}
