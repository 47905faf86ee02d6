//! `ozi schedule` – run a task document through the worker pool.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ozi_core::config::OziConfig;
use ozi_core::logging;
use ozi_core::scheduler::{run_pool, Launcher, PoolSettings};
use ozi_core::tasks::TaskStore;

/// How each task is launched: `[worker]` from config, else this binary with
/// `extract` (and the same `--config`, if one was given).
pub(crate) fn launcher(cfg: &OziConfig, config_path: Option<&Path>) -> Result<Launcher> {
    let program = match &cfg.worker.program {
        Some(p) => p.clone(),
        None => std::env::current_exe().context("locate ozi executable")?,
    };
    let args = match &cfg.worker.args {
        Some(args) => args.clone(),
        None => {
            let mut args = Vec::new();
            if let Some(path) = config_path {
                args.push("--config".to_string());
                args.push(path.display().to_string());
            }
            args.push("extract".to_string());
            args
        }
    };
    Ok(Launcher::new(program, args))
}

pub async fn run_schedule(
    cfg: &OziConfig,
    config_path: Option<&Path>,
    tasks_file: &Path,
    jobs: Option<usize>,
    logs_dir: Option<PathBuf>,
) -> Result<()> {
    let logs_dir = logs_dir.unwrap_or_else(|| cfg.logs_dir.clone());
    if let Err(e) = logging::init_scheduler_logging(&logs_dir) {
        logging::init_logging_stderr();
        tracing::warn!("scheduler log unavailable, logging to stderr only: {:#}", e);
    }

    tracing::info!(
        "Starting ETL task scheduler using task file: {}",
        tasks_file.display()
    );
    let store = TaskStore::open(tasks_file)?;
    if store.queued().await == 0 {
        tracing::info!("No tasks found in the pending section");
        return Ok(());
    }

    let settings = PoolSettings {
        concurrency_limit: jobs.unwrap_or(cfg.max_parallel_jobs),
        logs_dir,
        launcher: launcher(cfg, config_path)?,
    };
    tracing::debug!(program = %settings.launcher.program.display(), "worker launcher");

    let summary = run_pool(&store, &settings).await.map_err(|e| {
        tracing::error!("scheduler stopped: {:#}", e);
        e
    })?;
    tracing::info!(
        "All tasks completed: {} executed, {} succeeded, {} failed",
        summary.executed,
        summary.succeeded,
        summary.failed
    );
    Ok(())
}
