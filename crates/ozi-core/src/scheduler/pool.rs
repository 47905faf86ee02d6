//! Bounded worker pool over the task store.
//!
//! Spawns `min(limit, pending)` workers. Each pulls tasks until the store is
//! drained, runs every task as a child process with stdout/stderr appended to
//! a per-task log file, and moves the task to `completed`. Failed tasks do not
//! affect siblings and are never re-queued; only a failed document write stops
//! the run.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;

use super::command::{log_file_name, Launcher};
use crate::tasks::{Task, TaskRecord, TaskStatus, TaskStore};

/// Pool configuration for one run.
#[derive(Debug, Clone)]
pub struct PoolSettings {
    /// Maximum number of tasks running at once.
    pub concurrency_limit: usize,
    /// Directory for per-task logs (created if missing).
    pub logs_dir: PathBuf,
    pub launcher: Launcher,
}

/// What a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PoolSummary {
    pub workers: usize,
    pub executed: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Default)]
struct WorkerStats {
    executed: usize,
    succeeded: usize,
}

/// Run every pending task in `store`; returns once all workers found the
/// queue empty.
pub async fn run_pool(store: &TaskStore, settings: &PoolSettings) -> Result<PoolSummary> {
    tokio::fs::create_dir_all(&settings.logs_dir)
        .await
        .with_context(|| format!("create logs dir: {}", settings.logs_dir.display()))?;

    let pending = store.queued().await;
    let workers = settings.concurrency_limit.max(1).min(pending);
    tracing::info!("Found {} tasks to process", pending);
    tracing::info!("Starting {} workers", workers);

    let settings = Arc::new(settings.clone());
    let pid = std::process::id();
    let mut join_set = tokio::task::JoinSet::new();
    for worker_id in 1..=workers {
        let store = store.clone();
        let settings = Arc::clone(&settings);
        join_set.spawn(async move { run_worker(worker_id, store, settings, pid).await });
    }

    let mut summary = PoolSummary {
        workers,
        ..PoolSummary::default()
    };
    while let Some(res) = join_set.join_next().await {
        let stats = res.map_err(|e| anyhow::anyhow!("worker task join: {}", e))??;
        summary.executed += stats.executed;
        summary.succeeded += stats.succeeded;
    }
    summary.failed = summary.executed - summary.succeeded;
    Ok(summary)
}

async fn run_worker(
    worker_id: usize,
    store: TaskStore,
    settings: Arc<PoolSettings>,
    pid: u32,
) -> Result<WorkerStats> {
    let mut stats = WorkerStats::default();
    while let Some(task) = store.take_one().await {
        let record = execute_task(worker_id, &task, &settings, pid).await;
        stats.executed += 1;
        if record.status == TaskStatus::Completed {
            stats.succeeded += 1;
        }
        store
            .complete(record)
            .await
            .with_context(|| format!("record completion of {}", task.describe()))?;
    }
    tracing::debug!(worker_id, "queue empty, worker exiting");
    Ok(stats)
}

async fn execute_task(worker_id: usize, task: &Task, settings: &PoolSettings, pid: u32) -> TaskRecord {
    let log_path = settings.logs_dir.join(log_file_name(pid, task));
    let command = settings.launcher.render(task);
    tracing::info!("Process {} starting task: {}", worker_id, task.describe());

    let started = Local::now().naive_local();
    let outcome = spawn_and_wait(&settings.launcher, task, &log_path).await;
    let finished = Local::now().naive_local();

    match outcome {
        Ok(exit) => {
            let status = if exit.success() {
                TaskStatus::Completed
            } else {
                TaskStatus::Failed
            };
            match exit.code() {
                Some(0) => tracing::info!(
                    "Process {} finished task: {} - completed",
                    worker_id,
                    task.describe()
                ),
                Some(code) => tracing::info!(
                    "Process {} finished task: {} - failed (code {})",
                    worker_id,
                    task.describe(),
                    code
                ),
                None => tracing::info!(
                    "Process {} finished task: {} - failed (terminated by signal)",
                    worker_id,
                    task.describe()
                ),
            }
            TaskRecord {
                task: task.clone(),
                started,
                finished,
                status,
                command,
                exit_code: exit.code(),
                error: None,
            }
        }
        Err(e) => {
            tracing::error!(
                "Process {} error in task {}: {:#}",
                worker_id,
                task.describe(),
                e
            );
            TaskRecord {
                task: task.clone(),
                started,
                finished,
                status: TaskStatus::Failed,
                command,
                exit_code: None,
                error: Some(format!("{:#}", e)),
            }
        }
    }
}

/// Start the child with stdout and stderr appended to `log_path` and wait.
async fn spawn_and_wait(launcher: &Launcher, task: &Task, log_path: &Path) -> Result<ExitStatus> {
    let out = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("open task log: {}", log_path.display()))?;
    let err = out
        .try_clone()
        .with_context(|| format!("clone task log handle: {}", log_path.display()))?;

    let status = tokio::process::Command::new(&launcher.program)
        .args(launcher.args_for(task))
        .stdin(Stdio::null())
        .stdout(Stdio::from(out))
        .stderr(Stdio::from(err))
        .status()
        .await
        .with_context(|| format!("launch {}", launcher.program.display()))?;
    Ok(status)
}
