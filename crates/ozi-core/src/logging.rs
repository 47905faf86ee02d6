//! Logging init: scheduler log file mirrored to stdout, or stderr only for
//! extraction child processes.

use anyhow::{Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::EnvFilter;

/// File name of the scheduler-wide log inside the logs directory.
pub const SCHEDULER_LOG: &str = "etl_scheduler.log";

const DEFAULT_FILTER: &str = "info,ozi_core=debug,ozi=debug";

/// Writer that copies every line to stdout and, when available, the log file.
struct TeeWriter {
    file: Option<fs::File>,
}

impl io::Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().lock().write_all(buf)?;
        if let Some(f) = self.file.as_mut() {
            f.write_all(buf)?;
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().lock().flush()?;
        match self.file.as_mut() {
            Some(f) => f.flush(),
            None => Ok(()),
        }
    }
}

struct TeeMakeWriter(fs::File);

impl<'a> MakeWriter<'a> for TeeMakeWriter {
    type Writer = TeeWriter;

    fn make_writer(&'a self) -> Self::Writer {
        // A failed clone degrades to console-only for that event.
        TeeWriter {
            file: self.0.try_clone().ok(),
        }
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Path of the scheduler log for a logs directory.
pub fn scheduler_log_path(logs_dir: &Path) -> PathBuf {
    logs_dir.join(SCHEDULER_LOG)
}

/// Initialize scheduler logging: append to `<logs_dir>/etl_scheduler.log` and
/// mirror every line to stdout. Creates the logs directory if needed.
/// On failure returns Err so the caller can fall back to stderr.
pub fn init_scheduler_logging(logs_dir: &Path) -> Result<()> {
    fs::create_dir_all(logs_dir)
        .with_context(|| format!("create logs dir: {}", logs_dir.display()))?;
    let log_file_path = scheduler_log_path(logs_dir);

    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_file_path)
        .with_context(|| format!("open scheduler log: {}", log_file_path.display()))?;

    let writer: BoxMakeWriter = BoxMakeWriter::new(TeeMakeWriter(file));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("install subscriber: {}", e))?;

    tracing::debug!("scheduler logging to {}", log_file_path.display());

    Ok(())
}

/// Initialize logging to stderr only (no file). Used by extraction child
/// processes, whose output the scheduler already captures per task, and as
/// the fallback when the scheduler log cannot be opened.
pub fn init_logging_stderr() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .try_init();
}
