//! CLI for the OZI ETL scheduler.

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use ozi_core::config;
use ozi_core::tasks::{Resolution, TaskCode};

use commands::{run_extract, run_schedule, run_status};

/// Top-level CLI for the OZI ETL.
#[derive(Debug, Parser)]
#[command(name = "ozi")]
#[command(about = "OZI: network-measurement ETL scheduler and extractor", long_about = None)]
pub struct Cli {
    /// Config file to use instead of ~/.config/ozi/config.toml.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run every pending task of a task document, N at a time.
    Schedule {
        /// YAML task document (rewritten after every finished task).
        tasks_file: PathBuf,
        /// Maximum number of tasks running at once (default: max_parallel_jobs from config).
        #[arg(long, value_name = "N")]
        jobs: Option<usize>,
        /// Directory for the scheduler log and per-task logs (default: logs_dir from config).
        #[arg(long, value_name = "DIR")]
        logs_dir: Option<PathBuf>,
    },

    /// Extract one task's data into the warehouse (what the scheduler runs per task).
    Extract {
        /// ASNS, STATS_1D, STATS_5M, ASN_NEIGHBOURS, TRAFFIC or INTERNET_QUALITY.
        #[arg(short = 't', long)]
        task: TaskCode,
        /// ISO2 country codes.
        #[arg(short = 'c', long, num_args = 1.., required = true)]
        countries: Vec<String>,
        /// First date (YYYY-MM-DD).
        #[arg(long)]
        date_from: NaiveDate,
        /// Last date, inclusive (YYYY-MM-DD).
        #[arg(long)]
        date_to: NaiveDate,
        /// D (daily), W (weekly) or M (monthly).
        #[arg(long)]
        date_resolution: Resolution,
    },

    /// Show pending and completed tasks of a task document.
    Status {
        /// YAML task document.
        tasks_file: PathBuf,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let cfg = match &self.config {
            Some(path) => config::load_from_path(path)?,
            None => config::load_or_init()?,
        };

        match self.command {
            CliCommand::Schedule {
                tasks_file,
                jobs,
                logs_dir,
            } => run_schedule(&cfg, self.config.as_deref(), &tasks_file, jobs, logs_dir).await?,
            CliCommand::Extract {
                task,
                countries,
                date_from,
                date_to,
                date_resolution,
            } => {
                let task = ozi_core::tasks::Task {
                    code: task,
                    countries,
                    date_from,
                    date_to,
                    resolution: date_resolution,
                };
                run_extract(&cfg, task).await?
            }
            CliCommand::Status { tasks_file } => run_status(&tasks_file)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
