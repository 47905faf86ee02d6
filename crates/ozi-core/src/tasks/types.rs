//! Types of the task document.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Extraction kind run by a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskCode {
    #[serde(rename = "ASNS")]
    Asns,
    #[serde(rename = "STATS_1D")]
    Stats1d,
    #[serde(rename = "STATS_5M")]
    Stats5m,
    #[serde(rename = "ASN_NEIGHBOURS")]
    AsnNeighbours,
    #[serde(rename = "TRAFFIC")]
    Traffic,
    #[serde(rename = "INTERNET_QUALITY")]
    InternetQuality,
}

impl TaskCode {
    pub const ALL: [TaskCode; 6] = [
        TaskCode::Asns,
        TaskCode::Stats1d,
        TaskCode::Stats5m,
        TaskCode::AsnNeighbours,
        TaskCode::Traffic,
        TaskCode::InternetQuality,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskCode::Asns => "ASNS",
            TaskCode::Stats1d => "STATS_1D",
            TaskCode::Stats5m => "STATS_5M",
            TaskCode::AsnNeighbours => "ASN_NEIGHBOURS",
            TaskCode::Traffic => "TRAFFIC",
            TaskCode::InternetQuality => "INTERNET_QUALITY",
        }
    }
}

impl fmt::Display for TaskCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TaskCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        TaskCode::ALL
            .into_iter()
            .find(|c| c.as_str() == upper)
            .ok_or_else(|| format!("unknown task code: {}", s))
    }
}

/// Sampling granularity of the task's dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Resolution {
    /// Daily.
    D,
    /// Weekly, on Mondays.
    W,
    /// Monthly, on the 1st.
    M,
}

impl Resolution {
    pub fn as_str(self) -> &'static str {
        match self {
            Resolution::D => "D",
            Resolution::W => "W",
            Resolution::M => "M",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resolution {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "D" | "d" => Ok(Resolution::D),
            "W" | "w" => Ok(Resolution::W),
            "M" | "m" => Ok(Resolution::M),
            other => Err(format!("unknown date resolution: {}", other)),
        }
    }
}

/// One unit of ETL work. Identity is structural equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Task {
    #[serde(rename = "task")]
    pub code: TaskCode,
    pub countries: Vec<String>,
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    #[serde(rename = "date-resolution")]
    pub resolution: Resolution,
}

impl Task {
    /// Short description for log lines: `ASNS NL,BE 2023-01-01..2023-12-31 M`.
    pub fn describe(&self) -> String {
        format!(
            "{} {} {}..{} {}",
            self.code,
            self.countries.join(","),
            self.date_from,
            self.date_to,
            self.resolution
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Completed,
    Failed,
}

impl TaskStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Completed => "completed",
            TaskStatus::Failed => "failed",
        }
    }
}

/// Outcome of one executed task. Written once, never changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TaskRecord {
    #[serde(flatten)]
    pub task: Task,
    pub started: NaiveDateTime,
    pub finished: NaiveDateTime,
    pub status: TaskStatus,
    pub command: String,
    /// Child exit code; absent when the process never ran or was killed by a signal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_code: Option<i32>,
    /// Launch failure text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// The durable aggregate: what is left to do and what has been done.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TaskDocument {
    #[serde(default, alias = "TASKS_QUEUE")]
    pub pending: Vec<Task>,
    #[serde(default, alias = "TASKS_DONE")]
    pub completed: Vec<TaskRecord>,
}
