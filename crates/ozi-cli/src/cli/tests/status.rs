//! Tests for the status subcommand.

use std::path::PathBuf;

use chrono::NaiveDate;
use ozi_core::tasks::{Resolution, Task, TaskCode, TaskDocument, TaskRecord, TaskStatus};

use super::parse;
use crate::cli::commands::render_status;
use crate::cli::CliCommand;

fn task(code: TaskCode, countries: &[&str]) -> Task {
    Task {
        code,
        countries: countries.iter().map(|c| c.to_string()).collect(),
        date_from: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        date_to: NaiveDate::from_ymd_opt(2024, 1, 7).unwrap(),
        resolution: Resolution::D,
    }
}

#[test]
fn cli_parse_status() {
    match parse(&["ozi", "status", "tasks.yaml"]) {
        CliCommand::Status { tasks_file } => assert_eq!(tasks_file, PathBuf::from("tasks.yaml")),
        _ => panic!("expected Status"),
    }
}

#[test]
fn render_status_empty_document() {
    assert_eq!(render_status(&TaskDocument::default()), "No tasks in document.\n");
}

#[test]
fn render_status_lists_both_sections() {
    let started = NaiveDate::from_ymd_opt(2024, 2, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();
    let finished = started + chrono::Duration::seconds(42);
    let doc = TaskDocument {
        pending: vec![task(TaskCode::Traffic, &["NL", "BE"])],
        completed: vec![
            TaskRecord {
                task: task(TaskCode::Asns, &["NL"]),
                started,
                finished,
                status: TaskStatus::Completed,
                command: "ozi extract --task ASNS".to_string(),
                exit_code: Some(0),
                error: None,
            },
            TaskRecord {
                task: task(TaskCode::Stats1d, &["DE"]),
                started,
                finished,
                status: TaskStatus::Failed,
                command: "missing-binary".to_string(),
                exit_code: None,
                error: Some("launch missing-binary".to_string()),
            },
        ],
    };

    let out = render_status(&doc);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines[0], "Pending: 1");
    assert!(lines[1].starts_with("TASK"));
    assert!(lines[2].starts_with("TRAFFIC"));
    assert!(lines[2].ends_with("NL BE"));
    assert!(lines[2].contains("2024-01-01"));
    assert_eq!(lines[3], "Completed: 2");
    assert!(lines[5].starts_with("ASNS"));
    assert!(lines[5].contains("completed"));
    assert!(lines[5].contains("2024-02-01 10:00:42"));
    assert!(lines[6].starts_with("STATS_1D"));
    assert!(lines[6].contains("failed"));
    assert_eq!(lines[7], "    error: launch missing-binary");
}
