//! `ozi status` – show the pending and completed sections of a task document.

use std::fmt::Write;
use std::path::Path;

use anyhow::Result;
use ozi_core::tasks::{self, TaskDocument};

pub(crate) fn render_status(doc: &TaskDocument) -> String {
    let mut out = String::new();
    if doc.pending.is_empty() && doc.completed.is_empty() {
        out.push_str("No tasks in document.\n");
        return out;
    }

    let _ = writeln!(out, "Pending: {}", doc.pending.len());
    if !doc.pending.is_empty() {
        let _ = writeln!(
            out,
            "{:<18} {:<12} {:<12} {:<4} {}",
            "TASK", "FROM", "TO", "RES", "COUNTRIES"
        );
        for t in &doc.pending {
            let _ = writeln!(
                out,
                "{:<18} {:<12} {:<12} {:<4} {}",
                t.code.as_str(),
                t.date_from.to_string(),
                t.date_to.to_string(),
                t.resolution.as_str(),
                t.countries.join(" ")
            );
        }
    }

    let _ = writeln!(out, "Completed: {}", doc.completed.len());
    if !doc.completed.is_empty() {
        let _ = writeln!(
            out,
            "{:<18} {:<10} {:<5} {:<20} {:<20} {}",
            "TASK", "STATUS", "EXIT", "STARTED", "FINISHED", "COUNTRIES"
        );
        for r in &doc.completed {
            let exit = r
                .exit_code
                .map(|c| c.to_string())
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "{:<18} {:<10} {:<5} {:<20} {:<20} {}",
                r.task.code.as_str(),
                r.status.as_str(),
                exit,
                r.started.format("%Y-%m-%d %H:%M:%S").to_string(),
                r.finished.format("%Y-%m-%d %H:%M:%S").to_string(),
                r.task.countries.join(" ")
            );
            if let Some(err) = &r.error {
                let _ = writeln!(out, "    error: {}", err);
            }
        }
    }
    out
}

pub fn run_status(tasks_file: &Path) -> Result<()> {
    let doc = tasks::load(tasks_file)?;
    print!("{}", render_status(&doc));
    Ok(())
}
