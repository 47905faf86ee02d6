//! Rendering a task into a child-process invocation and a log file name.

use std::path::PathBuf;

use crate::tasks::Task;

/// Program and leading arguments used to run one task; the task's flags are
/// appended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launcher {
    pub program: PathBuf,
    pub leading_args: Vec<String>,
}

impl Launcher {
    pub fn new(program: impl Into<PathBuf>, leading_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            leading_args,
        }
    }

    /// Full argument list (after the program) for `task`.
    pub fn args_for(&self, task: &Task) -> Vec<String> {
        let mut args = self.leading_args.clone();
        args.extend(task_args(task));
        args
    }

    /// Space-joined command line, as recorded in the task record.
    pub fn render(&self, task: &Task) -> String {
        let mut parts = vec![self.program.display().to_string()];
        parts.extend(self.args_for(task));
        parts.join(" ")
    }
}

/// `--task CODE --countries C1 C2 --date-from YYYY-MM-DD --date-to YYYY-MM-DD --date-resolution R`
pub fn task_args(task: &Task) -> Vec<String> {
    let mut args = vec!["--task".to_string(), task.code.to_string(), "--countries".to_string()];
    args.extend(task.countries.iter().cloned());
    args.extend([
        "--date-from".to_string(),
        task.date_from.format("%Y-%m-%d").to_string(),
        "--date-to".to_string(),
        task.date_to.format("%Y-%m-%d").to_string(),
        "--date-resolution".to_string(),
        task.resolution.to_string(),
    ]);
    args
}

/// Per-task log name: `{pid}_{CODE}_{C1-C2}_{YYYYMMDD}_{YYYYMMDD}_{R}.log`.
pub fn log_file_name(pid: u32, task: &Task) -> String {
    let name = format!(
        "{}_{}_{}_{}_{}_{}",
        pid,
        task.code,
        task.countries.join("-"),
        task.date_from.format("%Y%m%d"),
        task.date_to.format("%Y%m%d"),
        task.resolution
    );
    format!("{}.log", sanitize_log_name(&name))
}

/// Replace path separators, whitespace and control characters with `_` and
/// cap the stem so the `.log` name stays within NAME_MAX.
fn sanitize_log_name(name: &str) -> String {
    const STEM_MAX: usize = 250;

    let mut out: String = name
        .chars()
        .map(|c| {
            if c == '/' || c == '\\' || c.is_whitespace() || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    if out.len() > STEM_MAX {
        let mut take = STEM_MAX;
        while take > 0 && !out.is_char_boundary(take) {
            take -= 1;
        }
        out.truncate(take);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tasks::{Resolution, TaskCode};
    use chrono::NaiveDate;

    fn task() -> Task {
        Task {
            code: TaskCode::AsnNeighbours,
            countries: vec!["NL".into(), "BE".into()],
            date_from: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
            date_to: NaiveDate::from_ymd_opt(2023, 6, 30).unwrap(),
            resolution: Resolution::W,
        }
    }

    #[test]
    fn args_one_flag_per_field() {
        assert_eq!(
            task_args(&task()).join(" "),
            "--task ASN_NEIGHBOURS --countries NL BE --date-from 2023-01-01 --date-to 2023-06-30 --date-resolution W"
        );
    }

    #[test]
    fn render_with_leading_args() {
        let l = Launcher::new("/usr/bin/ozi", vec!["extract".into()]);
        assert_eq!(
            l.render(&task()),
            "/usr/bin/ozi extract --task ASN_NEIGHBOURS --countries NL BE --date-from 2023-01-01 --date-to 2023-06-30 --date-resolution W"
        );
        assert_eq!(l.args_for(&task())[0], "extract");
    }

    #[test]
    fn log_name_is_deterministic() {
        assert_eq!(
            log_file_name(4242, &task()),
            "4242_ASN_NEIGHBOURS_NL-BE_20230101_20230630_W.log"
        );
    }

    #[test]
    fn log_name_sanitized() {
        let mut t = task();
        t.countries = vec!["../etc".into(), "a b".into()];
        let name = log_file_name(1, &t);
        assert!(!name.contains('/'));
        assert!(!name.contains(' '));
        assert!(name.ends_with("_W.log"));

        t.countries = vec!["X".repeat(400)];
        assert!(log_file_name(1, &t).len() <= 255);
    }
}
