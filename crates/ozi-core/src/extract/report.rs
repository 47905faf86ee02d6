//! Progress line rendering.

use super::progress::{ExtractionCounters, ExtractionProgress};

/// Width of the bar between the two `|`.
pub const BAR_LENGTH: usize = 50;

/// One progress line: bar with the current key embedded when it fits,
/// received/stored counts, label and percentage of keys processed.
pub fn render(counters: &ExtractionCounters, current: Option<&str>, label: &str) -> String {
    let fraction = counters.fraction();
    let filled = ((BAR_LENGTH as f64 * fraction) as usize).min(BAR_LENGTH);
    let rest = BAR_LENGTH - filled;

    let mut line = String::with_capacity(BAR_LENGTH * 3 + 64);
    line.push('|');
    line.push_str(&"█".repeat(filled));
    let mut trailing = None;
    match current {
        Some(cur) if rest > cur.chars().count() => {
            line.push('-');
            line.push_str(cur);
            line.push_str(&"-".repeat(rest - 1 - cur.chars().count()));
        }
        other => {
            line.push_str(&"-".repeat(rest));
            trailing = other;
        }
    }
    line.push('|');
    if let Some(cur) = trailing {
        line.push(' ');
        line.push_str(cur);
    }
    line.push_str(&format!(
        " Received: {}, Stored: {}   {} {:.1}%",
        counters.received_from_api,
        counters.stored_to_database,
        label,
        fraction * 100.0
    ));
    line
}

/// Print the current state of `progress` on stdout.
pub fn print_progress(progress: &ExtractionProgress, label: &str) {
    println!(
        "{}",
        render(&progress.snapshot(), progress.current().as_deref(), label)
    );
}
