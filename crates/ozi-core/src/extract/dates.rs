//! Query dates for a task's period and resolution.

use chrono::{Datelike, Days, Months, NaiveDate};

use crate::tasks::Resolution;

/// Dates from `from` to `to` inclusive at the given resolution.
///
/// `W` starts on the first Monday on or after `from`; `M` on the first 1st of
/// a month on or after `from`.
pub fn generate_dates(from: NaiveDate, to: NaiveDate, resolution: Resolution) -> Vec<NaiveDate> {
    let start = match resolution {
        Resolution::D => Some(from),
        Resolution::W => {
            let offset = (7 - from.weekday().num_days_from_monday()) % 7;
            from.checked_add_days(Days::new(u64::from(offset)))
        }
        Resolution::M => {
            if from.day() == 1 {
                Some(from)
            } else {
                from.with_day(1)
                    .and_then(|d| d.checked_add_months(Months::new(1)))
            }
        }
    };

    let mut out = Vec::new();
    let mut cur = start;
    while let Some(d) = cur {
        if d > to {
            break;
        }
        out.push(d);
        cur = match resolution {
            Resolution::D => d.checked_add_days(Days::new(1)),
            Resolution::W => d.checked_add_days(Days::new(7)),
            Resolution::M => d.checked_add_months(Months::new(1)),
        };
    }
    out
}

/// Calendar-year windows covering `[from, to]`, each as `[start, end)`.
pub fn year_windows(from: NaiveDate, to: NaiveDate) -> Vec<(NaiveDate, NaiveDate)> {
    let Some(end_excl) = to.checked_add_days(Days::new(1)) else {
        return Vec::new();
    };
    (from.year()..=to.year())
        .filter_map(|year| {
            let jan1 = NaiveDate::from_ymd_opt(year, 1, 1)?;
            let next = NaiveDate::from_ymd_opt(year + 1, 1, 1)?;
            let start = from.max(jan1);
            let end = end_excl.min(next);
            (start < end).then_some((start, end))
        })
        .collect()
}
