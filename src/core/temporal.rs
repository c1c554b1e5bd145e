use chrono::{DateTime, Duration, NaiveDate};

use super::task::TaskDate;

/// Format used by the date picker and for long-past/far-future dates.
const ABSOLUTE_FORMAT: &str = "%-d %b %y";

/// Parse any date string the app produces: an RFC 3339 timestamp
/// (note/task `createdAt`), an ISO date, or the picker's "10 Mar 26" form
/// with either a two- or four-digit year.
pub fn parse_flexible_date(input: &str) -> Option<NaiveDate> {
    let input = input.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%d", "%d %b %y", "%d %b %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(input, fmt) {
            return Some(date);
        }
    }
    None
}

pub fn format_absolute(date: NaiveDate) -> String {
    date.format(ABSOLUTE_FORMAT).to_string()
}

/// Sort key for the active-task projection: `Today` and `Tomorrow` sort
/// first, absolute dates by their midnight timestamp, and `No Date` (or
/// anything unparseable) after every real date.
pub fn date_rank(date: &TaskDate) -> i64 {
    match date {
        TaskDate::Today => 0,
        TaskDate::Tomorrow => 1,
        TaskDate::NoDate => i64::MAX,
        TaskDate::Absolute(s) => parse_flexible_date(s)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map_or(i64::MAX, |dt| dt.and_utc().timestamp_millis()),
    }
}

/// Resolve a task date for the outbound sync payload. `None` means the
/// remote date field should be cleared.
pub fn resolve_sync_date(date: &TaskDate, today: NaiveDate) -> Option<NaiveDate> {
    match date {
        TaskDate::Today => Some(today),
        TaskDate::Tomorrow => Some(today + Duration::days(1)),
        TaskDate::NoDate => None,
        TaskDate::Absolute(s) => Some(parse_flexible_date(s).unwrap_or(today)),
    }
}

/// Human-relative rendering of a stored date, with `today` passed in
/// explicitly so callers (and tests) control the clock.
pub fn format_relative_date(input: &str, today: NaiveDate) -> String {
    let Some(date) = parse_flexible_date(input) else {
        return "Today".to_string();
    };

    let diff_days = (today - date).num_days();

    match diff_days {
        0 => "Today".to_string(),
        1 => "Yesterday".to_string(),
        -1 => "Tomorrow".to_string(),
        2..=6 => format!("{} days ago", diff_days),
        7..=29 => format!("{} weeks ago", diff_days / 7),
        -6..=-2 => format!("{} days ahead", -diff_days),
        -29..=-7 => format!("{} weeks ahead", -diff_days / 7),
        _ => format_absolute(date),
    }
}
