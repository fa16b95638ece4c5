//! Due-date resolution
//!
//! Turns what the user typed ("tomorrow", "next week", "2026-01-20", "March 3, 2027")
//! into the canonical `YYYY-MM-DD` form stored in the database.

use chrono::{DateTime, Duration, FixedOffset, Local, NaiveDate, Utc};

use crate::error::{Result, TaskError};

/// Canonical storage format for due dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamps with an explicit offset, kept on the calendar day they were written in
const OFFSET_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S%z", "%Y-%m-%d %H:%M:%S %z", "%Y-%m-%d %H:%M%z"];

/// Current local calendar date
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Resolve user input to a canonical date string.
pub fn resolve(input: &str) -> Result<String> {
    resolve_date(input, today()).map(format_date)
}

/// Resolve user input relative to `today`.
///
/// The fixed phrases are matched case-insensitively. Timestamps with an explicit
/// offset keep the day they were written in. Anything else goes to `dateparser`.
/// The time of day is always discarded.
pub fn resolve_date(input: &str, today: NaiveDate) -> Result<NaiveDate> {
    let text = input.trim().to_lowercase();

    match text.as_str() {
        "today" => return Ok(today),
        "tomorrow" => return Ok(today + Duration::days(1)),
        "next week" => return Ok(today + Duration::days(7)),
        // Approximate: 30 days per month
        "next month" => return Ok(today + Duration::days(30)),
        "" => return Err(TaskError::DateParse { input: input.to_string() }),
        _ => {}
    }

    if let Ok(date) = NaiveDate::parse_from_str(&text, DATE_FORMAT) {
        return Ok(date);
    }

    let raw = input.trim();
    if let Some(dt) = parse_with_offset(raw) {
        return Ok(dt.date_naive());
    }

    // Interpreting in UTC keeps a bare calendar date on the same day.
    dateparser::parse_with_timezone(raw, &Utc)
        .map(|dt| dt.date_naive())
        .map_err(|e| {
            tracing::debug!(input, error = %e, "date parse failed");
            TaskError::DateParse { input: input.to_string() }
        })
}

fn parse_with_offset(raw: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .or_else(|| OFFSET_FORMATS.iter().find_map(|f| DateTime::parse_from_str(raw, f).ok()))
}

/// Check that stored or imported text is already a canonical date.
pub fn is_canonical(text: &str) -> bool {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map(|d| format_date(d) == text)
        .unwrap_or(false)
}
