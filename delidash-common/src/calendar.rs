//! Calendar helpers and locale-fixed labels

use chrono::{Datelike, NaiveDate, NaiveDateTime};

/// Weekday labels in the source-data locale, Monday first
pub const WEEKDAY_LABELS: [&str; 7] = ["月", "火", "水", "木", "金", "土", "日"];

/// Single-character weekday label for a date
pub fn weekday_label(date: NaiveDate) -> &'static str {
    WEEKDAY_LABELS[date.weekday().num_days_from_monday() as usize]
}

/// Format a date with its weekday label, e.g. `2024-05-01 (水)`
pub fn format_date_with_weekday(date: NaiveDate) -> String {
    format!("{} ({})", date.format("%Y-%m-%d"), weekday_label(date))
}

/// Parse a date in any of the formats the source files use: ISO
/// (`2024-05-01`), slash-separated (`2024/5/1`), compact (`20240501`),
/// or a datetime cell serialized with a time component.
pub fn parse_flexible_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%Y%m%d"] {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Some(date);
        }
    }
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(datetime) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Some(datetime.date());
        }
    }
    None
}
