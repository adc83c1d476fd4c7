//! Size and date formatting helpers

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Scale a byte count to a human-readable string
///
/// Uses base 1024 and the largest unit not exceeding the value among
/// B, KB, MB and GB, with one decimal place for scaled values. Counts
/// beyond the GB scale saturate to GB.
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut index = 0;
    while value >= 1024.0 && index < UNITS.len() - 1 {
        value /= 1024.0;
        index += 1;
    }

    if index == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, UNITS[index])
    }
}

/// Parse a date-time representation leniently
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and bare `YYYY-MM-DD`
/// (midnight).
fn parse_date_time(input: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(input, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Render a date-time string with an explicit chrono format
///
/// Returns `None` when the input cannot be parsed. The format string is
/// explicit so output is deterministic across environments.
pub fn format_date_time(input: &str, format: &str) -> Option<String> {
    parse_date_time(input).map(|dt| dt.format(format).to_string())
}

/// Render the date part of a date-time string with an explicit chrono
/// format
pub fn format_date(input: &str, format: &str) -> Option<String> {
    parse_date_time(input).map(|dt| dt.date().format(format).to_string())
}

// ==================== Tests ====================
