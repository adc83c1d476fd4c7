//! Input validators

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

static DATE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{1,2})/(\d{1,2})/(\d{4})$").unwrap());

/// Whether a string parses as a well-formed absolute URL
pub fn is_valid_url(input: &str) -> bool {
    url::Url::parse(input).is_ok()
}

/// Whether a string is a real calendar date in `M/D/YYYY` form
///
/// The numeric month/day/year must round-trip exactly through calendar
/// construction, so 02/30/2024 is rejected while 02/29/2024 (a leap day)
/// is accepted.
pub fn is_valid_date(input: &str) -> bool {
    let captures = match DATE_PATTERN.captures(input) {
        Some(c) => c,
        None => return false,
    };

    let month: u32 = match captures[1].parse() {
        Ok(m) => m,
        Err(_) => return false,
    };
    let day: u32 = match captures[2].parse() {
        Ok(d) => d,
        Err(_) => return false,
    };
    let year: i32 = match captures[3].parse() {
        Ok(y) => y,
        Err(_) => return false,
    };

    NaiveDate::from_ymd_opt(year, month, day).is_some()
}

// ==================== Tests ====================
