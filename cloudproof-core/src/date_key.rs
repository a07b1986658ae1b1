//! Parsing of heatmap date keys.

use chrono::NaiveDate;

use crate::domain::CalendarDate;

const SEPARATORS: [char; 2] = ['-', '/'];

/// Parse a raw key such as `2025-02-20` or `2025/2/20` into a calendar date.
///
/// Returns `None` unless the key has exactly three all-digit parts that form
/// a real calendar day. Out-of-range parts do not roll over into the next
/// month or year.
pub fn parse_date_key(key: &str) -> Option<CalendarDate> {
    let mut parts = key.trim().split(SEPARATORS);
    let year = parse_part::<i32>(parts.next()?)?;
    let month = parse_part::<u32>(parts.next()?)?;
    let day = parse_part::<u32>(parts.next()?)?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn parse_part<T: std::str::FromStr>(part: &str) -> Option<T> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    part.parse().ok()
}
