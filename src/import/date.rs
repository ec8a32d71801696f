//! Statement date parsing
//!
//! Bank exports write dates as `DD.MM.YYYY` (sometimes with `/` or `-`
//! separators, sometimes with two-digit years). The ledger stores epoch
//! milliseconds, so parsed dates are normalized to UTC midnight.

use chrono::NaiveDate;

/// Parse a statement date into epoch milliseconds (UTC midnight)
///
/// Accepts `DD.MM.YYYY`, `DD/MM/YYYY`, `DD-MM-YYYY`, and two-digit years
/// (normalized by adding 2000 when below 100). ISO `YYYY-MM-DD` is accepted
/// as a secondary format. Returns `None` when nothing matches; the caller
/// decides the fallback.
pub fn parse_statement_date(s: &str) -> Option<i64> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let parts: Vec<&str> = s.split(['.', '/', '-']).collect();
    if parts.len() == 3 {
        // Year-first means ISO order, otherwise day-first
        if parts[0].len() == 4 {
            if let Some(date) = ymd(parts[0], parts[1], parts[2]) {
                return Some(to_epoch_ms(date));
            }
        } else if let Some(date) = ymd(parts[2], parts[1], parts[0]) {
            return Some(to_epoch_ms(date));
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .map(to_epoch_ms)
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    let mut year: i32 = year.parse().ok()?;
    let month: u32 = month.parse().ok()?;
    let day: u32 = day.parse().ok()?;
    if year < 100 {
        year += 2000;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn to_epoch_ms(date: NaiveDate) -> i64 {
    date.and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc().timestamp_millis())
        .unwrap_or(0)
}

/// Epoch milliseconds for a calendar date; test and caller convenience
pub fn epoch_ms(year: i32, month: u32, day: u32) -> Option<i64> {
    NaiveDate::from_ymd_opt(year, month, day).map(to_epoch_ms)
}
