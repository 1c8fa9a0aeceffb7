//! Input normalization for externally supplied equity series.
//!
//! Collaborators hand the engine date/value pairs in whatever shape their
//! source produced. This module normalizes dates onto `NaiveDate` and values
//! onto finite `f64`s, dropping anything unparseable rather than failing the
//! whole load. Column detection and file ingestion live with the callers.

use crate::types::TimeSeries;
use chrono::{NaiveDate, NaiveDateTime};
use tracing::debug;

/// Fallback formats tried after the explicit date shapes.
const FALLBACK_FORMATS: &[&str] = &[
    "%Y/%m/%d",
    "%Y%m%d",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
];

const FALLBACK_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.fZ",
];

/// Normalize a date string onto a calendar date.
///
/// Accepted shapes, in order: `YYYY-MM-DD`, `M/D/YYYY` or `M/D/YY` (two-digit
/// years pivot at 50, mapping onto 1950–2049), `D.M.YYYY`, then a set of
/// common fallback formats. Returns `None` for anything else.
pub fn normalize_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(d);
    }

    if let Some(d) = parse_slash_date(s) {
        return Some(d);
    }

    if let Some(d) = parse_dot_date(s) {
        return Some(d);
    }

    for fmt in FALLBACK_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    for fmt in FALLBACK_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    None
}

/// `M/D/YYYY` or `M/D/YY`, the US shape common in exported CSVs.
fn parse_slash_date(s: &str) -> Option<NaiveDate> {
    let mut parts = s.splitn(3, '/');
    let month: u32 = parts.next()?.parse().ok()?;
    let day: u32 = parts.next()?.parse().ok()?;
    let year_str = parts.next()?;
    let year: i32 = match year_str.len() {
        4 => year_str.parse().ok()?,
        2 => {
            let y: i32 = year_str.parse().ok()?;
            if y < 50 {
                2000 + y
            } else {
                1900 + y
            }
        }
        _ => return None,
    };
    NaiveDate::from_ymd_opt(year, month, day)
}

/// `D.M.YYYY`, the dotted European shape.
fn parse_dot_date(s: &str) -> Option<NaiveDate> {
    let mut parts = s.splitn(3, '.');
    let day: u32 = parts.next()?.parse().ok()?;
    let month: u32 = parts.next()?.parse().ok()?;
    let year_str = parts.next()?;
    if year_str.len() != 4 {
        return None;
    }
    let year: i32 = year_str.parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Parse an equity value, tolerating currency symbols and thousands
/// separators. Returns `None` for non-finite or unparseable input.
pub fn parse_value(s: &str) -> Option<f64> {
    let cleaned: String = s.chars().filter(|c| *c != '$' && *c != ',').collect();
    let n: f64 = cleaned.trim().parse().ok()?;
    n.is_finite().then_some(n)
}

/// Build a series from raw (date, value) string records.
///
/// Rows that fail normalization are dropped silently; the drop count is only
/// visible at debug level.
pub fn series_from_records<I, A, B>(records: I) -> TimeSeries
where
    I: IntoIterator<Item = (A, B)>,
    A: AsRef<str>,
    B: AsRef<str>,
{
    let mut series = TimeSeries::new();
    let mut dropped = 0usize;
    for (date, value) in records {
        match (normalize_date(date.as_ref()), parse_value(value.as_ref())) {
            (Some(d), Some(v)) => series.insert(d, v),
            _ => dropped += 1,
        }
    }
    if dropped > 0 {
        debug!(dropped, kept = series.len(), "dropped unparseable records");
    }
    series
}
