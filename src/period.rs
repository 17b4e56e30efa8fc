// Reporting windows and the equal-length period that precedes them.

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone};
use serde::Serialize;
use tracing::warn;

use crate::types::{RawRow, WindowLabel};

const ISO_FORMAT: &str = "%Y-%m-%d";

/// Inclusive calendar date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateWindow {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

impl DateWindow {
    /// Build a window, swapping reversed bounds.
    pub fn new(from: NaiveDate, to: NaiveDate) -> Self {
        if to < from {
            Self { from: to, to: from }
        } else {
            Self { from, to }
        }
    }

    /// Window from user supplied bounds.
    ///
    /// An absent or unreadable bound means no filtering was requested, so this
    /// returns `None` instead of an error.
    pub fn from_bounds(from: Option<&str>, to: Option<&str>) -> Option<Self> {
        let (from_raw, to_raw) = match (from, to) {
            (Some(f), Some(t)) if !f.trim().is_empty() && !t.trim().is_empty() => (f, t),
            _ => return None,
        };
        match (parse_iso_date(from_raw), parse_iso_date(to_raw)) {
            (Some(f), Some(t)) => Some(Self::new(f, t)),
            _ => {
                warn!(from = from_raw, to = to_raw, "ignoring unreadable date range");
                None
            }
        }
    }

    /// Number of days between the bounds (`0` for a single-day window).
    pub fn span_days(&self) -> i64 {
        (self.to - self.from).num_days()
    }

    pub fn contains_iso(&self, iso: &str) -> bool {
        let from = self.from.format(ISO_FORMAT).to_string();
        let to = self.to.format(ISO_FORMAT).to_string();
        from.as_str() <= iso && iso <= to.as_str()
    }

    pub fn label(&self) -> WindowLabel {
        WindowLabel {
            from: self.from.format(ISO_FORMAT).to_string(),
            to: self.to.format(ISO_FORMAT).to_string(),
        }
    }
}

/// The window of equal span that ends the day before `window.from`.
pub fn previous_period(window: &DateWindow) -> DateWindow {
    let to = window.from - Duration::days(1);
    let from = to - Duration::days(window.span_days());
    DateWindow { from, to }
}

fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    to_iso_date(s).and_then(|iso| NaiveDate::parse_from_str(&iso, ISO_FORMAT).ok())
}

/// Normalize a spreadsheet date cell to `YYYY-MM-DD`.
///
/// Accepts ISO dates, ISO date-times (time part dropped, no timezone
/// shifting), `YYYY/MM/DD` and US style `MM/DD/YYYY`.
pub fn to_iso_date(raw: &str) -> Option<String> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, ISO_FORMAT) {
        return Some(d.format(ISO_FORMAT).to_string());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S%.f"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date().format(ISO_FORMAT).to_string());
        }
    }
    // Offsets such as "Z" or "+08:00": keep the calendar date as written.
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive().format(ISO_FORMAT).to_string());
    }
    for fmt in ["%Y/%m/%d", "%m/%d/%Y"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d.format(ISO_FORMAT).to_string());
        }
    }
    None
}

/// Format an instant as a zero padded date in the calendar of `zone`.
pub fn iso_date_in<Tz: TimeZone, Z: TimeZone>(instant: &DateTime<Tz>, zone: &Z) -> String {
    instant
        .with_timezone(zone)
        .date_naive()
        .format(ISO_FORMAT)
        .to_string()
}

/// Format an instant as a zero padded date in the local calendar.
pub fn iso_date_local<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    iso_date_in(instant, &Local)
}

/// Keep rows whose `date_field` falls inside `window` (inclusive).
///
/// With no window the rows are returned unchanged. Rows with a missing or
/// unreadable date are dropped while a window is active.
pub fn filter_by_range(rows: &[RawRow], date_field: &str, window: Option<&DateWindow>) -> Vec<RawRow> {
    let Some(window) = window else {
        return rows.to_vec();
    };
    rows.iter()
        .filter(|row| {
            row.get(date_field)
                .and_then(|cell| to_iso_date(&cell.as_string()))
                .map(|iso| window.contains_iso(&iso))
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}
