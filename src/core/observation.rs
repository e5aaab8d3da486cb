//! Dated observations as submitted to the irregular pipeline.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// Date-only layouts accepted for the `Date` field.
const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y"];

/// Date-time layouts without an offset. `%.f` also matches an absent fraction.
const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Date-time layouts carrying an explicit offset.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%d %H:%M:%S%.f%z"];

/// Earliest and latest accepted calendar dates, as (year, month, day).
///
/// This is the span of a nanosecond timestamp in a signed 64-bit integer,
/// trimmed to whole days.
const EARLIEST_DATE: (i32, u32, u32) = (1677, 9, 22);
const LATEST_DATE: (i32, u32, u32) = (2262, 4, 11);

/// A single `(date, amount)` observation.
///
/// `amount` is `None` when the client sent `null` or left the field out; such
/// observations keep their day on the calendar but do not contribute to its
/// mean.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatedObservation {
    pub date: NaiveDate,
    pub amount: Option<f64>,
}

impl DatedObservation {
    pub fn new(date: NaiveDate, amount: Option<f64>) -> Self {
        Self { date, amount }
    }
}

/// Parse a client-supplied timestamp down to its calendar date.
///
/// Time of day is discarded. Offset-aware timestamps resolve to the date in
/// their own offset, not in UTC. Dates before 1677-09-22 or after 2262-04-11
/// are rejected.
pub fn parse_calendar_date(raw: &str) -> Option<NaiveDate> {
    let (earliest, latest) = supported_date_range();
    parse_any_layout(raw.trim()).filter(|date| (earliest..=latest).contains(date))
}

/// First and last calendar date a client may submit.
fn supported_date_range() -> (NaiveDate, NaiveDate) {
    let ymd = |(y, m, d): (i32, u32, u32)| NaiveDate::from_ymd_opt(y, m, d).unwrap_or_default();
    (ymd(EARLIEST_DATE), ymd(LATEST_DATE))
}

fn parse_any_layout(raw: &str) -> Option<NaiveDate> {
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    for fmt in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(raw, fmt) {
            return Some(dt.date_naive());
        }
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, fmt) {
            return Some(dt.date());
        }
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parses_plain_iso_dates() {
        assert_eq!(parse_calendar_date("2024-03-05"), Some(ymd(2024, 3, 5)));
        assert_eq!(parse_calendar_date(" 2024-03-05 "), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn drops_time_of_day() {
        assert_eq!(
            parse_calendar_date("2024-03-05 23:59:59"),
            Some(ymd(2024, 3, 5))
        );
        assert_eq!(
            parse_calendar_date("2024-03-05T08:15:00.250"),
            Some(ymd(2024, 3, 5))
        );
        assert_eq!(parse_calendar_date("2024-03-05T08:15"), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn offset_timestamps_keep_their_local_date() {
        assert_eq!(
            parse_calendar_date("2024-03-05T23:30:00-05:00"),
            Some(ymd(2024, 3, 5))
        );
        assert_eq!(
            parse_calendar_date("2024-03-05T00:30:00Z"),
            Some(ymd(2024, 3, 5))
        );
        assert_eq!(
            parse_calendar_date("2024-03-05 10:00:00+02:00"),
            Some(ymd(2024, 3, 5))
        );
    }

    #[test]
    fn parses_slash_layouts() {
        assert_eq!(parse_calendar_date("2024/03/05"), Some(ymd(2024, 3, 5)));
        // Month first, as in US-style spreadsheets.
        assert_eq!(parse_calendar_date("03/05/2024"), Some(ymd(2024, 3, 5)));
    }

    #[test]
    fn rejects_garbage() {
        assert_eq!(parse_calendar_date(""), None);
        assert_eq!(parse_calendar_date("yesterday"), None);
        assert_eq!(parse_calendar_date("2024-02-30"), None);
        assert_eq!(parse_calendar_date("2024-13-01"), None);
    }

    #[test]
    fn rejects_dates_outside_supported_range() {
        assert_eq!(parse_calendar_date("-262000-01-01"), None);
        assert_eq!(parse_calendar_date("+262000-01-01"), None);
        assert_eq!(parse_calendar_date("0001-01-01"), None);
        assert_eq!(parse_calendar_date("9999-12-31T00:00:00"), None);
        assert_eq!(parse_calendar_date("1677-09-21"), None);
        assert_eq!(parse_calendar_date("2262-04-12"), None);

        assert_eq!(parse_calendar_date("1677-09-22"), Some(ymd(1677, 9, 22)));
        assert_eq!(parse_calendar_date("2262-04-11"), Some(ymd(2262, 4, 11)));
    }
}
