//! # Date Wire Format
//!
//! Conversions between calendar dates, instants and the `YYYY-MM-DD` strings
//! stored by the backend.
//!
//! ## Why Local Dates and Midday Anchoring?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Off-by-one-day drift                                 │
//! │                                                                         │
//! │  Santiago (UTC-4), user clicks Tuesday 2025-06-10 at 22:30 local        │
//! │                                                                         │
//! │  UTC formatting:    2025-06-11T02:30Z  →  "2025-06-11"   ✗ wrong day    │
//! │  Local formatting:  2025-06-10T22:30   →  "2025-06-10"   ✓              │
//! │                                                                         │
//! │  Parsing back "2025-06-10":                                             │
//! │  at 00:00 local  → one DST shift or UTC rounding away from Monday  ✗    │
//! │  at 12:00 local  → twelve hours of margin on both sides            ✓    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Dates always leave the engine as the *local* calendar day, and come back
//! anchored at [`ANCHOR_HOUR`](crate::ANCHOR_HOUR) local time. The 48-hour
//! rule measures from that same anchor.

use chrono::{DateTime, Duration, LocalResult, NaiveDate, NaiveTime, TimeZone};

use crate::error::ValidationError;
use crate::ANCHOR_HOUR;

/// Wire format of a calendar date.
pub const YMD_FORMAT: &str = "%Y-%m-%d";

/// Formats a calendar date as `YYYY-MM-DD`.
pub fn to_ymd(date: NaiveDate) -> String {
    date.format(YMD_FORMAT).to_string()
}

/// The local calendar day of an instant, in the instant's own time zone.
///
/// ## Example
/// ```rust
/// use chrono::{FixedOffset, NaiveDate, TimeZone};
/// use lunch_core::dates::local_date;
///
/// let santiago = FixedOffset::west_opt(4 * 3600).unwrap();
/// let late_tuesday = santiago.with_ymd_and_hms(2025, 6, 10, 22, 30, 0).unwrap();
/// assert_eq!(local_date(&late_tuesday), NaiveDate::from_ymd_opt(2025, 6, 10).unwrap());
/// ```
pub fn local_date<Tz: TimeZone>(instant: &DateTime<Tz>) -> NaiveDate {
    instant.date_naive()
}

/// Formats the local calendar day of an instant (never its UTC day).
pub fn instant_to_ymd<Tz: TimeZone>(instant: &DateTime<Tz>) -> String {
    to_ymd(local_date(instant))
}

/// Parses a strict `YYYY-MM-DD` string.
pub fn parse_ymd(value: &str) -> Result<NaiveDate, ValidationError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::required("date"));
    }

    if value.len() != 10 {
        return Err(ValidationError::invalid_format("date", "expected YYYY-MM-DD"));
    }

    NaiveDate::parse_from_str(value, YMD_FORMAT)
        .map_err(|e| ValidationError::invalid_format("date", e.to_string()))
}

/// Anchors a calendar date at midday local time in `tz`.
///
/// ## DST Handling
/// - Unique local time: used as is
/// - Ambiguous (clock set back at noon): the earliest instant
/// - Skipped (clock set forward at noon): one hour later
pub fn anchor<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> DateTime<Tz> {
    let midday = date.and_time(anchor_time());

    match tz.from_local_datetime(&midday) {
        LocalResult::Single(instant) => instant,
        LocalResult::Ambiguous(earliest, _) => earliest,
        LocalResult::None => {
            let shifted = midday + Duration::hours(1);
            tz.from_local_datetime(&shifted)
                .earliest()
                .unwrap_or_else(|| tz.from_utc_datetime(&midday))
        }
    }
}

/// Parses `YYYY-MM-DD` and anchors it at midday local time in `tz`.
pub fn parse_anchored<Tz: TimeZone>(value: &str, tz: &Tz) -> Result<DateTime<Tz>, ValidationError> {
    parse_ymd(value).map(|date| anchor(date, tz))
}

fn anchor_time() -> NaiveTime {
    NaiveTime::from_hms_opt(ANCHOR_HOUR, 0, 0).unwrap_or(NaiveTime::MIN)
}

// =============================================================================
// Unit Tests
// =============================================================================
