//! # Date Rule Engine
//!
//! Decides whether a calendar day can be booked (selectable) or changed
//! (modifiable) at a given instant.
//!
//! ## Rules
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Reservation Rules                                │
//! │                                                                         │
//! │  LOCKOUT   anchor(date) - now < 48h        → locked                    │
//! │            (strict: exactly 48h away is still open)                    │
//! │                                                                         │
//! │  WEEKEND   Saturday or Sunday              → closed for new bookings   │
//! │                                                                         │
//! │                       │ locked │ weekend │                              │
//! │  ─────────────────────┼────────┼─────────┤                              │
//! │  is_selectable        │   ✗    │    ✗    │  new calendar selections     │
//! │  is_modifiable        │   ✗    │    ✓    │  existing reservations       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! `now` is always an argument. Callers read their clock at the moment of the
//! user action, because the lockout can flip while a page stays open.

use chrono::{DateTime, Datelike, Duration, NaiveDate, TimeZone, Weekday};

use crate::dates::anchor;
use crate::error::ValidationError;
use crate::LOCKOUT_HOURS;

/// Result type for rule checks.
pub type RuleResult = Result<(), ValidationError>;

/// The lockout window as a duration.
#[inline]
pub fn lockout_window() -> Duration {
    Duration::hours(LOCKOUT_HOURS)
}

/// Time left between `now` and the midday anchor of `date` (negative once past).
pub fn time_until<Tz: TimeZone>(date: NaiveDate, now: &DateTime<Tz>) -> Duration {
    anchor(date, &now.timezone()).signed_duration_since(now.clone())
}

/// True if `date` is less than 48 hours away from `now`.
///
/// ## Example
/// ```rust
/// use chrono::{Duration, NaiveDate, TimeZone, Utc};
/// use lunch_core::rules::is_locked_out;
///
/// let date = NaiveDate::from_ymd_opt(2025, 6, 10).unwrap();
/// let boundary = Utc.with_ymd_and_hms(2025, 6, 8, 12, 0, 0).unwrap();
///
/// assert!(!is_locked_out(date, &boundary));
/// assert!(is_locked_out(date, &(boundary + Duration::milliseconds(1))));
/// ```
pub fn is_locked_out<Tz: TimeZone>(date: NaiveDate, now: &DateTime<Tz>) -> bool {
    time_until(date, now) < lockout_window()
}

/// True if `date` is a Saturday or Sunday.
pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// True if `date` can be added to the pending selection.
pub fn is_selectable<Tz: TimeZone>(date: NaiveDate, now: &DateTime<Tz>) -> bool {
    !is_locked_out(date, now) && !is_weekend(date)
}

/// True if an existing reservation on `date` can still be changed or cancelled.
pub fn is_modifiable<Tz: TimeZone>(date: NaiveDate, now: &DateTime<Tz>) -> bool {
    !is_locked_out(date, now)
}

/// Like [`is_selectable`], but reports which rule failed.
///
/// The lockout is checked first, so a weekend day inside the window reports
/// `WithinLockout`.
pub fn check_selectable<Tz: TimeZone>(date: NaiveDate, now: &DateTime<Tz>) -> RuleResult {
    if is_locked_out(date, now) {
        return Err(ValidationError::WithinLockout { date });
    }

    if is_weekend(date) {
        return Err(ValidationError::Weekend { date });
    }

    Ok(())
}

/// Like [`is_modifiable`], but as a `Result`.
pub fn check_modifiable<Tz: TimeZone>(date: NaiveDate, now: &DateTime<Tz>) -> RuleResult {
    if is_locked_out(date, now) {
        return Err(ValidationError::WithinLockout { date });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
