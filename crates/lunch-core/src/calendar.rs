//! # Calendar Periods
//!
//! Week and month periods used by the calendar and the "my reservations"
//! list: which days a view shows, how it pages, and which reservations fall
//! inside it.
//!
//! Weeks start on Monday. A month view is padded to whole weeks so the grid
//! always has complete Monday..Sunday rows.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{MenuType, Reservation};

// =============================================================================
// View / Direction
// =============================================================================

/// Granularity of a calendar page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum CalendarView {
    #[default]
    Week,
    Month,
}

/// Paging direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Direction {
    Previous,
    Next,
}

// =============================================================================
// Period
// =============================================================================

/// An inclusive range of calendar days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Period {
    #[ts(as = "String")]
    pub start: NaiveDate,
    #[ts(as = "String")]
    pub end: NaiveDate,
}

impl Period {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Period { start, end }
    }

    /// True if `date` lies within `[start, end]`.
    #[inline]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every day of the period, in order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start.iter_days().take_while(move |d| *d <= end)
    }
}

/// Monday..Sunday week containing `date`.
pub fn week_of(date: NaiveDate) -> Period {
    let offset = u64::from(date.weekday().num_days_from_monday());
    let start = date - Days::new(offset);
    Period::new(start, start + Days::new(6))
}

/// First..last day of the month containing `date`.
pub fn month_of(date: NaiveDate) -> Period {
    let start = date.with_day(1).unwrap_or(date);
    let end = start
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(start);
    Period::new(start, end)
}

/// The period a view shows around `date`.
pub fn period_of(view: CalendarView, date: NaiveDate) -> Period {
    match view {
        CalendarView::Week => week_of(date),
        CalendarView::Month => month_of(date),
    }
}

/// Moves the focus date one page backwards or forwards.
///
/// Months clamp the day (Jan 31 → Feb 28) instead of overflowing.
pub fn shift(view: CalendarView, date: NaiveDate, direction: Direction) -> NaiveDate {
    let shifted = match (view, direction) {
        (CalendarView::Week, Direction::Next) => date.checked_add_days(Days::new(7)),
        (CalendarView::Week, Direction::Previous) => date.checked_sub_days(Days::new(7)),
        (CalendarView::Month, Direction::Next) => date.checked_add_months(Months::new(1)),
        (CalendarView::Month, Direction::Previous) => date.checked_sub_months(Months::new(1)),
    };
    shifted.unwrap_or(date)
}

/// The seven days of the week containing `date`, Monday first.
pub fn week_days(date: NaiveDate) -> [NaiveDate; 7] {
    let start = week_of(date).start;
    std::array::from_fn(|i| start + Days::new(i as u64))
}

/// The month grid around `date`: whole weeks covering the month.
pub fn month_grid(date: NaiveDate) -> Vec<NaiveDate> {
    let month = month_of(date);
    let grid = Period::new(week_of(month.start).start, week_of(month.end).end);
    grid.days().collect()
}

// =============================================================================
// Reservation List Filtering
// =============================================================================

/// Menu filter of the reservation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MenuFilter {
    #[default]
    All,
    Only(MenuType),
}

impl MenuFilter {
    #[inline]
    pub fn matches(&self, menu_type: MenuType) -> bool {
        match self {
            MenuFilter::All => true,
            MenuFilter::Only(wanted) => *wanted == menu_type,
        }
    }
}

/// Confirmed reservations inside `period` matching `filter`, sorted by date.
pub fn reservations_in_period(
    reservations: &[Reservation],
    period: Period,
    filter: MenuFilter,
) -> Vec<Reservation> {
    let mut selected: Vec<Reservation> = reservations
        .iter()
        .filter(|r| r.is_confirmed() && period.contains(r.date) && filter.matches(r.menu_type))
        .cloned()
        .collect();
    selected.sort_by_key(|r| r.date);
    selected
}

// =============================================================================
// Unit Tests
// =============================================================================
