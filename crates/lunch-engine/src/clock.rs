//! # Clock
//!
//! The engine reads the time through [`Clock`] at every decision point, so
//! the 48-hour rule is always evaluated against a fresh `now`.

use std::sync::{Mutex, PoisonError};

use chrono::{DateTime, Duration, Local, NaiveDate};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;

    /// Today's local calendar day.
    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to (tests, demos).
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Local>>,
}

impl ManualClock {
    pub fn new(now: DateTime<Local>) -> Self {
        ManualClock { now: Mutex::new(now) }
    }

    pub fn set(&self, now: DateTime<Local>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = now;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
