//! Time source used for future/past decisions.
//!
//! Meetings carry local wall-clock times, so "now" is a `NaiveDateTime` in the
//! local timezone truncated to whole seconds, matching persisted precision.

use chrono::{Duration, Local, NaiveDateTime, Timelike};
use std::cell::Cell;

/// Supplies the current local time.
pub trait Clock {
    fn now(&self) -> NaiveDateTime;
}

/// Local system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        whole_seconds(Local::now().naive_local())
    }
}

/// Drops the sub-second part; meeting dates are stored at second precision.
pub fn whole_seconds(date: NaiveDateTime) -> NaiveDateTime {
    date.with_nanosecond(0).unwrap_or(date)
}

/// Manually driven clock, for tests and replays.
///
/// Time only moves through `set`/`advance`; share it by reference so the
/// owner of a manager can still move time forward.
#[derive(Debug, Clone)]
pub struct FixedClock {
    current: Cell<NaiveDateTime>,
}

impl FixedClock {
    pub fn new(current: NaiveDateTime) -> Self {
        Self {
            current: Cell::new(current),
        }
    }

    pub fn set(&self, current: NaiveDateTime) {
        self.current.set(current);
    }

    pub fn advance(&self, by: Duration) {
        self.current.set(self.current.get() + by);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.current.get()
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> NaiveDateTime {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::{whole_seconds, Clock, FixedClock, SystemClock};
    use chrono::{Duration, NaiveDate, Timelike};

    #[test]
    fn fixed_clock_returns_pinned_time() {
        let pinned = NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_opt(3, 4, 5))
            .expect("valid date");
        assert_eq!(FixedClock::new(pinned).now(), pinned);
    }

    #[test]
    fn fixed_clock_advances_through_shared_reference() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid date");
        let clock = FixedClock::new(start);
        let borrowed: &dyn Clock = &clock;
        clock.advance(Duration::hours(2));
        assert_eq!(borrowed.now(), start + Duration::hours(2));
    }

    #[test]
    fn system_clock_has_whole_seconds() {
        assert_eq!(SystemClock.now().nanosecond(), 0);
    }

    #[test]
    fn whole_seconds_drops_fraction_only() {
        let exact = NaiveDate::from_ymd_opt(2024, 6, 1)
            .and_then(|d| d.and_hms_opt(13, 0, 0))
            .expect("valid date");
        let fractional = exact + Duration::milliseconds(250);
        assert_eq!(whole_seconds(fractional), exact);
        assert_eq!(whole_seconds(exact), exact);
    }
}
