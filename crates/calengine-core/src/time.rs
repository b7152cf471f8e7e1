//! Clock abstraction for "today" in the sync timezone.
//!
//! Overdue detection and recurrence windows depend on the current date. The
//! engine reads it through [`Clock`] so tests can pin it.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Source of the current date and time.
pub trait Clock: Send + Sync {
    /// Current instant.
    fn now(&self) -> DateTime<Utc>;

    /// Current date in the sync timezone.
    fn today(&self) -> NaiveDate;
}

/// Wall clock evaluated in a fixed timezone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    tz: Tz,
}

impl SystemClock {
    pub fn new(tz: Tz) -> Self {
        Self { tz }
    }

    pub fn timezone(&self) -> Tz {
        self.tz
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new(Tz::UTC)
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn today(&self) -> NaiveDate {
        today_in(self.now(), self.tz)
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    now: DateTime<Utc>,
    tz: Tz,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>, tz: Tz) -> Self {
        Self { now, tz }
    }

    /// A clock at noon UTC on `date`.
    pub fn on_date(date: NaiveDate) -> Self {
        let noon = date.and_hms_opt(12, 0, 0).unwrap_or_default().and_utc();
        Self::new(noon, Tz::UTC)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn today(&self) -> NaiveDate {
        today_in(self.now, self.tz)
    }
}

/// The calendar date of `instant` as observed in `tz`.
pub fn today_in(instant: DateTime<Utc>, tz: Tz) -> NaiveDate {
    instant.with_timezone(&tz).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_on_date() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        assert_eq!(FixedClock::on_date(date).today(), date);
    }

    #[test]
    fn timezone_changes_the_date() {
        // 2025-01-01 20:00 UTC is already 2025-01-02 in Shanghai.
        let instant = Utc.with_ymd_and_hms(2025, 1, 1, 20, 0, 0).unwrap();
        let shanghai = FixedClock::new(instant, chrono_tz::Asia::Shanghai);
        let utc = FixedClock::new(instant, Tz::UTC);

        assert_eq!(shanghai.today(), NaiveDate::from_ymd_opt(2025, 1, 2).unwrap());
        assert_eq!(utc.today(), NaiveDate::from_ymd_opt(2025, 1, 1).unwrap());
    }

    #[test]
    fn system_clock_reports_timezone() {
        let clock = SystemClock::new(chrono_tz::America::New_York);
        assert_eq!(clock.timezone(), chrono_tz::America::New_York);
        assert!(clock.now() <= Utc::now());
    }
}
