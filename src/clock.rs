use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

/// Time source for every service. Invoice numbers, due dates, reporting
/// windows, and audit stamps all derive from this seam so tests can pin the
/// calendar.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }
}

/// Wall-clock time.
#[derive(Debug, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to one instant, for tests.
#[derive(Debug, Clone)]
pub struct FixedClock {
    now: DateTime<Utc>,
}

impl FixedClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }
}

pub type SharedClock = Arc<dyn Clock>;

/// Adds `months` calendar months, clamping the day to the target month's
/// length (Jan 31 + 1 month lands on Feb 28/29).
pub fn add_months(when: DateTime<Utc>, months: u32) -> DateTime<Utc> {
    when.checked_add_months(chrono::Months::new(months))
        .unwrap_or(when)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn fixed_clock_returns_pinned_instant() {
        let instant = Utc.with_ymd_and_hms(2026, 1, 7, 12, 0, 0).unwrap();
        let clock = FixedClock::new(instant);
        assert_eq!(clock.now(), instant);
        assert_eq!(clock.today(), instant.date_naive());
    }

    #[test]
    fn add_months_clamps_to_month_end() {
        let jan_31 = Utc.with_ymd_and_hms(2026, 1, 31, 9, 30, 0).unwrap();
        let next = add_months(jan_31, 1);
        assert_eq!(next.date_naive(), NaiveDate::from_ymd_opt(2026, 2, 28).unwrap());
    }

    #[test]
    fn add_months_crosses_year_boundary() {
        let dec_15 = Utc.with_ymd_and_hms(2025, 12, 15, 0, 0, 0).unwrap();
        let next = add_months(dec_15, 1);
        assert_eq!(next.date_naive(), NaiveDate::from_ymd_opt(2026, 1, 15).unwrap());
    }
}
