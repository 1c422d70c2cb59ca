pub mod installments;
pub mod ledger_entries;
pub mod parties;
pub mod purchases;
pub mod reporting;
pub mod returns;
pub mod sales;
pub mod settlement;
pub mod skus;
pub mod stock_ledger;
pub mod stock_taking;

use chrono::{DateTime, Days, NaiveDate, NaiveTime, Utc};

/// Converts an inclusive date window into half-open UTC instants
/// `[start of from, start of the day after to)`.
pub(crate) fn window_bounds(from: NaiveDate, to: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = from.and_time(NaiveTime::MIN).and_utc();
    let end = to
        .checked_add_days(Days::new(1))
        .unwrap_or(to)
        .and_time(NaiveTime::MIN)
        .and_utc();
    (start, end)
}
