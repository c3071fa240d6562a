use chrono::{Datelike, NaiveDate};
use serde_json::Value;

use crate::error::Result;

pub mod postgres;

pub use postgres::PriceStore;

/// Seam between the orchestrator and durable storage. One call persists one
/// day's raw record and monthly summary as a single atomic unit; a failure
/// leaves neither applied.
#[allow(async_fn_in_trait)]
pub trait DayStore {
    async fn persist_day(
        &self,
        coin_id: &str,
        day: NaiveDate,
        price: f64,
        document: &Value,
    ) -> Result<()>;
}

/// First calendar day of `day`'s month, the key for monthly aggregation.
pub fn month_bucket(day: NaiveDate) -> NaiveDate {
    day.with_day(1).unwrap_or(day)
}

/// Widen a tracked `[min, max]` range with a newly observed price. The merge
/// only ever expands the range, and is commutative and idempotent.
pub fn widen((min, max): (f64, f64), price: f64) -> (f64, f64) {
    (min.min(price), max.max(price))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid test date")
    }

    #[test]
    fn month_bucket_is_first_of_month() {
        assert_eq!(month_bucket(day(2024, 1, 30)), day(2024, 1, 1));
        assert_eq!(month_bucket(day(2024, 2, 1)), day(2024, 2, 1));
        assert_eq!(month_bucket(day(2023, 12, 31)), day(2023, 12, 1));
    }

    #[test]
    fn widening_is_commutative() {
        let seeded = (100.0, 100.0);
        let low_then_high = widen(widen(seeded, 80.0), 100.0);
        let high_then_low = widen(widen(seeded, 100.0), 80.0);
        assert_eq!(low_then_high, (80.0, 100.0));
        assert_eq!(high_then_low, (80.0, 100.0));
    }

    #[test]
    fn widening_is_idempotent() {
        let range = widen((80.0, 100.0), 90.0);
        assert_eq!(range, (80.0, 100.0));
        assert_eq!(widen(range, 90.0), range);
    }

    #[test]
    fn widening_never_shrinks() {
        let range = widen((80.0, 100.0), 95.0);
        assert_eq!(range, (80.0, 100.0));
        assert_eq!(widen(range, 120.0), (80.0, 120.0));
        assert_eq!(widen(range, 50.0), (50.0, 120.0));
    }
}
