use chrono::NaiveDate;

use crate::error::{AppError, Result};

/// Parse a calendar day from its CLI/ISO textual form.
pub fn parse_day(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| AppError::Validation(format!("invalid date `{}`; expected YYYY-MM-DD", raw.trim())))
}

/// Lazy inclusive sequence of calendar days, stepping one day at a time.
///
/// Cloning yields a fresh iterator over the same span, so a range can be
/// walked more than once.
#[derive(Debug, Clone)]
pub struct DayRange {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl DayRange {
    /// Build the range, rejecting an inverted span before any other work runs.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if start > end {
            return Err(AppError::Range { start, end });
        }
        Ok(Self {
            next: Some(start),
            end,
        })
    }

    /// Days remaining, end inclusive.
    pub fn len(&self) -> usize {
        match self.next {
            Some(next) => (self.end - next).num_days() as usize + 1,
            None => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.next.is_none()
    }
}

impl Iterator for DayRange {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<NaiveDate> {
        let day = self.next?;
        self.next = if day < self.end { day.succ_opt() } else { None };
        Some(day)
    }
}
