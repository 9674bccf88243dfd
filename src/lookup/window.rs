//! Lookup date window.

use chrono::{DateTime, Months, Utc};
use serde::Serialize;

/// Window a windowed domain was read over.
///
/// Only `from` filters records; `to` reports when the lookup ran, so future
/// plans and registrations past it are still included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DateRange {
    /// Cutoff: records before this are excluded
    pub from: DateTime<Utc>,
    /// Time of the lookup
    pub to: DateTime<Utc>,
}

impl DateRange {
    /// Window of `months` calendar months ending at `now`
    pub fn months_back(now: DateTime<Utc>, months: u32) -> Self {
        let from = now
            .checked_sub_months(Months::new(months))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        Self { from, to: now }
    }

    /// Cutoff date
    pub const fn cutoff(&self) -> DateTime<Utc> {
        self.from
    }

    /// Whether `at` is on or after the cutoff
    pub fn admits(&self, at: DateTime<Utc>) -> bool {
        at >= self.from
    }
}
