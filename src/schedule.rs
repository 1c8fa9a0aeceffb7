//! Scheduled cash flows at observed month boundaries.

use crate::types::ContributionFrequency;
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// A recurring contribution (or withdrawal, when the amount is negative)
/// applied at month transitions observed on the simulated timeline.
///
/// An event fires on the first simulated date whose calendar month differs
/// from the previous simulated date's month — at most once per month, and
/// never on a fixed day-of-month. The schedule only compares consecutive
/// simulated dates: if an entire boundary month is missing from the timeline,
/// that month's event is skipped, not replayed later. Likewise the year is
/// not consulted, so a gap landing in the same calendar month one year later
/// does not fire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ContributionSchedule {
    /// Cash injected per qualifying transition; negative withdraws.
    pub amount: f64,
    /// Which month transitions qualify.
    pub frequency: ContributionFrequency,
}

impl ContributionSchedule {
    pub fn new(amount: f64, frequency: ContributionFrequency) -> Self {
        Self { amount, frequency }
    }

    /// Cash injected between the previous and current simulated date.
    pub fn injection(&self, prev: NaiveDate, curr: NaiveDate) -> f64 {
        if curr.month0() == prev.month0() {
            return 0.0;
        }
        if self.frequency.fires_on(curr.month0()) {
            self.amount
        } else {
            0.0
        }
    }
}
