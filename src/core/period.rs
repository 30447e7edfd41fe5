//! Budget period resolution for "now" and for arbitrary expense dates.

use std::sync::Arc;

use chrono::{Datelike, NaiveDate};

use crate::core::time::Clock;
use crate::domain::period::{BudgetPeriod, Frequency};

/// Derives accounting periods from a [`Clock`].
#[derive(Clone)]
pub struct PeriodResolver {
    clock: Arc<dyn Clock>,
}

impl PeriodResolver {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// `(year, month)` for today, month 1-indexed.
    pub fn current_period(&self) -> (i32, u32) {
        period_of(self.clock.today())
    }

    /// The active period of the given frequency.
    pub fn current(&self, frequency: Frequency) -> BudgetPeriod {
        BudgetPeriod::containing(self.clock.today(), frequency)
    }

    /// Periods an expense created now may link to, in lookup order.
    pub fn current_candidates(&self) -> [BudgetPeriod; 2] {
        [self.current(Frequency::Monthly), self.current(Frequency::Weekly)]
    }
}

/// `(year, month)` containing `date`, month 1-indexed.
pub fn period_of(date: NaiveDate) -> (i32, u32) {
    (date.year(), date.month())
}
