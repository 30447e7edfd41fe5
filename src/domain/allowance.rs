//! Per-period budget record and the pure balance rules applied to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::common::{Displayable, Identifiable, Owned};
use crate::domain::owner::OwnerId;
use crate::domain::period::{BudgetPeriod, Frequency};
use crate::errors::{LedgerError, Result};

/// Spending ceiling for one period and what is left of it.
///
/// `0 <= remaining <= amount` holds for every committed record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowancePeriod {
    pub id: Uuid,
    pub owner: OwnerId,
    pub period: BudgetPeriod,
    pub frequency: Frequency,
    pub amount: i64,
    pub remaining: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl AllowancePeriod {
    pub fn new(owner: OwnerId, period: BudgetPeriod, amount: i64, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner,
            frequency: period.frequency(),
            period,
            amount,
            remaining: amount,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn spent(&self) -> i64 {
        self.amount - self.remaining
    }

    /// Clamps a proposed balance into `[0, amount]`.
    pub fn clamp_remaining(&self, proposed: i64) -> i64 {
        proposed.clamp(0, self.amount)
    }

    /// Balance after applying `delta` (positive deducts, negative refunds), clamped.
    pub fn adjusted_remaining(&self, delta: i64) -> i64 {
        self.clamp_remaining(self.remaining.saturating_sub(delta))
    }

    /// Balance after deducting `requested`, rejecting instead of clamping when it
    /// would go negative.
    pub fn checked_deduction(&self, requested: i64) -> Result<i64> {
        let projected = self.remaining.saturating_sub(requested);
        if projected < 0 {
            return Err(LedgerError::InsufficientBalance {
                current_balance: self.remaining,
                requested_amount: requested,
            });
        }
        Ok(projected)
    }
}

impl Identifiable for AllowancePeriod {
    fn id(&self) -> Uuid {
        self.id
    }
}

impl Owned for AllowancePeriod {
    fn owner(&self) -> &OwnerId {
        &self.owner
    }
}

impl Displayable for AllowancePeriod {
    fn display_label(&self) -> String {
        format!(
            "{} {} ({} of {} left)",
            self.frequency, self.period, self.remaining, self.amount
        )
    }
}

/// Rejects non-positive budget amounts.
pub fn validate_allowance_amount(amount: i64) -> Result<i64> {
    if amount <= 0 {
        return Err(LedgerError::validation(
            "amount",
            "allowance must be greater than zero",
        ));
    }
    Ok(amount)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowance(amount: i64, remaining: i64) -> AllowancePeriod {
        let mut record = AllowancePeriod::new(
            OwnerId::random(),
            BudgetPeriod::Month {
                year: 2026,
                month: 10,
            },
            amount,
            Utc::now(),
        );
        record.remaining = remaining;
        record
    }

    #[test]
    fn refunds_are_capped_at_the_ceiling() {
        let record = allowance(100_000, 70_000);
        assert_eq!(record.adjusted_remaining(-30_000), 100_000);
        assert_eq!(record.adjusted_remaining(-50_000), 100_000);
    }

    #[test]
    fn deductions_are_floored_at_zero_when_clamped() {
        let record = allowance(100_000, 10_000);
        assert_eq!(record.adjusted_remaining(25_000), 0);
    }

    #[test]
    fn checked_deduction_rejects_overdraft() {
        let record = allowance(100_000, 20_000);
        let err = record.checked_deduction(50_000).expect_err("overdraft");
        assert!(matches!(
            err,
            LedgerError::InsufficientBalance {
                current_balance: 20_000,
                requested_amount: 50_000
            }
        ));
        assert_eq!(record.checked_deduction(20_000).unwrap(), 0);
    }

    #[test]
    fn non_positive_amounts_are_invalid() {
        assert!(validate_allowance_amount(0).is_err());
        assert!(validate_allowance_amount(-5).is_err());
        assert_eq!(validate_allowance_amount(1).unwrap(), 1);
    }
}
