//! Business logic for the per-period allowance record.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rusqlite::Connection;
use uuid::Uuid;

use crate::core::period::PeriodResolver;
use crate::core::time::Clock;
use crate::domain::allowance::{validate_allowance_amount, AllowancePeriod};
use crate::domain::common::Displayable;
use crate::domain::owner::OwnerId;
use crate::domain::period::Frequency;
use crate::errors::LedgerError;
use crate::storage::sqlite::allowances;
use crate::storage::SqliteStore;

use super::ServiceResult;

/// Owns creation and re-budgeting of allowances, and is the only writer of
/// `remaining`.
#[derive(Clone)]
pub struct AllowanceService {
    store: SqliteStore,
    periods: PeriodResolver,
}

impl AllowanceService {
    pub fn new(store: SqliteStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            periods: PeriodResolver::new(clock),
        }
    }

    /// Returns the current period's allowance, creating it with `remaining = amount`
    /// only when absent. An existing record is returned unchanged.
    pub fn ensure_period(
        &self,
        owner: &OwnerId,
        amount: i64,
        frequency: Frequency,
    ) -> ServiceResult<AllowancePeriod> {
        let amount = validate_allowance_amount(amount)?;
        let period = self.periods.current(frequency);
        let now = self.periods.clock().now();
        self.store.write(|tx| {
            let candidate = AllowancePeriod::new(owner.clone(), period, amount, now);
            if allowances::insert_if_absent(tx, &candidate)? {
                tracing::info!(%owner, period = %period, amount, "allowance created");
            }
            allowances::find_by_period(tx, owner, &period)?.ok_or_else(|| {
                LedgerError::Storage(format!("allowance for {period} missing after insert"))
            })
        })
    }

    /// Creates or overwrites the current period's allowance, always resetting
    /// `remaining` to the new amount.
    pub fn set_amount(
        &self,
        owner: &OwnerId,
        amount: i64,
        frequency: Frequency,
    ) -> ServiceResult<AllowancePeriod> {
        let amount = validate_allowance_amount(amount)?;
        let period = self.periods.current(frequency);
        let now = self.periods.clock().now();
        let saved = self.store.write(|tx| {
            let record = AllowancePeriod::new(owner.clone(), period, amount, now);
            allowances::upsert_reset(tx, &record)?;
            allowances::find_by_period(tx, owner, &period)?.ok_or_else(|| {
                LedgerError::Storage(format!("allowance for {period} missing after upsert"))
            })
        })?;
        tracing::info!(%owner, allowance = %saved.display_label(), "allowance amount set");
        Ok(saved)
    }

    /// Applies `remaining = clamp(remaining - delta, 0, amount)` in its own transaction.
    pub fn adjust_remaining(&self, allowance_id: Uuid, delta: i64) -> ServiceResult<AllowancePeriod> {
        let now = self.periods.clock().now();
        self.store.write(|tx| {
            let mut allowance = allowances::find_by_id(tx, allowance_id)?
                .ok_or(LedgerError::NotFound(allowance_id))?;
            allowance.remaining = apply_adjustment(tx, &allowance, delta, now)?;
            allowance.updated_at = now;
            Ok(allowance)
        })
    }

    /// The allowance for the period active now, monthly before weekly.
    pub fn current(&self, owner: &OwnerId) -> ServiceResult<Option<AllowancePeriod>> {
        let candidates = self.periods.current_candidates();
        self.store
            .read(|conn| allowances::find_first_of(conn, owner, &candidates))
    }
}

/// Clamped adjustment used by edit/delete and [`AllowanceService::adjust_remaining`].
/// Runs inside the caller's transaction and returns the persisted balance.
pub(crate) fn apply_adjustment(
    conn: &Connection,
    allowance: &AllowancePeriod,
    delta: i64,
    now: DateTime<Utc>,
) -> ServiceResult<i64> {
    let remaining = allowance.adjusted_remaining(delta);
    if remaining != allowance.remaining.saturating_sub(delta) {
        tracing::debug!(
            allowance_id = %allowance.id,
            delta,
            remaining,
            "allowance balance clamped"
        );
    }
    allowances::update_remaining(conn, allowance.id, remaining, now)?;
    Ok(remaining)
}

/// Rejecting deduction used when an expense is first posted.
pub(crate) fn apply_checked_deduction(
    conn: &Connection,
    allowance: &AllowancePeriod,
    amount: i64,
    now: DateTime<Utc>,
) -> ServiceResult<i64> {
    let remaining = allowance.checked_deduction(amount)?;
    allowances::update_remaining(conn, allowance.id, remaining, now)?;
    Ok(remaining)
}
