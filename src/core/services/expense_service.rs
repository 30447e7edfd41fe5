//! Expense lifecycle and its effect on the linked allowance balance.

use std::sync::Arc;

use rusqlite::Connection;
use uuid::Uuid;

use crate::core::period::PeriodResolver;
use crate::core::time::Clock;
use crate::domain::allowance::AllowancePeriod;
use crate::domain::common::{Displayable, Identifiable, Owned};
use crate::domain::expense::{
    normalize_description, validate_expense_amount, validate_expense_date, Expense,
    ExpenseChanges, ExpenseQuery, NewExpense,
};
use crate::domain::owner::OwnerId;
use crate::errors::LedgerError;
use crate::storage::sqlite::{allowances, expenses};
use crate::storage::SqliteStore;

use super::allowance_service::{apply_adjustment, apply_checked_deduction};
use super::ServiceResult;

/// Creates, edits, and deletes expenses. Every mutation touching a balance
/// commits the expense row and the allowance row together or not at all.
#[derive(Clone)]
pub struct ExpenseService {
    store: SqliteStore,
    periods: PeriodResolver,
}

impl ExpenseService {
    pub fn new(store: SqliteStore, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            periods: PeriodResolver::new(clock),
        }
    }

    /// Records a spend against the current period's allowance.
    ///
    /// Fails with [`LedgerError::NoActiveAllowance`] when no allowance exists for
    /// the current period and with [`LedgerError::InsufficientBalance`] when the
    /// amount exceeds what is left. Neither failure writes anything.
    pub fn create_expense(&self, owner: &OwnerId, input: NewExpense) -> ServiceResult<Expense> {
        let amount = validate_expense_amount(input.amount)?;
        let date = validate_expense_date(input.date)?;
        let candidates = self.periods.current_candidates();
        let now = self.periods.clock().now();

        let result = self.store.write(|tx| {
            let allowance = allowances::find_first_of(tx, owner, &candidates)?.ok_or_else(|| {
                LedgerError::NoActiveAllowance {
                    period: candidates[0].key(),
                }
            })?;
            let remaining = apply_checked_deduction(tx, &allowance, amount, now)?;

            let expense = Expense {
                id: Uuid::new_v4(),
                owner: owner.clone(),
                amount,
                category: input.category,
                date,
                description: normalize_description(input.description),
                receipt_url: input.receipt_url,
                allowance_id: Some(allowance.id),
                created_at: now,
            };
            expenses::insert(tx, &expense)?;
            Ok((expense, remaining))
        });

        match result {
            Ok((expense, remaining)) => {
                tracing::info!(
                    %owner,
                    expense_id = %expense.id(),
                    amount,
                    remaining,
                    "expense recorded"
                );
                tracing::debug!(entry = %expense.display_label(), "expense details");
                Ok(expense)
            }
            Err(err) => {
                if matches!(
                    err,
                    LedgerError::NoActiveAllowance { .. } | LedgerError::InsufficientBalance { .. }
                ) {
                    tracing::warn!(%owner, amount, error = %err, "expense rejected");
                }
                Err(err)
            }
        }
    }

    /// Replaces the mutable fields of an expense and moves the linked balance by
    /// `new_amount - old_amount`.
    ///
    /// An increase that would overdraw the balance is rejected; an accepted
    /// adjustment is clamped into `[0, amount]`.
    pub fn edit_expense(
        &self,
        owner: &OwnerId,
        expense_id: Uuid,
        changes: ExpenseChanges,
    ) -> ServiceResult<Expense> {
        let amount = validate_expense_amount(changes.amount)?;
        let changes = ExpenseChanges {
            amount,
            date: validate_expense_date(changes.date)?,
            description: normalize_description(changes.description),
            ..changes
        };
        let now = self.periods.clock().now();

        let result = self.store.write(|tx| {
            let existing = expenses::find_owned(tx, owner, expense_id)?
                .ok_or(LedgerError::NotFound(expense_id))?;
            let delta = changes.amount - existing.amount;

            if let Some(allowance_id) = existing.allowance_id {
                let allowance = linked_allowance(tx, &existing)?.ok_or_else(|| {
                    LedgerError::Storage(format!("linked allowance {allowance_id} is missing"))
                })?;
                if allowance.remaining - delta < 0 {
                    return Err(LedgerError::InsufficientBalance {
                        current_balance: allowance.remaining,
                        requested_amount: delta,
                    });
                }
                apply_adjustment(tx, &allowance, delta, now)?;
            }

            expenses::update_fields(tx, expense_id, &changes)?;
            Ok((
                Expense {
                    amount: changes.amount,
                    category: changes.category.clone(),
                    date: changes.date,
                    description: changes.description.clone(),
                    ..existing
                },
                delta,
            ))
        });

        match result {
            Ok((expense, delta)) => {
                tracing::info!(%owner, %expense_id, delta, "expense updated");
                Ok(expense)
            }
            Err(err) => {
                if matches!(
                    err,
                    LedgerError::InsufficientBalance { .. } | LedgerError::NotFound(_)
                ) {
                    tracing::warn!(%owner, %expense_id, error = %err, "expense edit rejected");
                }
                Err(err)
            }
        }
    }

    /// Removes an expense and refunds its amount to the linked allowance,
    /// capped at the allowance amount.
    pub fn delete_expense(&self, owner: &OwnerId, expense_id: Uuid) -> ServiceResult<Expense> {
        let now = self.periods.clock().now();
        let removed = self.store.write(|tx| {
            let existing = expenses::find_owned(tx, owner, expense_id)?
                .ok_or(LedgerError::NotFound(expense_id))?;
            if let Some(allowance) = linked_allowance(tx, &existing)? {
                apply_adjustment(tx, &allowance, -existing.amount, now)?;
            }
            expenses::delete(tx, expense_id)?;
            Ok(existing)
        });
        match removed {
            Ok(removed) => {
                tracing::info!(%owner, %expense_id, refunded = removed.amount, "expense deleted");
                Ok(removed)
            }
            Err(err) => {
                if matches!(err, LedgerError::NotFound(_)) {
                    tracing::warn!(%owner, %expense_id, "expense delete rejected: not found");
                }
                Err(err)
            }
        }
    }

    /// All of the owner's expenses, newest date first.
    pub fn list_expenses(&self, owner: &OwnerId) -> ServiceResult<Vec<Expense>> {
        self.query_expenses(owner, &ExpenseQuery::default())
    }

    /// The owner's expenses matching `query`, in the order it asks for.
    pub fn query_expenses(
        &self,
        owner: &OwnerId,
        query: &ExpenseQuery,
    ) -> ServiceResult<Vec<Expense>> {
        self.store.read(|conn| expenses::query(conn, owner, query))
    }

    pub fn get_expense(&self, owner: &OwnerId, expense_id: Uuid) -> ServiceResult<Expense> {
        self.store
            .read(|conn| expenses::find_owned(conn, owner, expense_id))?
            .ok_or(LedgerError::NotFound(expense_id))
    }
}

/// The allowance an expense was charged against, if it still exists and
/// belongs to the same owner.
fn linked_allowance(conn: &Connection, expense: &Expense) -> ServiceResult<Option<AllowancePeriod>> {
    let Some(allowance_id) = expense.allowance_id else {
        return Ok(None);
    };
    Ok(allowances::find_by_id(conn, allowance_id)?
        .filter(|allowance| allowance.is_owned_by(expense.owner())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::services::allowance_service::AllowanceService;
    use crate::core::time::FixedClock;
    use crate::domain::category::{Category, FixedCategory};
    use crate::domain::period::Frequency;
    use chrono::NaiveDate;

    struct Fixture {
        store: SqliteStore,
        allowances: AllowanceService,
        expenses: ExpenseService,
        owner: OwnerId,
    }

    fn fixture() -> Fixture {
        let clock: Arc<dyn Clock> =
            Arc::new(FixedClock::on(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()));
        let store = SqliteStore::open_in_memory().unwrap();
        Fixture {
            allowances: AllowanceService::new(store.clone(), clock.clone()),
            expenses: ExpenseService::new(store.clone(), clock),
            store,
            owner: OwnerId::random(),
        }
    }

    fn food(amount: i64) -> NewExpense {
        NewExpense::new(
            amount,
            FixedCategory::Food.into(),
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
        )
    }

    fn remaining(fx: &Fixture) -> i64 {
        fx.allowances
            .current(&fx.owner)
            .unwrap()
            .expect("allowance exists")
            .remaining
    }

    #[test]
    fn create_deducts_from_current_allowance() {
        let fx = fixture();
        let allowance = fx
            .allowances
            .ensure_period(&fx.owner, 100_000, Frequency::Monthly)
            .unwrap();
        let expense = fx.expenses.create_expense(&fx.owner, food(30_000)).unwrap();
        assert_eq!(expense.allowance_id, Some(allowance.id));
        assert_eq!(remaining(&fx), 70_000);
        let linked = fx
            .store
            .read(|conn| expenses::count_for_allowance(conn, allowance.id))
            .unwrap();
        assert_eq!(linked, 1);
    }

    #[test]
    fn create_rejects_overdraft_without_writing() {
        let fx = fixture();
        fx.allowances
            .ensure_period(&fx.owner, 100_000, Frequency::Monthly)
            .unwrap();
        fx.allowances.set_amount(&fx.owner, 20_000, Frequency::Monthly).unwrap();

        let err = fx
            .expenses
            .create_expense(&fx.owner, food(50_000))
            .expect_err("overdraft");
        assert!(matches!(
            err,
            LedgerError::InsufficientBalance {
                current_balance: 20_000,
                requested_amount: 50_000
            }
        ));
        assert_eq!(remaining(&fx), 20_000);
        assert!(fx.expenses.list_expenses(&fx.owner).unwrap().is_empty());
    }

    #[test]
    fn create_without_allowance_reports_period() {
        let fx = fixture();
        let err = fx
            .expenses
            .create_expense(&fx.owner, food(1_000))
            .expect_err("no allowance");
        assert!(matches!(err, LedgerError::NoActiveAllowance { ref period } if period == "2026-10"));
    }

    #[test]
    fn edit_moves_balance_by_delta() {
        let fx = fixture();
        fx.allowances
            .ensure_period(&fx.owner, 100_000, Frequency::Monthly)
            .unwrap();
        let expense = fx.expenses.create_expense(&fx.owner, food(30_000)).unwrap();

        let edited = fx
            .expenses
            .edit_expense(
                &fx.owner,
                expense.id,
                ExpenseChanges {
                    amount: 10_000,
                    category: Category::parse("Transportasi").unwrap(),
                    date: expense.date,
                    description: Some("ojek".into()),
                },
            )
            .unwrap();
        assert_eq!(edited.amount, 10_000);
        assert_eq!(edited.allowance_id, expense.allowance_id);
        assert_eq!(remaining(&fx), 90_000);
    }

    #[test]
    fn edit_rejects_increase_beyond_balance() {
        let fx = fixture();
        fx.allowances
            .ensure_period(&fx.owner, 100_000, Frequency::Monthly)
            .unwrap();
        let expense = fx.expenses.create_expense(&fx.owner, food(90_000)).unwrap();

        let err = fx
            .expenses
            .edit_expense(
                &fx.owner,
                expense.id,
                ExpenseChanges {
                    amount: 120_000,
                    category: expense.category.clone(),
                    date: expense.date,
                    description: None,
                },
            )
            .expect_err("overdraft");
        assert!(matches!(
            err,
            LedgerError::InsufficientBalance {
                current_balance: 10_000,
                requested_amount: 30_000
            }
        ));
        assert_eq!(remaining(&fx), 10_000);
        assert_eq!(
            fx.expenses.get_expense(&fx.owner, expense.id).unwrap().amount,
            90_000
        );
    }

    #[test]
    fn delete_refund_is_capped_at_amount() {
        let fx = fixture();
        fx.allowances
            .ensure_period(&fx.owner, 100_000, Frequency::Monthly)
            .unwrap();
        let expense = fx.expenses.create_expense(&fx.owner, food(30_000)).unwrap();
        fx.allowances
            .set_amount(&fx.owner, 100_000, Frequency::Monthly)
            .unwrap();

        fx.expenses.delete_expense(&fx.owner, expense.id).unwrap();
        assert_eq!(remaining(&fx), 100_000);
        assert!(matches!(
            fx.expenses.get_expense(&fx.owner, expense.id),
            Err(LedgerError::NotFound(_))
        ));
    }

    #[test]
    fn create_then_delete_restores_balance() {
        let fx = fixture();
        fx.allowances
            .ensure_period(&fx.owner, 100_000, Frequency::Monthly)
            .unwrap();
        let expense = fx.expenses.create_expense(&fx.owner, food(42_500)).unwrap();
        fx.expenses.delete_expense(&fx.owner, expense.id).unwrap();
        assert_eq!(remaining(&fx), 100_000);
    }

    #[test]
    fn other_owners_see_not_found() {
        let fx = fixture();
        fx.allowances
            .ensure_period(&fx.owner, 100_000, Frequency::Monthly)
            .unwrap();
        let expense = fx.expenses.create_expense(&fx.owner, food(5_000)).unwrap();
        let stranger = OwnerId::random();

        assert!(matches!(
            fx.expenses.get_expense(&stranger, expense.id),
            Err(LedgerError::NotFound(_))
        ));
        assert!(matches!(
            fx.expenses.delete_expense(&stranger, expense.id),
            Err(LedgerError::NotFound(_))
        ));
        assert_eq!(remaining(&fx), 95_000);
    }

    #[test]
    fn non_positive_amounts_are_rejected_before_storage() {
        let fx = fixture();
        let err = fx
            .expenses
            .create_expense(&fx.owner, food(0))
            .expect_err("zero amount");
        assert!(matches!(err, LedgerError::Validation { field: "amount", .. }));
    }
}
