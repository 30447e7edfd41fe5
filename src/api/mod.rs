//! Transport-agnostic read/write contracts over the ledger.
//!
//! Every call authenticates the caller first; no ledger logic runs for an
//! unauthenticated request. Amounts are rounded here, once, as they cross into
//! the ledger.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::identity::IdentityProvider;
use crate::core::services::LedgerServices;
use crate::currency::AmountInput;
use crate::domain::{
    allowance::AllowancePeriod,
    category::Category,
    expense::{parse_expense_date, Expense, ExpenseChanges, ExpenseQuery, NewExpense},
    owner::OwnerId,
    period::Frequency,
    summary::{MonthBreakdown, Summary},
};
use crate::errors::{LedgerError, Result};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateExpenseRequest {
    pub amount: AmountInput,
    pub category: String,
    /// Free text used when `category` selects the "Other" entry.
    #[serde(default)]
    pub custom_category: Option<String>,
    pub date: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, alias = "receipt_url")]
    pub receipt_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditExpenseRequest {
    pub id: Uuid,
    pub amount: AmountInput,
    pub category: String,
    #[serde(default)]
    pub custom_category: Option<String>,
    pub date: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// Filters for the expense list. Blank or missing fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListExpensesRequest {
    /// `YYYY-MM`.
    pub month: Option<String>,
    pub category: Option<String>,
    pub search: Option<String>,
    /// `date-desc` (default), `date-asc`, `amount-desc` or `amount-asc`.
    pub sort: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteExpenseRequest {
    pub id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteExpenseResponse {
    pub id: Uuid,
    pub deleted: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetAllowanceRequest {
    pub amount: AmountInput,
    #[serde(default)]
    pub frequency: Frequency,
}

/// Error envelope handed to whatever transport sits in front of the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_balance: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub requested_amount: Option<i64>,
}

impl From<&LedgerError> for ErrorBody {
    fn from(err: &LedgerError) -> Self {
        let mut body = ErrorBody {
            error: err.kind().to_string(),
            message: err.to_string(),
            field: None,
            current_balance: None,
            requested_amount: None,
        };
        match err {
            LedgerError::Validation { field, .. } => body.field = Some((*field).to_string()),
            LedgerError::InsufficientBalance {
                current_balance,
                requested_amount,
            } => {
                body.current_balance = Some(*current_balance);
                body.requested_amount = Some(*requested_amount);
            }
            // Storage details stay in the logs.
            LedgerError::Storage(_) => body.message = "storage failure".to_string(),
            _ => {}
        }
        body
    }
}

/// Authenticating facade over [`LedgerServices`].
#[derive(Clone)]
pub struct LedgerApi {
    identity: Arc<dyn IdentityProvider>,
    services: LedgerServices,
}

impl LedgerApi {
    pub fn new(identity: Arc<dyn IdentityProvider>, services: LedgerServices) -> Self {
        Self { identity, services }
    }

    pub fn services(&self) -> &LedgerServices {
        &self.services
    }

    fn caller(&self, token: Option<&str>) -> Result<OwnerId> {
        self.identity.authenticate(token)
    }

    pub fn create_expense(&self, token: Option<&str>, request: CreateExpenseRequest) -> Result<Expense> {
        let owner = self.caller(token)?;
        let amount = request.amount.canonical()?;
        let category =
            Category::from_selection(&request.category, request.custom_category.as_deref())?;
        let date = parse_expense_date(&request.date)?;

        let mut input = NewExpense::new(amount, category, date);
        if let Some(description) = request.description {
            input = input.with_description(description);
        }
        if let Some(url) = request.receipt_url.filter(|url| !url.trim().is_empty()) {
            input = input.with_receipt(url);
        }
        self.services.expenses.create_expense(&owner, input)
    }

    pub fn edit_expense(&self, token: Option<&str>, request: EditExpenseRequest) -> Result<Expense> {
        let owner = self.caller(token)?;
        let changes = ExpenseChanges {
            amount: request.amount.canonical()?,
            category: Category::from_selection(
                &request.category,
                request.custom_category.as_deref(),
            )?,
            date: parse_expense_date(&request.date)?,
            description: request.description,
        };
        self.services.expenses.edit_expense(&owner, request.id, changes)
    }

    pub fn delete_expense(
        &self,
        token: Option<&str>,
        request: DeleteExpenseRequest,
    ) -> Result<DeleteExpenseResponse> {
        let owner = self.caller(token)?;
        self.services.expenses.delete_expense(&owner, request.id)?;
        Ok(DeleteExpenseResponse {
            id: request.id,
            deleted: true,
        })
    }

    pub fn list_expenses(&self, token: Option<&str>) -> Result<Vec<Expense>> {
        let owner = self.caller(token)?;
        self.services.expenses.list_expenses(&owner)
    }

    pub fn query_expenses(
        &self,
        token: Option<&str>,
        request: ListExpensesRequest,
    ) -> Result<Vec<Expense>> {
        let owner = self.caller(token)?;
        let query = ExpenseQuery::from_filters(
            request.month.as_deref(),
            request.category.as_deref(),
            request.search.as_deref(),
            request.sort.as_deref(),
        )?;
        self.services.expenses.query_expenses(&owner, &query)
    }

    pub fn get_expense(&self, token: Option<&str>, id: Uuid) -> Result<Expense> {
        let owner = self.caller(token)?;
        self.services.expenses.get_expense(&owner, id)
    }

    /// Creates or re-budgets the current period, resetting its remaining balance.
    pub fn set_allowance(
        &self,
        token: Option<&str>,
        request: SetAllowanceRequest,
    ) -> Result<AllowancePeriod> {
        let owner = self.caller(token)?;
        let amount = request.amount.canonical()?;
        self.services
            .allowances
            .set_amount(&owner, amount, request.frequency)
    }

    /// Creates the current period's allowance only if it does not exist yet.
    pub fn ensure_allowance(
        &self,
        token: Option<&str>,
        request: SetAllowanceRequest,
    ) -> Result<AllowancePeriod> {
        let owner = self.caller(token)?;
        let amount = request.amount.canonical()?;
        self.services
            .allowances
            .ensure_period(&owner, amount, request.frequency)
    }

    pub fn current_allowance(&self, token: Option<&str>) -> Result<Option<AllowancePeriod>> {
        let owner = self.caller(token)?;
        self.services.allowances.current(&owner)
    }

    pub fn summary(&self, token: Option<&str>) -> Result<Summary> {
        let owner = self.caller(token)?;
        self.services.summaries.summary(&owner)
    }

    pub fn month_breakdown(&self, token: Option<&str>, month: &str) -> Result<MonthBreakdown> {
        let owner = self.caller(token)?;
        self.services.summaries.month_breakdown(&owner, month)
    }
}
