pub mod allowance_service;
pub mod expense_service;
pub mod summary_service;

use std::sync::Arc;

pub use allowance_service::AllowanceService;
pub use expense_service::ExpenseService;
pub use summary_service::{MonthLabels, SummaryService};

use crate::core::time::Clock;
use crate::errors::LedgerError;
use crate::storage::SqliteStore;

pub type ServiceResult<T> = Result<T, LedgerError>;

/// The three ledger services wired to one store and one clock.
#[derive(Clone)]
pub struct LedgerServices {
    pub allowances: AllowanceService,
    pub expenses: ExpenseService,
    pub summaries: SummaryService,
}

impl LedgerServices {
    pub fn new(store: SqliteStore, clock: Arc<dyn Clock>, labels: MonthLabels) -> Self {
        Self {
            allowances: AllowanceService::new(store.clone(), clock.clone()),
            expenses: ExpenseService::new(store.clone(), clock),
            summaries: SummaryService::new(store, labels),
        }
    }
}
