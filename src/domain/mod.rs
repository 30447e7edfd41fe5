pub mod allowance;
pub mod category;
pub mod common;
pub mod expense;
pub mod owner;
pub mod period;
pub mod summary;

pub use allowance::AllowancePeriod;
pub use category::{Category, FixedCategory};
pub use common::{Displayable, Identifiable, Owned};
pub use expense::{Expense, ExpenseChanges, NewExpense};
pub use owner::OwnerId;
pub use period::{BudgetPeriod, Frequency};
pub use summary::{
    CategoryAmount, CategoryShare, CategoryTotal, ExpenseTotals, MonthBreakdown, MonthTotal,
    Summary,
};
