pub mod identity;
pub mod period;
pub mod receipts;
pub mod services;
pub mod time;
pub mod utils;

pub use identity::{IdentityProvider, LocalIdentity, StaticTokenIdentity};
pub use period::PeriodResolver;
pub use receipts::{LocalReceiptStore, ReceiptRef, ReceiptStore};
pub use services::{AllowanceService, ExpenseService, LedgerServices, SummaryService};
pub use time::{Clock, FixedClock, SystemClock};
