//! Persistence for allowances and expenses.
//!
//! Every mutation runs inside one SQLite transaction spanning both tables; reads use
//! the engine's default consistency.

pub mod sqlite;

pub use sqlite::SqliteStore;
