use thiserror::Error;
use uuid::Uuid;

/// Error type that captures every failure the allowance and expense ledgers surface.
#[derive(Debug, Error)]
pub enum LedgerError {
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Invalid {field}: {message}")]
    Validation { field: &'static str, message: String },
    #[error("No allowance has been set for period {period}")]
    NoActiveAllowance { period: String },
    #[error("Insufficient balance: {current_balance} remaining, {requested_amount} requested")]
    InsufficientBalance {
        current_balance: i64,
        requested_amount: i64,
    },
    #[error("Record not found: {0}")]
    NotFound(Uuid),
    #[error("Storage failure: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, LedgerError>;

impl LedgerError {
    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        LedgerError::Validation {
            field,
            message: message.into(),
        }
    }

    /// Stable machine-readable code for the transport layer.
    pub fn kind(&self) -> &'static str {
        match self {
            LedgerError::Unauthorized => "unauthorized",
            LedgerError::Validation { .. } => "validation_error",
            LedgerError::NoActiveAllowance { .. } => "no_active_allowance",
            LedgerError::InsufficientBalance { .. } => "insufficient_balance",
            LedgerError::NotFound(_) => "not_found",
            LedgerError::Storage(_) => "storage_failure",
        }
    }
}

impl From<rusqlite::Error> for LedgerError {
    fn from(err: rusqlite::Error) -> Self {
        tracing::error!(error = %err, "storage operation failed");
        LedgerError::Storage(err.to_string())
    }
}

impl From<std::io::Error> for LedgerError {
    fn from(err: std::io::Error) -> Self {
        tracing::error!(error = %err, "io operation failed");
        LedgerError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for LedgerError {
    fn from(err: serde_json::Error) -> Self {
        LedgerError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insufficient_balance_message_carries_both_amounts() {
        let err = LedgerError::InsufficientBalance {
            current_balance: 20_000,
            requested_amount: 50_000,
        };
        let message = err.to_string();
        assert!(message.contains("20000"), "unexpected message: {message}");
        assert!(message.contains("50000"), "unexpected message: {message}");
        assert_eq!(err.kind(), "insufficient_balance");
    }

    #[test]
    fn validation_names_the_offending_field() {
        let err = LedgerError::validation("amount", "must be greater than zero");
        assert_eq!(err.to_string(), "Invalid amount: must be greater than zero");
    }
}
