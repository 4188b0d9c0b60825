//! Core types and data structures for the transfer ledger

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// One money transfer between two parties
///
/// Records are immutable once read. The date is carried exactly as it
/// appeared in the source; stores coerce it to a calendar date on insert.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransferRecord {
    /// Raw date token, e.g. `2024-01-31`
    pub date: String,
    /// Party the amount is deducted from
    pub debtor: String,
    /// Party the amount is deposited to
    pub creditor: String,
    /// Transferred amount, never negative once stored
    pub amount: BigDecimal,
}

impl TransferRecord {
    /// Create a new transfer record
    pub fn new(
        date: impl Into<String>,
        debtor: impl Into<String>,
        creditor: impl Into<String>,
        amount: BigDecimal,
    ) -> Self {
        Self {
            date: date.into(),
            debtor: debtor.into(),
            creditor: creditor.into(),
            amount,
        }
    }

    /// Signed effect of this transfer on `party`
    ///
    /// A transfer from a party to itself nets out to zero.
    pub fn signed_amount_for(&self, party: &str) -> BigDecimal {
        let mut delta = BigDecimal::from(0);
        if self.creditor == party {
            delta += &self.amount;
        }
        if self.debtor == party {
            delta -= &self.amount;
        }
        delta
    }
}

/// Errors that can occur in the ledger system
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    #[error("Malformed record at line {line}: `{raw}` ({reason})")]
    MalformedRecord {
        line: u64,
        raw: String,
        reason: String,
    },
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),
    #[error("Storage initialization failed: {0}")]
    StorageInitialization(String),
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<sea_orm::DbErr> for LedgerError {
    fn from(err: sea_orm::DbErr) -> Self {
        let message = err.to_string();
        if message.contains("CHECK constraint failed") {
            LedgerError::ConstraintViolation(message)
        } else {
            LedgerError::Storage(message)
        }
    }
}

impl From<config::ConfigError> for LedgerError {
    fn from(err: config::ConfigError) -> Self {
        LedgerError::Configuration(err.to_string())
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;
