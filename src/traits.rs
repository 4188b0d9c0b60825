//! Traits for storage abstraction

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

use crate::types::*;

/// Storage abstraction for the transfer ledger
///
/// The ledger is append-only: records are inserted and read back through
/// aggregate queries, never updated or deleted. Any backend (SQLite,
/// in-memory, ...) can drive the balance engine by implementing these
/// methods. Every accepted insert must be visible to the next read.
#[async_trait]
pub trait LedgerStorage: Send + Sync {
    /// Append one record
    ///
    /// Fails with [`LedgerError::ConstraintViolation`] for a negative amount
    /// and with [`LedgerError::InvalidDate`] when the date cannot be coerced.
    async fn insert(&mut self, record: &TransferRecord) -> LedgerResult<()>;

    /// Append a batch of records, all or nothing
    async fn insert_batch(&mut self, records: &[TransferRecord]) -> LedgerResult<()>;

    /// Every identifier that appears as a debtor or a creditor, sorted
    async fn distinct_parties(&self) -> LedgerResult<Vec<String>>;

    /// Distinct record dates plus the day after the last one, ascending
    ///
    /// Empty when the store holds no records.
    async fn distinct_date_boundaries(&self) -> LedgerResult<Vec<NaiveDate>>;

    /// Credits minus debits of `party` over records dated strictly before `date`
    ///
    /// Zero when no record qualifies.
    async fn signed_balance_before(&self, party: &str, date: NaiveDate)
        -> LedgerResult<BigDecimal>;

    /// Number of stored records
    async fn record_count(&self) -> LedgerResult<u64>;
}
