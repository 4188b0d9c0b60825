//! In-memory storage implementation for testing

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::collections::BTreeSet;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::ledger::balance::date_boundaries;
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::validate_transfer;

/// A transfer that passed validation, with its date coerced
#[derive(Debug, Clone)]
struct StoredTransfer {
    date: NaiveDate,
    record: TransferRecord,
}

/// In-memory storage implementation for testing and development
///
/// Clones share the same underlying records.
#[derive(Debug, Clone)]
pub struct MemoryStorage {
    transfers: Arc<RwLock<Vec<StoredTransfer>>>,
}

impl MemoryStorage {
    /// Create a new memory storage instance
    pub fn new() -> Self {
        Self {
            transfers: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Clear all data (useful for testing)
    pub fn clear(&self) -> LedgerResult<()> {
        self.write()?.clear();
        Ok(())
    }

    fn read(&self) -> LedgerResult<RwLockReadGuard<'_, Vec<StoredTransfer>>> {
        self.transfers
            .read()
            .map_err(|_| LedgerError::Storage("memory storage lock poisoned".to_string()))
    }

    fn write(&self) -> LedgerResult<RwLockWriteGuard<'_, Vec<StoredTransfer>>> {
        self.transfers
            .write()
            .map_err(|_| LedgerError::Storage("memory storage lock poisoned".to_string()))
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

fn stored(record: &TransferRecord) -> LedgerResult<StoredTransfer> {
    Ok(StoredTransfer {
        date: validate_transfer(record)?,
        record: record.clone(),
    })
}

#[async_trait]
impl LedgerStorage for MemoryStorage {
    async fn insert(&mut self, record: &TransferRecord) -> LedgerResult<()> {
        let transfer = stored(record)?;
        self.write()?.push(transfer);
        Ok(())
    }

    async fn insert_batch(&mut self, records: &[TransferRecord]) -> LedgerResult<()> {
        // Validate everything first so a bad record leaves the store untouched
        let batch = records
            .iter()
            .map(stored)
            .collect::<LedgerResult<Vec<_>>>()?;
        self.write()?.extend(batch);
        Ok(())
    }

    async fn distinct_parties(&self) -> LedgerResult<Vec<String>> {
        let transfers = self.read()?;
        let parties: BTreeSet<&str> = transfers
            .iter()
            .flat_map(|t| [t.record.debtor.as_str(), t.record.creditor.as_str()])
            .collect();
        Ok(parties.into_iter().map(str::to_string).collect())
    }

    async fn distinct_date_boundaries(&self) -> LedgerResult<Vec<NaiveDate>> {
        let dates: Vec<NaiveDate> = self.read()?.iter().map(|t| t.date).collect();
        date_boundaries(dates)
    }

    async fn signed_balance_before(
        &self,
        party: &str,
        date: NaiveDate,
    ) -> LedgerResult<BigDecimal> {
        let transfers = self.read()?;
        Ok(transfers
            .iter()
            .filter(|t| t.date < date)
            .map(|t| t.record.signed_amount_for(party))
            .sum())
    }

    async fn record_count(&self) -> LedgerResult<u64> {
        Ok(self.read()?.len() as u64)
    }
}
