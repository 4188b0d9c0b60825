//! Main ledger orchestrator that coordinates ingestion and statements

use crate::ledger::balance::{BalanceEngine, Statement};
use crate::ledger::source::RecordSource;
use crate::traits::*;
use crate::types::*;

/// Ledger over an explicit storage handle
///
/// The ledger owns its store; callers get it back with
/// [`Ledger::into_storage`] to release it.
pub struct Ledger<S: LedgerStorage> {
    storage: S,
}

impl<S: LedgerStorage> Ledger<S> {
    /// Create a new ledger with the given storage backend
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Append a single transfer
    pub async fn record(&mut self, record: TransferRecord) -> LedgerResult<()> {
        self.storage.insert(&record).await
    }

    /// Ingest every record of `source`, returning how many were stored
    ///
    /// The whole file is read before anything is stored and the records are
    /// appended as one batch, so a malformed line or a rejected record leaves
    /// the ledger as it was.
    pub async fn ingest(&mut self, source: &RecordSource) -> LedgerResult<usize> {
        tracing::info!(path = %source.path().display(), "ingesting transfers");
        let count = self.ingest_records(source.records()?).await?;
        tracing::info!(path = %source.path().display(), records = count, "ingest complete");
        Ok(count)
    }

    /// Ingest already parsed records, stopping at the first error
    pub async fn ingest_records<I>(&mut self, records: I) -> LedgerResult<usize>
    where
        I: IntoIterator<Item = LedgerResult<TransferRecord>>,
    {
        let batch = records
            .into_iter()
            .collect::<LedgerResult<Vec<_>>>()
            .inspect_err(|err| tracing::warn!(%err, "rejected input"))?;

        self.storage
            .insert_batch(&batch)
            .await
            .inspect_err(|err| tracing::warn!(%err, "rejected input"))?;
        Ok(batch.len())
    }

    /// Compute the balance statement over everything stored so far
    pub async fn statement(&self) -> LedgerResult<Statement> {
        BalanceEngine::new(&self.storage).statement().await
    }
}
