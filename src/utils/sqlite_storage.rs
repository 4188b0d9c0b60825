//! SQLite storage backed by sea-orm

use async_trait::async_trait;
use bigdecimal::BigDecimal;
use chrono::{Datelike, NaiveDate};
use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseConnection, DbBackend, QueryResult,
    Statement, TransactionTrait,
};
use std::path::Path;
use std::str::FromStr;

use crate::ledger::balance::date_boundaries;
use crate::traits::*;
use crate::types::*;
use crate::utils::validation::{format_record_date, validate_transfer};

const CREATE_TRANSFERS: &str = "CREATE TABLE IF NOT EXISTS transfers (
    day INTEGER NOT NULL,
    date TEXT NOT NULL,
    debtor TEXT NOT NULL,
    creditor TEXT NOT NULL,
    amount TEXT NOT NULL CHECK (CAST(amount AS REAL) >= 0)
)";

const CREATE_TRANSFERS_DAY_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS transfers_day ON transfers (day)";

const INSERT_TRANSFER: &str =
    "INSERT INTO transfers (day, date, debtor, creditor, amount) VALUES (?, ?, ?, ?, ?)";

const SELECT_PARTIES: &str = "SELECT debtor AS party FROM transfers \
     UNION SELECT creditor AS party FROM transfers \
     ORDER BY party";

const SELECT_DATES: &str = "SELECT DISTINCT day FROM transfers ORDER BY day";

const SELECT_PARTY_TRANSFERS_BEFORE: &str = "SELECT debtor, creditor, amount FROM transfers \
     WHERE day < ? AND (debtor = ? OR creditor = ?)";

const COUNT_TRANSFERS: &str = "SELECT COUNT(*) AS count FROM transfers";

/// Durable ledger store in a single SQLite file
///
/// Each date is persisted twice: as a day number since the common era,
/// which every query orders and filters on, and as readable `YYYY-MM-DD`
/// text. Amounts are persisted as exact decimal text.
#[derive(Debug, Clone)]
pub struct SqliteStorage {
    db: DatabaseConnection,
}

impl SqliteStorage {
    /// Open the ledger file at `path`, creating it and its schema if absent
    pub async fn open(path: impl AsRef<Path>) -> LedgerResult<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "opening ledger store");
        Self::connect(format!("sqlite:{}?mode=rwc", path.display())).await
    }

    /// Open a private in-memory ledger
    pub async fn open_in_memory() -> LedgerResult<Self> {
        Self::connect("sqlite::memory:".to_string()).await
    }

    async fn connect(url: String) -> LedgerResult<Self> {
        let mut options = ConnectOptions::new(url);
        // A single connection keeps in-memory databases alive and visible
        options.max_connections(1).sqlx_logging(false);

        let db = Database::connect(options)
            .await
            .map_err(|e| LedgerError::StorageInitialization(e.to_string()))?;

        for ddl in [CREATE_TRANSFERS, CREATE_TRANSFERS_DAY_INDEX] {
            db.execute_unprepared(ddl)
                .await
                .map_err(|e| LedgerError::StorageInitialization(e.to_string()))?;
        }

        Ok(Self { db })
    }

    /// Release the underlying connection
    pub async fn close(self) -> LedgerResult<()> {
        self.db.close().await?;
        Ok(())
    }
}

fn insert_statement(record: &TransferRecord, date: NaiveDate) -> Statement {
    Statement::from_sql_and_values(
        DbBackend::Sqlite,
        INSERT_TRANSFER,
        vec![
            date.num_days_from_ce().into(),
            format_record_date(date).into(),
            record.debtor.clone().into(),
            record.creditor.clone().into(),
            record.amount.to_string().into(),
        ],
    )
}

fn day_column(row: &QueryResult) -> LedgerResult<NaiveDate> {
    let day = row.try_get::<i32>("", "day")?;
    NaiveDate::from_num_days_from_ce_opt(day)
        .ok_or_else(|| LedgerError::Storage(format!("stored day {} is out of range", day)))
}

fn column(row: &QueryResult, name: &str) -> LedgerResult<String> {
    Ok(row.try_get::<String>("", name)?)
}

fn amount_column(row: &QueryResult) -> LedgerResult<BigDecimal> {
    let raw = column(row, "amount")?;
    BigDecimal::from_str(&raw)
        .map_err(|e| LedgerError::Storage(format!("stored amount `{}` is unreadable: {}", raw, e)))
}

#[async_trait]
impl LedgerStorage for SqliteStorage {
    async fn insert(&mut self, record: &TransferRecord) -> LedgerResult<()> {
        let date = validate_transfer(record)?;
        self.db.execute(insert_statement(record, date)).await?;
        Ok(())
    }

    async fn insert_batch(&mut self, records: &[TransferRecord]) -> LedgerResult<()> {
        // Dropping the transaction without commit rolls it back
        let txn = self.db.begin().await?;
        for record in records {
            let date = validate_transfer(record)?;
            txn.execute(insert_statement(record, date)).await?;
        }
        txn.commit().await?;
        tracing::debug!(records = records.len(), "committed transfer batch");
        Ok(())
    }

    async fn distinct_parties(&self) -> LedgerResult<Vec<String>> {
        let rows = self
            .db
            .query_all(Statement::from_string(DbBackend::Sqlite, SELECT_PARTIES))
            .await?;
        rows.iter().map(|row| column(row, "party")).collect()
    }

    async fn distinct_date_boundaries(&self) -> LedgerResult<Vec<NaiveDate>> {
        let rows = self
            .db
            .query_all(Statement::from_string(DbBackend::Sqlite, SELECT_DATES))
            .await?;
        let dates = rows
            .iter()
            .map(day_column)
            .collect::<LedgerResult<Vec<_>>>()?;
        date_boundaries(dates)
    }

    async fn signed_balance_before(
        &self,
        party: &str,
        date: NaiveDate,
    ) -> LedgerResult<BigDecimal> {
        let rows = self
            .db
            .query_all(Statement::from_sql_and_values(
                DbBackend::Sqlite,
                SELECT_PARTY_TRANSFERS_BEFORE,
                vec![
                    date.num_days_from_ce().into(),
                    party.into(),
                    party.into(),
                ],
            ))
            .await?;

        let mut balance = BigDecimal::from(0);
        for row in &rows {
            let amount = amount_column(row)?;
            if column(row, "creditor")? == party {
                balance += &amount;
            }
            if column(row, "debtor")? == party {
                balance -= &amount;
            }
        }
        Ok(balance)
    }

    async fn record_count(&self) -> LedgerResult<u64> {
        let row = self
            .db
            .query_one(Statement::from_string(DbBackend::Sqlite, COUNT_TRANSFERS))
            .await?;
        let count: i64 = match row {
            Some(row) => row.try_get("", "count")?,
            None => 0,
        };
        Ok(count as u64)
    }
}
