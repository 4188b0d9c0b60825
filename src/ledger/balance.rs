//! Balance engine: per-party running balances at every date boundary

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::io::Write;

use crate::traits::*;
use crate::types::*;
use crate::utils::validation::format_record_date;

/// Boundary reporting each party's balance after the last known transfer
///
/// Balances are always taken strictly before a boundary, so the final
/// cumulative balance needs one boundary past the last record date.
pub fn closing_boundary(last_date: NaiveDate) -> LedgerResult<NaiveDate> {
    last_date.succ_opt().ok_or_else(|| {
        LedgerError::InvalidDate(format!("no calendar day follows {}", last_date))
    })
}

/// Derive the ordered boundary set from the distinct record dates
///
/// Dates are sorted and deduplicated, then the closing boundary is appended.
/// No dates means no boundaries.
pub fn date_boundaries<I>(dates: I) -> LedgerResult<Vec<NaiveDate>>
where
    I: IntoIterator<Item = NaiveDate>,
{
    let mut boundaries: Vec<NaiveDate> = dates.into_iter().collect();
    boundaries.sort_unstable();
    boundaries.dedup();

    if let Some(&last_date) = boundaries.last() {
        boundaries.push(closing_boundary(last_date)?);
    }

    Ok(boundaries)
}

/// One statement line: balances of every party as of `date`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementRow {
    pub date: NaiveDate,
    /// One balance per party, in the statement's party order
    pub balances: Vec<BigDecimal>,
}

/// Party x boundary-date balance table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Statement {
    /// Column order shared by the header and every row
    pub parties: Vec<String>,
    /// One row per boundary date, ascending
    pub rows: Vec<StatementRow>,
}

impl Statement {
    /// Label of the leading date column
    pub const DATE_COLUMN: &'static str = "date";

    /// Header row: the date label followed by party names
    pub fn header(&self) -> Vec<String> {
        std::iter::once(Self::DATE_COLUMN.to_string())
            .chain(self.parties.iter().cloned())
            .collect()
    }

    /// Balance of `party` strictly before `date`, if both are in the statement
    pub fn balance(&self, party: &str, date: NaiveDate) -> Option<&BigDecimal> {
        let column = self.parties.iter().position(|p| p == party)?;
        self.rows
            .iter()
            .find(|row| row.date == date)
            .and_then(|row| row.balances.get(column))
    }

    /// Lifetime net balance of every party, read from the closing boundary
    pub fn closing_balances(&self) -> Vec<(&str, &BigDecimal)> {
        match self.rows.last() {
            Some(row) => self
                .parties
                .iter()
                .map(String::as_str)
                .zip(row.balances.iter())
                .collect(),
            None => Vec::new(),
        }
    }

    /// True when the ledger held no records
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Header plus data rows rendered as text cells
    pub fn to_rows(&self) -> Vec<Vec<String>> {
        let mut rows = Vec::with_capacity(self.rows.len() + 1);
        rows.push(self.header());
        for row in &self.rows {
            let mut cells = Vec::with_capacity(row.balances.len() + 1);
            cells.push(format_record_date(row.date));
            cells.extend(row.balances.iter().map(|balance| balance.to_string()));
            rows.push(cells);
        }
        rows
    }

    /// Write the statement as comma separated text
    pub fn write_csv<W: Write>(&self, writer: W) -> LedgerResult<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        for row in self.to_rows() {
            csv_writer.write_record(&row)?;
        }
        csv_writer.flush()?;
        Ok(())
    }
}

/// Computes statements from any ledger storage
pub struct BalanceEngine<'a, S: LedgerStorage> {
    storage: &'a S,
}

impl<'a, S: LedgerStorage> BalanceEngine<'a, S> {
    /// Create a balance engine reading from `storage`
    pub fn new(storage: &'a S) -> Self {
        Self { storage }
    }

    /// Compute the full statement
    ///
    /// Every cell is recomputed from the whole record history; nothing is
    /// cached between runs.
    pub async fn statement(&self) -> LedgerResult<Statement> {
        let parties = self.storage.distinct_parties().await?;
        let boundaries = self.storage.distinct_date_boundaries().await?;
        tracing::debug!(
            parties = parties.len(),
            boundaries = boundaries.len(),
            "computing balance statement"
        );

        let mut rows = Vec::with_capacity(boundaries.len());
        for date in boundaries {
            let mut balances = Vec::with_capacity(parties.len());
            for party in &parties {
                balances.push(self.storage.signed_balance_before(party, date).await?);
            }
            rows.push(StatementRow { date, balances });
        }

        Ok(Statement { parties, rows })
    }
}
