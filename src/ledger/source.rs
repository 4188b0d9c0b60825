//! Record source: turns delimited text lines into transfer records

use bigdecimal::BigDecimal;
use csv::{ReaderBuilder, StringRecord, Trim};
use std::fs::File;
use std::io::{BufRead, BufReader, Lines, Read};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::types::*;

/// Fields per line: `date,debtor,creditor,amount`
pub const FIELD_COUNT: usize = 4;

/// A delimited text file of transfers, one per line, no header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordSource {
    path: PathBuf,
}

impl RecordSource {
    /// Create a source reading from `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Open the file and iterate its records from the first line
    ///
    /// Each call starts a fresh pass over the file.
    pub fn records(&self) -> LedgerResult<Records<File>> {
        let file = File::open(&self.path)?;
        Ok(Records::from_reader(file))
    }
}

/// Lazy iterator over the records of a source
///
/// Every line is one record, blank lines included. Stops after the first
/// error.
pub struct Records<R: Read> {
    lines: Lines<BufReader<R>>,
    line: u64,
    failed: bool,
}

impl<R: Read> Records<R> {
    /// Iterate records read from any reader
    pub fn from_reader(reader: R) -> Self {
        Self {
            lines: BufReader::new(reader).lines(),
            line: 0,
            failed: false,
        }
    }
}

impl<R: Read> Iterator for Records<R> {
    type Item = LedgerResult<TransferRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        self.line += 1;
        let item = match self.lines.next()? {
            Ok(raw) => parse_record(self.line, raw.strip_suffix('\r').unwrap_or(raw.as_str())),
            Err(err) => Err(err.into()),
        };
        if item.is_err() {
            self.failed = true;
        }
        Some(item)
    }
}

/// Split one raw line into its delimited fields
///
/// A blank line has no fields at all.
fn split_fields(raw: &str) -> LedgerResult<StringRecord> {
    let mut fields = StringRecord::new();
    if raw.trim().is_empty() {
        return Ok(fields);
    }

    ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(raw.as_bytes())
        .read_record(&mut fields)?;
    Ok(fields)
}

/// Decompose line number `line`, as written in the source, into a transfer record
pub fn parse_record(line: u64, raw: &str) -> LedgerResult<TransferRecord> {
    let malformed = |reason: String| LedgerError::MalformedRecord {
        line,
        raw: raw.to_string(),
        reason,
    };

    let record = split_fields(raw)?;
    if record.len() != FIELD_COUNT {
        return Err(malformed(format!(
            "expected {} fields, found {}",
            FIELD_COUNT,
            record.len()
        )));
    }

    let amount = BigDecimal::from_str(&record[3])
        .map_err(|e| malformed(format!("amount `{}` is not a number: {}", &record[3], e)))?;

    Ok(TransferRecord {
        date: record[0].to_string(),
        debtor: record[1].to_string(),
        creditor: record[2].to_string(),
        amount,
    })
}
