//! Validation utilities

use bigdecimal::BigDecimal;
use chrono::{NaiveDate, NaiveDateTime};

use crate::types::*;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Timestamp layouts accepted in place of a plain date; the time is dropped
const TIMESTAMP_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Validate that an amount is not negative
pub fn validate_non_negative_amount(amount: &BigDecimal) -> LedgerResult<()> {
    if *amount < BigDecimal::from(0) {
        Err(LedgerError::ConstraintViolation(format!(
            "amount must not be negative, got {}",
            amount
        )))
    } else {
        Ok(())
    }
}

/// Validate that a party identifier is usable
pub fn validate_party(role: &str, party: &str) -> LedgerResult<()> {
    if party.trim().is_empty() {
        return Err(LedgerError::ConstraintViolation(format!(
            "{} cannot be empty",
            role
        )));
    }

    Ok(())
}

/// Coerce a raw date token to a calendar date
///
/// Timestamps are truncated to their day.
pub fn parse_record_date(raw: &str) -> LedgerResult<NaiveDate> {
    let token = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(token, DATE_FORMAT) {
        return Ok(date);
    }

    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(token, format).ok())
        .map(|timestamp| timestamp.date())
        .ok_or_else(|| LedgerError::InvalidDate(format!("`{}` is not a calendar date", raw)))
}

/// Render a date the way stores persist it
pub fn format_record_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Validate a transfer before it is stored, returning its calendar date
pub fn validate_transfer(record: &TransferRecord) -> LedgerResult<NaiveDate> {
    validate_non_negative_amount(&record.amount)?;
    validate_party("debtor", &record.debtor)?;
    validate_party("creditor", &record.creditor)?;
    parse_record_date(&record.date)
}
