//! # Transfer Ledger
//!
//! Ingests a ledger of money transfers from a delimited text file, persists
//! them in a local store and derives a per-party running balance statement.
//!
//! ## Features
//!
//! - **Record source**: fail-fast reading of `date,debtor,creditor,amount` lines
//! - **Ledger storage**: append-only, trait-based, with SQLite and in-memory backends
//! - **Balance engine**: every party's balance strictly before every date boundary
//! - **Statements**: tabular output with a date column and one column per party
//!
//! ## Quick Start
//!
//! ```rust
//! use transfer_ledger::{utils::MemoryStorage, Ledger, Records};
//!
//! // Inside an async context:
//! // let mut ledger = Ledger::new(MemoryStorage::new());
//! // ledger.ingest_records(Records::from_reader("2024-01-01,A,B,100\n".as_bytes())).await?;
//! // let statement = ledger.statement().await?;
//! ```

pub mod app;
pub mod ledger;
pub mod settings;
pub mod traits;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use ledger::*;
pub use traits::*;
pub use types::*;
