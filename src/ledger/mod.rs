//! Ledger module containing record ingestion and balance computation

pub mod balance;
pub mod core;
pub mod source;

pub use balance::*;
pub use self::core::*;
pub use source::*;
