//! Handles settings for the application.
//!
//! Values are layered: built-in defaults, then an optional
//! `transfer-ledger.toml` in the working directory, then environment
//! variables such as `TRANSFER_LEDGER__STORAGE__PATH`.

use config::builder::{ConfigBuilder, DefaultState};
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;
use std::path::PathBuf;

use crate::types::*;

const SETTINGS_FILE: &str = "transfer-ledger";
const ENV_PREFIX: &str = "TRANSFER_LEDGER";

#[derive(Debug, Clone, Deserialize)]
pub struct App {
    /// Log level for this crate's targets
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Input {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Storage {
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StatementOutput {
    pub path: PathBuf,
    /// When false a run only ingests
    pub enabled: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub app: App,
    pub input: Input,
    pub storage: Storage,
    pub statement: StatementOutput,
}

fn defaults() -> LedgerResult<ConfigBuilder<DefaultState>> {
    Ok(Config::builder()
        .set_default("app.level", "info")?
        .set_default("input.path", "transactions.csv")?
        .set_default("storage.path", "data.db")?
        .set_default("statement.path", "statement.csv")?
        .set_default("statement.enabled", true)?)
}

impl Settings {
    /// Load defaults, the optional settings file and the environment
    pub fn new() -> LedgerResult<Self> {
        let settings = defaults()?
            .add_source(File::with_name(SETTINGS_FILE).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Load defaults overlaid with a TOML document
    pub fn from_toml(document: &str) -> LedgerResult<Self> {
        let settings = defaults()?
            .add_source(File::from_str(document, FileFormat::Toml))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::from_toml("").unwrap();

        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.input.path, PathBuf::from("transactions.csv"));
        assert_eq!(settings.storage.path, PathBuf::from("data.db"));
        assert_eq!(settings.statement.path, PathBuf::from("statement.csv"));
        assert!(settings.statement.enabled);
    }

    #[test]
    fn test_document_overrides_defaults() {
        let settings = Settings::from_toml(
            r#"
            [storage]
            path = "/var/lib/ledger/ledger.db"

            [statement]
            enabled = false
            "#,
        )
        .unwrap();

        assert_eq!(
            settings.storage.path,
            PathBuf::from("/var/lib/ledger/ledger.db")
        );
        assert!(!settings.statement.enabled);
        assert_eq!(settings.statement.path, PathBuf::from("statement.csv"));
    }

    #[test]
    fn test_bad_value_is_configuration_error() {
        let result = Settings::from_toml("[statement]\nenabled = \"sometimes\"");
        assert!(matches!(result, Err(LedgerError::Configuration(_))));
    }
}
