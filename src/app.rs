//! One batch run: open the store, ingest, write the statement, close the store

use crate::ledger::core::Ledger;
use crate::ledger::source::RecordSource;
use crate::settings::Settings;
use crate::types::*;
use crate::utils::sqlite_storage::SqliteStorage;

/// Run against the store, input and statement paths in `settings`
///
/// The store is closed whatever the outcome, and the statement file is only
/// written once the whole statement has been computed and rendered.
pub async fn run(settings: &Settings) -> LedgerResult<()> {
    let storage = SqliteStorage::open(&settings.storage.path).await?;
    let mut ledger = Ledger::new(storage);

    let outcome = ingest_and_report(&mut ledger, settings).await;
    let closed = ledger.into_storage().close().await;

    outcome.and(closed)
}

async fn ingest_and_report(
    ledger: &mut Ledger<SqliteStorage>,
    settings: &Settings,
) -> LedgerResult<()> {
    let source = RecordSource::new(&settings.input.path);
    ledger.ingest(&source).await?;

    if !settings.statement.enabled {
        return Ok(());
    }

    let statement = ledger.statement().await?;

    // Render fully before touching the output file
    let mut rendered = Vec::new();
    statement.write_csv(&mut rendered)?;
    std::fs::write(&settings.statement.path, rendered)?;

    tracing::info!(
        path = %settings.statement.path.display(),
        parties = statement.parties.len(),
        rows = statement.rows.len(),
        "statement written"
    );
    Ok(())
}
