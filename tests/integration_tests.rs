//! Integration tests for transfer-ledger

use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use transfer_ledger::settings::Settings;
use transfer_ledger::{
    app, utils::SqliteStorage, Ledger, LedgerError, LedgerStorage, RecordSource, TransferRecord,
};
use uuid::Uuid;

/// Fresh paths for a ledger file and a store file under `target/test_dbs`
fn scratch_paths() -> (PathBuf, PathBuf) {
    let root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("target/test_dbs");
    std::fs::create_dir_all(&root).unwrap();
    let id = Uuid::new_v4();
    (
        root.join(format!("transfers_{}.csv", id)),
        root.join(format!("ledger_{}.db", id)),
    )
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn decimal(value: &str) -> BigDecimal {
    BigDecimal::from_str(value).unwrap()
}

#[tokio::test]
async fn test_complete_statement_workflow() {
    let (input, db) = scratch_paths();
    std::fs::write(&input, "2024-01-01,A,B,100\n2024-01-02,B,A,30\n").unwrap();

    let storage = SqliteStorage::open(&db).await.unwrap();
    let mut ledger = Ledger::new(storage);

    let stored = ledger.ingest(&RecordSource::new(&input)).await.unwrap();
    assert_eq!(stored, 2);

    let statement = ledger.statement().await.unwrap();
    assert_eq!(statement.parties, vec!["A", "B"]);
    assert_eq!(
        statement.rows.iter().map(|r| r.date).collect::<Vec<_>>(),
        vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]
    );

    let mut out = Vec::new();
    statement.write_csv(&mut out).unwrap();
    assert_eq!(
        String::from_utf8(out).unwrap(),
        "date,A,B\n2024-01-01,0,0\n2024-01-02,-100,100\n2024-01-03,-70,70\n"
    );

    ledger.into_storage().close().await.unwrap();
}

#[tokio::test]
async fn test_reingest_doubles_balances_and_persists() {
    let (input, db) = scratch_paths();
    std::fs::write(&input, "2024-02-01,alice,bob,12.5\n2024-02-03,bob,carol,2.5\n").unwrap();
    let source = RecordSource::new(&input);

    let mut ledger = Ledger::new(SqliteStorage::open(&db).await.unwrap());
    ledger.ingest(&source).await.unwrap();
    let first = ledger.statement().await.unwrap();
    ledger.into_storage().close().await.unwrap();

    // Reopening keeps earlier records; a second ingest appends duplicates
    let mut ledger = Ledger::new(SqliteStorage::open(&db).await.unwrap());
    assert_eq!(ledger.storage().record_count().await.unwrap(), 2);
    ledger.ingest(&source).await.unwrap();
    let second = ledger.statement().await.unwrap();

    assert_eq!(first.parties, second.parties);
    for (party, balance) in second.closing_balances() {
        let single = first.balance(party, date(2024, 2, 4)).unwrap();
        assert_eq!(balance, &(single * BigDecimal::from(2)), "party {}", party);
    }
    assert_eq!(
        second.balance("bob", date(2024, 2, 4)),
        Some(&decimal("20.0"))
    );

    // Computing again over the unchanged store changes nothing
    assert_eq!(ledger.statement().await.unwrap(), second);
    ledger.into_storage().close().await.unwrap();
}

#[tokio::test]
async fn test_malformed_line_aborts_without_ingesting() {
    let (input, db) = scratch_paths();
    std::fs::write(
        &input,
        "2024-01-01,A,B,100\n2024-01-02,B,A,30,extra\n2024-01-03,A,B,1\n",
    )
    .unwrap();

    let mut ledger = Ledger::new(SqliteStorage::open(&db).await.unwrap());
    let result = ledger.ingest(&RecordSource::new(&input)).await;

    match result {
        Err(LedgerError::MalformedRecord { line, raw, .. }) => {
            assert_eq!(line, 2);
            assert_eq!(raw, "2024-01-02,B,A,30,extra");
        }
        other => panic!("expected malformed record, got {:?}", other),
    }
    assert_eq!(ledger.storage().record_count().await.unwrap(), 0);
    ledger.into_storage().close().await.unwrap();
}

#[tokio::test]
async fn test_negative_amount_aborts_run() {
    let (input, db) = scratch_paths();
    std::fs::write(&input, "2024-01-01,A,B,100\n2024-01-02,B,A,-5\n").unwrap();

    let mut ledger = Ledger::new(SqliteStorage::open(&db).await.unwrap());
    let result = ledger.ingest(&RecordSource::new(&input)).await;

    assert!(matches!(result, Err(LedgerError::ConstraintViolation(_))));
    assert_eq!(ledger.storage().record_count().await.unwrap(), 0);
    ledger.into_storage().close().await.unwrap();
}

#[tokio::test]
async fn test_empty_ledger_statement_is_header_only() {
    let (input, db) = scratch_paths();
    std::fs::write(&input, "").unwrap();

    let mut ledger = Ledger::new(SqliteStorage::open(&db).await.unwrap());
    assert_eq!(ledger.ingest(&RecordSource::new(&input)).await.unwrap(), 0);

    let statement = ledger.statement().await.unwrap();
    assert!(statement.is_empty());
    assert_eq!(statement.to_rows(), vec![vec!["date".to_string()]]);
    ledger.into_storage().close().await.unwrap();
}

#[tokio::test]
async fn test_closing_row_equals_direct_net_totals() {
    let records = vec![
        TransferRecord::new("2023-12-30", "ops", "payroll", decimal("1500")),
        TransferRecord::new("2024-01-02", "payroll", "dana", decimal("700.10")),
        TransferRecord::new("2023-12-31", "ops", "vendor", decimal("99.90")),
        TransferRecord::new("2024-01-02", "vendor", "ops", decimal("10")),
        TransferRecord::new("2024-01-02 17:45:00", "dana", "ops", decimal("0.10")),
    ];

    let mut storage = SqliteStorage::open_in_memory().await.unwrap();
    for record in &records {
        storage.insert(record).await.unwrap();
    }
    let ledger = Ledger::new(storage);
    let statement = ledger.statement().await.unwrap();

    assert_eq!(
        statement.rows.last().map(|r| r.date),
        Some(date(2024, 1, 3))
    );
    for (party, balance) in statement.closing_balances() {
        let expected: BigDecimal = records.iter().map(|r| r.signed_amount_for(party)).sum();
        assert_eq!(balance, &expected, "party {}", party);
    }
    for balance in &statement.rows[0].balances {
        assert_eq!(balance, &BigDecimal::from(0));
    }
    ledger.into_storage().close().await.unwrap();
}

/// Settings pointing a run at scratch input, store and statement files
fn run_settings(input: &Path, db: &Path, statement: &Path) -> Settings {
    Settings::from_toml(&format!(
        "[input]\npath = '{}'\n[storage]\npath = '{}'\n[statement]\npath = '{}'\n",
        input.display(),
        db.display(),
        statement.display()
    ))
    .unwrap()
}

#[tokio::test]
async fn test_run_writes_statement_file() {
    let (input, db) = scratch_paths();
    let statement = input.with_extension("statement.csv");
    std::fs::write(&input, "2024-01-01,A,B,100\n2024-01-02,B,A,30\n").unwrap();

    app::run(&run_settings(&input, &db, &statement)).await.unwrap();

    assert_eq!(
        std::fs::read_to_string(&statement).unwrap(),
        "date,A,B\n2024-01-01,0,0\n2024-01-02,-100,100\n2024-01-03,-70,70\n"
    );
}

#[tokio::test]
async fn test_failed_run_writes_nothing_and_releases_store() {
    let (input, db) = scratch_paths();
    let statement = input.with_extension("statement.csv");
    std::fs::write(&input, "2024-01-01,A,B,100\n\n2024-01-03,B,A,30\n").unwrap();

    let result = app::run(&run_settings(&input, &db, &statement)).await;

    assert!(matches!(
        result,
        Err(LedgerError::MalformedRecord { line: 2, .. })
    ));
    assert!(!statement.exists());

    let storage = SqliteStorage::open(&db).await.unwrap();
    assert_eq!(storage.record_count().await.unwrap(), 0);
    storage.close().await.unwrap();
}

