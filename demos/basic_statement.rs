//! Basic statement example

use transfer_ledger::utils::MemoryStorage;
use transfer_ledger::{Ledger, Records};

const TRANSFERS: &str = "\
2024-01-01,alice,bob,100
2024-01-02,bob,alice,30
2024-01-02,carol,bob,12.50
2024-01-05,alice,carol,40
";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Transfer Ledger - Basic Statement Example\n");

    // Create a new ledger with in-memory storage
    let mut ledger = Ledger::new(MemoryStorage::new());

    let stored = ledger
        .ingest_records(Records::from_reader(TRANSFERS.as_bytes()))
        .await?;
    println!("Ingested {} transfers\n", stored);

    let statement = ledger.statement().await?;

    println!("Statement:");
    statement.write_csv(std::io::stdout())?;

    println!("\nClosing balances:");
    for (party, balance) in statement.closing_balances() {
        println!("  {:<8} {}", party, balance);
    }

    Ok(())
}
