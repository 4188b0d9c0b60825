use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use transfer_ledger::app;
use transfer_ledger::settings::Settings;

#[derive(Parser, Debug)]
#[command(
    name = "transfer-ledger",
    version,
    about = "Ingest money transfers and emit a per-party balance statement"
)]
struct Cli {
    /// Ledger file of `date,debtor,creditor,amount` lines (default: transactions.csv)
    ledger_file: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut settings = match Settings::new() {
        Ok(settings) => settings,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };
    if let Some(path) = cli.ledger_file {
        settings.input.path = path;
    }

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("transfer_ledger={}", settings.app.level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match app::run(&settings).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!(%err, "run failed");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
