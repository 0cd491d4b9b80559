use clap::Parser;
use jobmarket::application::Marketplace;
use jobmarket::config::EngineConfig;
use jobmarket::domain::ports::StoreBox;
use jobmarket::infrastructure::in_memory::InMemoryStore;
use jobmarket::infrastructure::notifier::LogNotifier;
use jobmarket::interfaces::csv::job_writer::JobWriter;
use jobmarket::interfaces::jsonl::request_reader::RequestReader;
use miette::{IntoDiagnostic, Result};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input file with one JSON request per line
    input: PathBuf,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long, env = "JOBMARKET_DB_PATH")]
    db_path: Option<PathBuf>,

    /// Replace a job's budget with the winning bid amount on assignment
    #[arg(long)]
    overwrite_budget: bool,
}

fn open_store(db_path: Option<PathBuf>) -> Result<StoreBox> {
    match db_path {
        #[cfg(feature = "storage-rocksdb")]
        Some(path) => {
            let store = jobmarket::infrastructure::rocksdb::RocksDBStore::open(path)
                .into_diagnostic()?;
            Ok(Box::new(store))
        }
        #[cfg(not(feature = "storage-rocksdb"))]
        Some(_) => {
            eprintln!(
                "WARNING: Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to In-Memory storage."
            );
            Ok(Box::new(InMemoryStore::new()))
        }
        None => Ok(Box::new(InMemoryStore::new())),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "jobmarket=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = EngineConfig::default().with_budget_overwrite(cli.overwrite_budget);
    let store = open_store(cli.db_path)?;
    let market = Marketplace::new(store, Box::new(LogNotifier), config);

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = RequestReader::new(file);
    for request in reader.requests() {
        match request {
            Ok(request) => match request.dispatch(&market).await {
                Ok(outcome) => tracing::debug!("{outcome}"),
                Err(e) => eprintln!("Request rejected: {}", e),
            },
            Err(e) => {
                eprintln!("Error reading request: {}", e);
            }
        }
    }

    let jobs = market.into_results().await.into_diagnostic()?;

    let stdout = io::stdout();
    let mut writer = JobWriter::new(stdout.lock());
    writer.write_jobs(&jobs).into_diagnostic()?;

    Ok(())
}
