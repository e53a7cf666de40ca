use clap::Parser;
use miette::{IntoDiagnostic, Result};
use payrail::application::context::PayrollPorts;
use payrail::application::engine::PayrollEngine;
use payrail::config::{BridgeKind, OrchestratorConfig};
use payrail::domain::ports::{BridgeAdapterBox, Clock, CompanyStoreBox, CursorStoreBox, EmployeeStoreBox, EventLogBox};
use payrail::domain::value::Address;
use payrail::infrastructure::bridge::{BurnMintBridge, LockMintBridge};
use payrail::infrastructure::clock::{ManualClock, SystemClock};
use payrail::infrastructure::in_memory::{
    InMemoryCompanyStore, InMemoryCursorStore, InMemoryEmployeeStore, InMemoryEventLog,
};
use payrail::infrastructure::ledger::InMemoryTokenLedger;
use payrail::interfaces::csv::command_reader::CommandReader;
use payrail::interfaces::csv::event_writer::EventWriter;
use payrail::interfaces::runner::ScriptRunner;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Input command script (CSV)
    input: PathBuf,

    /// Orchestrator config file (JSON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to persistent database (optional). If provided, uses RocksDB.
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Starting time of the simulated clock, in seconds. Defaults to now.
    #[arg(long)]
    start_time: Option<u64>,

    /// Bridge backend, overriding the config file
    #[arg(long, value_enum)]
    bridge: Option<BridgeKind>,
}

type Stores = (CompanyStoreBox, EmployeeStoreBox, CursorStoreBox, EventLogBox);

fn in_memory_stores() -> Stores {
    (
        Box::new(InMemoryCompanyStore::new()),
        Box::new(InMemoryEmployeeStore::new()),
        Box::new(InMemoryCursorStore::new()),
        Box::new(InMemoryEventLog::new()),
    )
}

#[cfg(feature = "storage-rocksdb")]
fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    use payrail::infrastructure::rocksdb::RocksDBStore;

    match db_path {
        Some(path) => {
            let store = RocksDBStore::open(path).into_diagnostic()?;
            let stores: Stores = (
                Box::new(store.clone()),
                Box::new(store.clone()),
                Box::new(store.clone()),
                Box::new(store),
            );
            Ok(stores)
        }
        None => Ok(in_memory_stores()),
    }
}

#[cfg(not(feature = "storage-rocksdb"))]
fn open_stores(db_path: Option<PathBuf>) -> Result<Stores> {
    if db_path.is_some() {
        tracing::warn!(
            "persistent storage requested via --db-path, but the 'storage-rocksdb' feature is not enabled; falling back to in-memory storage"
        );
    }
    Ok(in_memory_stores())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => OrchestratorConfig::from_file(path).into_diagnostic()?,
        None => OrchestratorConfig::default(),
    };
    if let Some(kind) = cli.bridge {
        config.bridge = kind;
    }

    let ledger = InMemoryTokenLedger::new();
    let clock = ManualClock::new(cli.start_time.unwrap_or_else(|| SystemClock.now()));
    let bridge: BridgeAdapterBox = match config.bridge {
        BridgeKind::BurnMint => Box::new(BurnMintBridge::new(
            ledger.clone(),
            Address::new("bridge-emitter"),
            config.bridge_fee,
        )),
        BridgeKind::LockMint => Box::new(LockMintBridge::new(
            ledger.clone(),
            Address::new("bridge-pool"),
            config.bridge_fee,
        )),
    };

    let (companies, employees, cursor, events) = open_stores(cli.db_path)?;
    let ports = PayrollPorts {
        companies,
        employees,
        cursor,
        events,
        ledger: Arc::new(ledger.clone()),
        bridge,
        clock: Arc::new(clock.clone()),
    };
    let engine = PayrollEngine::new(config, ports).into_diagnostic()?;
    let runner = ScriptRunner::new(&engine, &ledger, &clock);

    let file = File::open(cli.input).into_diagnostic()?;
    let reader = CommandReader::new(file);
    for command in reader.commands() {
        match command {
            Ok(command) => {
                if let Err(e) = runner.apply(command).await {
                    eprintln!("Error processing command: {}", e);
                }
            }
            Err(e) => {
                eprintln!("Error reading command: {}", e);
            }
        }
    }

    let records = engine.events().await.into_diagnostic()?;
    let stdout = io::stdout();
    let mut writer = EventWriter::new(stdout.lock());
    writer.write_events(&records).into_diagnostic()?;

    Ok(())
}
