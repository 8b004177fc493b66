use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use dotenv::dotenv;

use splitledger::api::{create_app, AppState};
use splitledger::configure::load_config;
use splitledger::logger::setup_logger;
use splitledger::service::ExpenseService;
use splitledger::store::{LedgerStore, MemoryLedgerStore, SledLedgerStore};

#[derive(Parser, Debug)]
#[command(name = "splitledger_server", about = "Shared-expense ledger service")]
struct Args {
    /// Override the configured listen address
    #[arg(long)]
    listen: Option<String>,

    /// Override the configured storage backend (memory | sled)
    #[arg(long)]
    storage: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    let args = Args::parse();

    let mut config = load_config()?;
    if let Some(listen) = args.listen {
        config.listen_addr = listen;
    }
    if let Some(storage) = args.storage {
        config.storage = storage;
    }

    setup_logger(&config)?;

    let store: Arc<dyn LedgerStore> = match config.storage.as_str() {
        "memory" => Arc::new(MemoryLedgerStore::new()),
        "sled" => {
            log::info!("Opening sled store at {}", config.data_dir);
            Arc::new(SledLedgerStore::open(&config.data_dir)?)
        }
        other => return Err(anyhow::anyhow!("Unknown storage backend: {}", other).into()),
    };

    let service = ExpenseService::new(store, Duration::from_millis(config.lock_timeout_ms));
    let state = Arc::new(AppState { service });
    let app = create_app(state);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr).await?;
    log::info!("Listening on {} (storage: {})", config.listen_addr, config.storage);
    axum::serve(listener, app).await?;

    Ok(())
}
