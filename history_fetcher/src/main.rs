use reqwest::Client;
use shared::cycle::{CycleError, run_cycle};
use shared::error::InitializationError;
use shared::load_config;
use shared::store::Store;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

/// One-shot entry point: run a single ingestion cycle and exit. The scheduled
/// daemon drives the exact same pipeline; this binary exists for manual runs
/// and external schedulers.
#[tokio::main]
async fn main() -> Result<(), AppError> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_env_filter(EnvFilter::from_default_env())
        .finish();

    tracing::subscriber::set_global_default(subscriber).map_err(InitializationError::from)?;

    let config = load_config().map_err(InitializationError::from)?;
    info!(config = ?config, "config loaded");
    let store = Store::new(&config.store.data_dir).map_err(InitializationError::from)?;
    let client = Client::new();

    let res = run_cycle(&client, &config, &store).await;
    match res {
        Ok(()) => info!("ingestion cycle was successful"),
        Err(ref e) => error!(error = ?e, "ingestion cycle failed"),
    }

    Ok(res?)
}

#[derive(Debug, Error)]
enum AppError {
    #[error("initialization error: {0}")]
    Initialization(#[from] InitializationError),
    #[error("ingestion cycle error: {0}")]
    Cycle(#[from] CycleError),
}
