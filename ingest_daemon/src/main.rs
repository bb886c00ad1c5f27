#[warn(clippy::pedantic)]
mod error;

use crate::error::MainError;
use axum::Router;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use chrono::{DateTime, TimeDelta, Utc};
use parking_lot::RwLock;
use shared::cycle::{CycleError, run_cycle};
use shared::error::InitializationError;
use shared::store::Store;
use shared::{Config, load_config, shutdown_listener};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), MainError> {
    let subscriber = tracing_subscriber::fmt()
        .compact()
        .with_file(true)
        .with_line_number(true)
        .with_env_filter(EnvFilter::from_default_env())
        .finish();

    tracing::subscriber::set_global_default(subscriber).map_err(InitializationError::Tracing)?;

    // Set up config
    let config = load_config().unwrap_or_else(|e| {
        error!(error = ?e, "configuration could not be initialized");
        panic!("configuration could not be initialized");
    });

    let store = Store::new(&config.store.data_dir).map_err(InitializationError::from)?;

    let last_attempted_cycle = Arc::new(RwLock::new(None));
    let last_successful_cycle = Arc::new(RwLock::new(None));
    let last_error = Arc::new(RwLock::new(None));

    // Cancellation token shared across tasks; listener cancels on SIGINT/SIGTERM.
    let shutdown_token = CancellationToken::new();
    let signal_handle = tokio::spawn(shutdown_listener(Some(shutdown_token.clone())));

    let axum_handle = tokio::spawn(run_health_server(
        config.daemon.health_addr.clone(),
        TimeDelta::seconds(2 * config.daemon.interval_secs as i64),
        Arc::clone(&last_attempted_cycle),
        Arc::clone(&last_successful_cycle),
        Arc::clone(&last_error),
        shutdown_token.clone(),
    ));

    let cycle_handle = tokio::spawn(cycle_loop(
        config,
        store,
        last_attempted_cycle,
        last_successful_cycle,
        last_error,
        shutdown_token.clone(),
    ));

    tokio::select! {
        res = axum_handle => {
            shutdown_token.cancel();
            res??;
        }
        res = cycle_handle => {
            shutdown_token.cancel();
            res?;
        }
        res = signal_handle => {
            shutdown_token.cancel();
            res?;
        }
    }

    Ok(())
}

/// Ingestion cycles run back to back on a fixed interval, strictly
/// serialized: the next cycle cannot start before the previous await
/// returns, which is what keeps the full-replace persistence safe.
async fn cycle_loop(
    config: Config,
    store: Store,
    last_attempted_cycle: Arc<RwLock<Option<DateTime<Utc>>>>,
    last_successful_cycle: Arc<RwLock<Option<DateTime<Utc>>>>,
    last_error: Arc<RwLock<Option<CycleError>>>,
    shutdown: CancellationToken,
) {
    // Default reqwest client, shared across cycles
    let http_client = reqwest::Client::new();

    info!("initialized ingest daemon");
    let mut initial_loop = true;
    loop {
        if initial_loop {
            initial_loop = false;
        } else {
            tokio::select! {
                _ = sleep(Duration::from_secs(config.daemon.interval_secs)) => {},
                _ = shutdown.cancelled() => {
                    info!("shutdown requested, exiting cycle loop");
                    break;
                }
            }
        }

        *last_attempted_cycle.write() = Some(Utc::now());
        match run_cycle(&http_client, &config, &store).await {
            Ok(()) => {
                *last_successful_cycle.write() = Some(Utc::now());
            }
            Err(e) => {
                warn!(error = ?e, "ingestion cycle failed, prior artifacts remain current");
                *last_error.write() = Some(e);
            }
        }

        // If shutdown was requested during processing, break after finishing the iteration.
        if shutdown.is_cancelled() {
            info!("shutdown requested, cycle loop exiting after current iteration");
            break;
        }
    }
}

#[derive(Clone)]
struct AxumState {
    stale_after: TimeDelta,
    last_attempted_cycle: Arc<RwLock<Option<DateTime<Utc>>>>,
    last_successful_cycle: Arc<RwLock<Option<DateTime<Utc>>>>,
    last_error: Arc<RwLock<Option<CycleError>>>,
}

async fn run_health_server(
    addr: String,
    stale_after: TimeDelta,
    last_attempted_cycle: Arc<RwLock<Option<DateTime<Utc>>>>,
    last_successful_cycle: Arc<RwLock<Option<DateTime<Utc>>>>,
    last_error: Arc<RwLock<Option<CycleError>>>,
    shutdown: CancellationToken,
) -> Result<(), std::io::Error> {
    info!(addr = %addr, "starting axum health server");
    let app = Router::new()
        .route("/health", get(health_check))
        .with_state(AxumState {
            stale_after,
            last_attempted_cycle,
            last_successful_cycle,
            last_error,
        });
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
        })
        .await?;
    Ok(())
}

async fn health_check(State(state): State<AxumState>) -> impl IntoResponse {
    let last_attempted_cycle = *state.last_attempted_cycle.read();
    let last_successful_cycle = *state.last_successful_cycle.read();
    let last_error = if let Some(e) = state.last_error.read().as_ref() {
        format!("{e:?}")
    } else {
        "unknown".to_string()
    };

    if last_attempted_cycle.is_none() || last_successful_cycle.is_none() {
        if let Some(last_attempted_cycle) = last_attempted_cycle {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!(
                    "No ingestion cycle has succeeded yet. Last attempted cycle: {last_attempted_cycle}. Last error: {last_error}"
                ),
            );
        } else {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                "No attempted or successful ingestion cycles".to_string(),
            );
        }
    }

    // We can safely unwrap here because we checked is_none above
    let last_attempted_cycle = last_attempted_cycle.unwrap();
    let last_successful_cycle = last_successful_cycle.unwrap();
    if (Utc::now() - last_successful_cycle) > state.stale_after {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!(
                "Ingestion has gone stale. Last successful cycle: {last_successful_cycle}. Last attempted cycle: {last_attempted_cycle}. Last error: {last_error}"
            ),
        )
    } else {
        (
            StatusCode::OK,
            format!("Ingestion cycle last succeeded: {last_successful_cycle}"),
        )
    }
}
