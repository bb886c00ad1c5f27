pub mod balloons;
pub mod correlate;
pub mod cycle;
pub mod model;
pub mod quakes;
pub mod store;

use crate::error::ConfigError;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use serde::Deserialize;
use std::path::PathBuf;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub const ENV_VAR_PREFIX: &str = "BALLOON_WATCH_";
pub const SETTINGS_FILE: &str = "Settings.toml";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub feed: FeedConfig,
    pub quakes: QuakeConfig,
    pub store: StoreConfig,
    pub daemon: DaemonConfig,
}

/// Per-hour balloon position feed. Hour resources live at `{base_url}/{hh}.json`.
#[derive(Debug, Deserialize)]
pub struct FeedConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct QuakeConfig {
    pub endpoint: String,
    pub window_hours: i64,
    pub min_magnitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
}

#[derive(Debug, Deserialize)]
pub struct DaemonConfig {
    pub interval_secs: u64,
    pub health_addr: String,
}

pub fn load_config() -> Result<Config, ConfigError> {
    Ok(Figment::new()
        .merge(Toml::file(SETTINGS_FILE))
        .merge(Env::prefixed(ENV_VAR_PREFIX).split("__"))
        .extract::<Config>()?)
}

pub async fn shutdown_listener(token: Option<CancellationToken>) {
    let ctrl_c = signal::ctrl_c();
    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C signal, shutting down"),
        _ = terminate => info!("received SIGTERM signal, shutting down"),
    }

    if let Some(token) = token {
        token.cancel();
    }
}

pub mod error {
    use thiserror::Error;
    use tracing::dispatcher::SetGlobalDefaultError;

    #[derive(Debug, Error)]
    pub enum ConfigError {
        #[error("failed to load configuration: {0}")]
        Figment(#[from] figment::Error),
    }

    #[derive(Debug, Error)]
    pub enum InitializationError {
        #[error(transparent)]
        Tracing(#[from] SetGlobalDefaultError),
        #[error(transparent)]
        Config(#[from] crate::ConfigError),
        #[error(transparent)]
        Store(#[from] crate::store::StoreError),
    }
}
