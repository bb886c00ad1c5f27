use crate::Config;
use crate::balloons::aggregate::build_flight_history;
use crate::balloons::feed::TreasureFeed;
use crate::quakes::{QuakeFeedError, fetch_quake_features};
use crate::store::{Store, StoreError};
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("failed to persist artifact: {0}")]
    Persist(#[from] StoreError),
    #[error("quake feed error: {0}")]
    QuakeFeed(#[from] QuakeFeedError),
}

/// One full ingestion cycle: assemble the 24-hour flight history, persist it,
/// then fetch and persist the recent quake events. The flight history is
/// saved before the quake feed is touched, so a quake failure never costs the
/// already-ingested history. On a persist failure the prior artifact on disk
/// remains valid and the next scheduled cycle retries from scratch.
pub async fn run_cycle(
    client: &reqwest::Client,
    config: &Config,
    store: &Store,
) -> Result<(), CycleError> {
    let cycle_id = Uuid::now_v7();
    info!(cycle = %cycle_id, "starting ingestion cycle");

    let feed = TreasureFeed::new(client.clone(), config.feed.base_url.clone());
    let history = build_flight_history(&feed).await;
    info!(
        cycle = %cycle_id,
        snapshots = history.snapshots.len(),
        missing_hours = ?history.missing_hours,
        "assembled flight history"
    );
    store.save_history(&history)?;

    let features = fetch_quake_features(client, &config.quakes).await?;
    info!(cycle = %cycle_id, events = features.len(), "fetched quake events");
    store.save_quake_features(&features)?;

    info!(cycle = %cycle_id, "ingestion cycle complete");
    Ok(())
}
