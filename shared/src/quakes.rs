use crate::QuakeConfig;
use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum QuakeFeedError {
    #[error(transparent)]
    Transport(#[from] reqwest::Error),
    #[error(transparent)]
    Deserialize(#[from] serde_json::Error),
    #[error("quake feed response has no features array")]
    MissingFeatures,
}

/// GeoJSON query against the event feed, bounded to a recent window above a
/// magnitude threshold.
pub fn quake_query_url(config: &QuakeConfig, now: DateTime<Utc>) -> String {
    let starttime = (now - TimeDelta::hours(config.window_hours))
        .to_rfc3339_opts(SecondsFormat::Millis, true);
    format!(
        "{}?format=geojson&starttime={}&minmagnitude={}",
        config.endpoint, starttime, config.min_magnitude
    )
}

/// Fetches the recent-event window and returns the raw feature objects, which
/// are persisted exactly as retrieved.
pub async fn fetch_quake_features(
    client: &reqwest::Client,
    config: &QuakeConfig,
) -> Result<Vec<Value>, QuakeFeedError> {
    let url = quake_query_url(config, Utc::now());
    debug!(url = %url, "fetching quake events");
    let body = client
        .get(&url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let mut root: Value = serde_json::from_str(&body)?;
    match root.get_mut("features").map(Value::take) {
        Some(Value::Array(features)) => Ok(features),
        _ => Err(QuakeFeedError::MissingFeatures),
    }
}

/// The slice of a GeoJSON feature the correlator needs. Unknown feed fields
/// are tolerated; the full raw feature is what gets persisted.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct GeoEvent {
    pub geometry: Geometry,
    pub properties: EventProperties,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Geometry {
    /// GeoJSON ordering: `[longitude, latitude, depth]`.
    pub coordinates: Vec<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct EventProperties {
    pub mag: Option<f64>,
    pub place: Option<String>,
    /// Event origin time, epoch milliseconds.
    pub time: i64,
}

impl GeoEvent {
    pub fn from_feature(feature: &Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(feature.clone())
    }

    pub fn longitude(&self) -> Option<f64> {
        self.geometry.coordinates.first().copied()
    }

    pub fn latitude(&self) -> Option<f64> {
        self.geometry.coordinates.get(1).copied()
    }
}
