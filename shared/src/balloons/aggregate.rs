use crate::balloons::feed::{FetchError, HourFeed};
use crate::balloons::repair::{parse_snapshot, repair};
use crate::balloons::validate::validate_positions;
use crate::model::{FlightHistory, HOURS_TRACKED, HourSnapshot, ObjectPosition};
use tracing::{debug, warn};

/// Runs fetch → repair → validate for every hour offset in the 24-hour
/// window, strictly sequentially (one in-flight upstream request at a time).
/// Per-hour failures never escape: a failed hour lands in `missing_hours`
/// and the remaining hours are still processed.
pub async fn build_flight_history<F: HourFeed>(feed: &F) -> FlightHistory {
    let mut history = FlightHistory::default();
    for hours_ago in 0..HOURS_TRACKED {
        match ingest_hour(feed, hours_ago).await {
            Some(positions) => {
                debug!(
                    hours_ago,
                    count = positions.len(),
                    "ingested hour snapshot"
                );
                history.snapshots.push(HourSnapshot {
                    hours_ago,
                    positions,
                });
            }
            None => history.missing_hours.push(hours_ago),
        }
    }
    history
}

/// One hour through the pipeline. `None` uniformly covers not-found,
/// transport failure, unrecoverable malformation and empty-after-validation.
async fn ingest_hour<F: HourFeed>(feed: &F, hours_ago: u8) -> Option<Vec<ObjectPosition>> {
    let raw = match feed.fetch_hour(hours_ago).await {
        Ok(raw) => raw,
        Err(FetchError::NotFound) => {
            debug!(hours_ago, "no upstream data published for hour");
            return None;
        }
        Err(e) => {
            warn!(hours_ago, error = ?e, "failed to fetch hour payload");
            return None;
        }
    };

    let elements = match parse_snapshot(&repair(&raw)) {
        Ok(elements) => elements,
        Err(e) => {
            warn!(hours_ago, error = ?e, "payload unrecoverable after repair");
            return None;
        }
    };

    let positions = validate_positions(&elements);
    if positions.is_empty() {
        warn!(hours_ago, "no valid positions left after validation");
        return None;
    }
    Some(positions)
}
