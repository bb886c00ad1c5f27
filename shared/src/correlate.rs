use crate::model::{FlightHistory, HOURS_TRACKED};
use crate::quakes::GeoEvent;
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Nearest tracked balloon to an event, at the snapshot matching the event's
/// hour offset. Absence of a result is the normal "no snapshot recorded at
/// that offset" outcome, not a fault.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorrelationResult {
    /// 1-based index of the balloon within the matched snapshot.
    pub object_index: usize,
    pub distance_km: f64,
    pub hours_ago: u8,
}

/// Great-circle distance between two points, spherical Earth.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();
    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// Hour offset an event timestamp (epoch ms) aligns with: the floor of the
/// elapsed time in whole hours. `None` for future events and for offsets past
/// the tracked window, where no snapshot can exist.
pub fn event_hours_ago(event_time_ms: i64, now: DateTime<Utc>) -> Option<u8> {
    let elapsed_ms = now.timestamp_millis() - event_time_ms;
    if elapsed_ms < 0 {
        return None;
    }
    let hours = elapsed_ms / 3_600_000;
    (hours < i64::from(HOURS_TRACKED)).then_some(hours as u8)
}

/// Scans the matched snapshot in ascending index order with a strict
/// less-than comparison, so the first-encountered minimum wins exact ties.
/// Pure read over the history; O(N) in the snapshot's position count.
pub fn nearest_object(
    event: &GeoEvent,
    history: &FlightHistory,
    now: DateTime<Utc>,
) -> Option<CorrelationResult> {
    let hours_ago = event_hours_ago(event.properties.time, now)?;
    let snapshot = history.snapshot_at(hours_ago)?;
    let event_lat = event.latitude()?;
    let event_lng = event.longitude()?;

    let mut nearest: Option<(usize, f64)> = None;
    for (index, position) in snapshot.positions.iter().enumerate() {
        let distance = haversine_km(event_lat, event_lng, position.latitude, position.longitude);
        if nearest.is_none_or(|(_, best)| distance < best) {
            nearest = Some((index, distance));
        }
    }

    nearest.map(|(index, distance_km)| CorrelationResult {
        object_index: index + 1,
        distance_km,
        hours_ago,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{HourSnapshot, ObjectPosition};
    use crate::quakes::{EventProperties, Geometry};
    use chrono::TimeDelta;

    fn event_at(latitude: f64, longitude: f64, time_ms: i64) -> GeoEvent {
        GeoEvent {
            geometry: Geometry {
                coordinates: vec![longitude, latitude, 10.0],
            },
            properties: EventProperties {
                mag: Some(4.5),
                place: Some("test region".to_string()),
                time: time_ms,
            },
        }
    }

    fn history_with(hours_ago: u8, triplets: &[[f64; 3]]) -> FlightHistory {
        FlightHistory {
            snapshots: vec![HourSnapshot {
                hours_ago,
                positions: triplets.iter().copied().map(ObjectPosition::from).collect(),
            }],
            missing_hours: vec![],
        }
    }

    #[test]
    fn one_degree_of_longitude_at_the_equator() {
        let d = haversine_km(0.0, 0.0, 0.0, 1.0);
        assert!((d - 111.195).abs() < 0.01, "got {d}");
    }

    #[test]
    fn haversine_is_zero_for_identical_points() {
        assert_eq!(haversine_km(35.0, -120.0, 35.0, -120.0), 0.0);
    }

    #[test]
    fn event_offset_is_floored_to_whole_hours() {
        let now = Utc::now();
        let t = (now - TimeDelta::minutes(3 * 60 + 30)).timestamp_millis();
        assert_eq!(event_hours_ago(t, now), Some(3));

        let just_now = now.timestamp_millis();
        assert_eq!(event_hours_ago(just_now, now), Some(0));
    }

    #[test]
    fn future_and_stale_events_align_with_no_offset() {
        let now = Utc::now();
        let future = (now + TimeDelta::minutes(5)).timestamp_millis();
        assert_eq!(event_hours_ago(future, now), None);

        let too_old = (now - TimeDelta::hours(24)).timestamp_millis();
        assert_eq!(event_hours_ago(too_old, now), None);
    }

    #[test]
    fn correlates_to_the_nearest_balloon_at_the_matching_hour() {
        let now = Utc::now();
        let history = history_with(3, &[[10.0, 10.0, 100.0], [0.0, 0.0, 50.0]]);
        let event_time = (now - TimeDelta::minutes(3 * 60 + 10)).timestamp_millis();
        let event = event_at(0.1, 0.1, event_time);

        let result = nearest_object(&event, &history, now).unwrap();
        assert_eq!(result.object_index, 2);
        assert_eq!(result.hours_ago, 3);
        assert_eq!(result.distance_km, haversine_km(0.1, 0.1, 0.0, 0.0));
    }

    #[test]
    fn no_snapshot_at_the_offset_means_no_match() {
        let now = Utc::now();
        let history = history_with(5, &[[0.0, 0.0, 50.0]]);
        let event_time = (now - TimeDelta::hours(3)).timestamp_millis();
        let event = event_at(0.0, 0.0, event_time);
        assert_eq!(nearest_object(&event, &history, now), None);
    }

    #[test]
    fn exact_ties_go_to_the_lower_index() {
        let now = Utc::now();
        // Two balloons at the same point differ only in altitude; the scan
        // must keep the first.
        let history = history_with(0, &[[5.0, 5.0, 100.0], [5.0, 5.0, 14000.0]]);
        let event = event_at(0.0, 0.0, now.timestamp_millis());

        let result = nearest_object(&event, &history, now).unwrap();
        assert_eq!(result.object_index, 1);
    }

    #[test]
    fn empty_snapshot_yields_no_match() {
        let now = Utc::now();
        let history = history_with(0, &[]);
        let event = event_at(0.0, 0.0, now.timestamp_millis());
        assert_eq!(nearest_object(&event, &history, now), None);
    }
}
