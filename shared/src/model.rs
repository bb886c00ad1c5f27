use serde::{Deserialize, Serialize};

pub const HOURS_TRACKED: u8 = 24;

/// One tracked balloon at one point in time, serialized on the wire as the
/// bare `[latitude, longitude, altitude]` triplet the upstream feed uses.
///
/// The feed carries no identity field. A balloon is identified only by its
/// index within the containing hour's snapshot, and index `i` at one hour is
/// assumed to refer to the same balloon as index `i` at another hour. The
/// upstream does not actually guarantee that ordering, so cross-hour identity
/// is best-effort and should not be strengthened by consumers.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct ObjectPosition {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl From<[f64; 3]> for ObjectPosition {
    fn from([latitude, longitude, altitude]: [f64; 3]) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }
}

impl From<ObjectPosition> for [f64; 3] {
    fn from(p: ObjectPosition) -> Self {
        [p.latitude, p.longitude, p.altitude]
    }
}

/// Validated positions for a single hour offset. Order of `positions` is
/// significant: index + 1 is the balloon number shown to consumers.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct HourSnapshot {
    pub hours_ago: u8,
    pub positions: Vec<ObjectPosition>,
}

/// The rolling 24-hour history artifact. Rebuilt wholesale every ingestion
/// cycle; hours with a snapshot and `missing_hours` always partition
/// `0..HOURS_TRACKED` after a complete aggregation.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
#[serde(rename_all = "camelCase")]
#[serde(deny_unknown_fields)]
pub struct FlightHistory {
    pub snapshots: Vec<HourSnapshot>,
    pub missing_hours: Vec<u8>,
}

impl FlightHistory {
    pub fn snapshot_at(&self, hours_ago: u8) -> Option<&HourSnapshot> {
        self.snapshots.iter().find(|s| s.hours_ago == hours_ago)
    }
}
