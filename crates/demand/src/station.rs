use std::collections::BTreeSet;

use foundation::geo::LatLng;
use foundation::ids::StationId;
use serde::{Deserialize, Serialize};

/// A charging station as delivered by the dashboard API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    #[serde(rename = "station_id", alias = "id")]
    pub id: StationId,
    #[serde(rename = "station_name", alias = "name")]
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Station {
    pub fn new(id: i64, name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        Self {
            id: StationId(id),
            name: name.into(),
            latitude,
            longitude,
        }
    }

    pub fn position(&self) -> LatLng {
        LatLng::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StationError {
    NonFiniteCoordinate { id: StationId },
    DuplicateId { id: StationId },
}

impl StationError {
    pub fn station_id(&self) -> StationId {
        match self {
            StationError::NonFiniteCoordinate { id } | StationError::DuplicateId { id } => *id,
        }
    }
}

impl std::fmt::Display for StationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StationError::NonFiniteCoordinate { id } => {
                write!(f, "station {id} has a non-finite coordinate")
            }
            StationError::DuplicateId { id } => {
                write!(f, "station id {id} appears more than once")
            }
        }
    }
}

impl std::error::Error for StationError {}

/// Splits `stations` into the usable ones and the rejected ones.
///
/// Input order is preserved. Coordinates are checked first; among the
/// stations with finite coordinates the first occurrence of an id wins and
/// every later one is rejected.
pub fn partition_valid(stations: &[Station]) -> (Vec<&Station>, Vec<StationError>) {
    let mut seen = BTreeSet::new();
    let mut valid = Vec::with_capacity(stations.len());
    let mut rejected = Vec::new();

    for station in stations {
        if !station.position().is_finite() {
            rejected.push(StationError::NonFiniteCoordinate { id: station.id });
            continue;
        }
        if !seen.insert(station.id) {
            rejected.push(StationError::DuplicateId { id: station.id });
            continue;
        }
        valid.push(station);
    }

    (valid, rejected)
}
