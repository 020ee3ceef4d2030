use foundation::ids::StationId;
use serde::{Deserialize, Serialize};

use crate::severity::{SeverityBand, classify};
use crate::station::{Station, StationError, partition_valid};

/// Placeholder demand signal used for visualization intensity.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DemandScore(pub i64);

impl DemandScore {
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for DemandScore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

const BASE_DEMAND: i64 = 30;
const ID_SPREAD: i64 = 40;
const LATITUDE_BAND_DEG: f64 = 0.1;
const LATITUDE_GAIN: f64 = 10.0;

/// `round((30 + id % 40) * (1 + (latitude % 0.1) * 10))`.
///
/// Both remainders truncate toward zero. Halves round toward positive
/// infinity. Returns `None` for a non-finite latitude.
pub fn demand_score(id: StationId, latitude: f64) -> Option<DemandScore> {
    if !latitude.is_finite() {
        return None;
    }
    let base = (BASE_DEMAND + id.get() % ID_SPREAD) as f64;
    let multiplier = 1.0 + (latitude % LATITUDE_BAND_DEG) * LATITUDE_GAIN;
    Some(DemandScore(round_half_up(base * multiplier)))
}

pub fn score(station: &Station) -> Result<DemandScore, StationError> {
    demand_score(station.id, station.latitude)
        .ok_or(StationError::NonFiniteCoordinate { id: station.id })
}

fn round_half_up(x: f64) -> i64 {
    let floor = x.floor();
    if x - floor >= 0.5 {
        floor as i64 + 1
    } else {
        floor as i64
    }
}

/// A station together with its derived score and band.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredStation {
    pub station: Station,
    pub score: DemandScore,
    pub band: SeverityBand,
}

impl ScoredStation {
    pub fn new(station: Station, score: DemandScore) -> Self {
        Self {
            band: classify(score),
            station,
            score,
        }
    }
}

/// Result of scoring one input list.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Evaluation {
    /// Valid stations in input order.
    pub scored: Vec<ScoredStation>,
    pub rejected: Vec<StationError>,
}

/// Scores and classifies every valid, distinct station in `stations`.
pub fn evaluate(stations: &[Station]) -> Evaluation {
    let (valid, mut rejected) = partition_valid(stations);
    let mut scored = Vec::with_capacity(valid.len());
    for station in valid {
        match score(station) {
            Ok(s) => scored.push(ScoredStation::new(station.clone(), s)),
            Err(e) => rejected.push(e),
        }
    }
    Evaluation { scored, rejected }
}

#[cfg(test)]
mod tests {
    use super::{DemandScore, demand_score, evaluate, score};
    use crate::station::{Station, StationError};
    use foundation::ids::StationId;

    fn formula(id: i64, lat: f64) -> i64 {
        ((30 + id % 40) as f64 * (1.0 + (lat % 0.1) * 10.0)).round() as i64
    }

    #[test]
    fn zero_latitude_keeps_base_demand() {
        assert_eq!(demand_score(StationId(0), 0.0), Some(DemandScore(30)));
        assert_eq!(demand_score(StationId(39), 0.0), Some(DemandScore(69)));
        assert_eq!(demand_score(StationId(45), 0.0), Some(DemandScore(35)));
    }

    #[test]
    fn negative_ids_use_truncated_remainder() {
        assert_eq!(demand_score(StationId(-5), 0.0), Some(DemandScore(25)));
        assert_eq!(demand_score(StationId(-45), 0.0), Some(DemandScore(25)));
    }

    #[test]
    fn matches_formula_for_dashboard_stations() {
        let stations = [
            (1, 28.6315),
            (2, 28.5222),
            (3, 28.5921),
            (4, 28.6512),
            (5, 28.5672),
            (6, 28.6426),
            (7, 28.5273),
            (8, 28.6507),
            (9, 28.7499),
            (10, 28.5483),
        ];
        for (id, lat) in stations {
            let got = demand_score(StationId(id), lat).unwrap();
            assert_eq!(got.get(), formula(id, lat), "station {id}");
        }
    }

    #[test]
    fn half_rounds_up() {
        // 31 * 1.5 = 46.5
        assert_eq!(demand_score(StationId(1), 0.05), Some(DemandScore(47)));
    }

    #[test]
    fn is_deterministic() {
        let s = Station::new(17, "x", 28.61, 77.2);
        assert_eq!(score(&s), score(&s.clone()));
    }

    #[test]
    fn non_finite_latitude_is_rejected() {
        let s = Station::new(3, "x", f64::NAN, 77.0);
        assert_eq!(score(&s), Err(StationError::NonFiniteCoordinate { id: StationId(3) }));
        assert_eq!(demand_score(StationId(3), f64::INFINITY), None);
    }

    #[test]
    fn evaluate_skips_invalid_and_keeps_order() {
        let stations = vec![
            Station::new(9, "a", 0.0, 0.0),
            Station::new(2, "b", f64::NAN, 0.0),
            Station::new(4, "c", 0.0, 0.0),
        ];
        let eval = evaluate(&stations);
        let ids: Vec<i64> = eval.scored.iter().map(|s| s.station.id.get()).collect();
        assert_eq!(ids, vec![9, 4]);
        assert_eq!(eval.rejected.len(), 1);
        assert_eq!(eval.scored[0].score, DemandScore(39));
    }
}
