use std::collections::BTreeSet;

use serde::Serialize;

use crate::score::{DemandScore, ScoredStation, evaluate};
use crate::severity::SeverityBand;
use crate::station::Station;

/// Number of high-demand zones highlighted on the map.
pub const ZONE_COUNT: usize = 3;

/// Radius of the highlighted circle around a zone center, in meters.
pub const ZONE_RADIUS_M: f64 = 1_500.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Zone {
    pub center: Station,
    pub radius_m: f64,
    /// 1-based; rank 1 has the highest score.
    pub rank: u8,
    pub score: DemandScore,
    pub band: SeverityBand,
}

/// Ranks `scored` by descending score, ties by ascending station id, and
/// keeps the first [`ZONE_COUNT`] distinct stations.
pub fn rank_zones(scored: &[ScoredStation]) -> Vec<Zone> {
    let mut order: Vec<&ScoredStation> = scored.iter().collect();
    order.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| a.station.id.cmp(&b.station.id))
    });

    let mut seen = BTreeSet::new();
    order
        .into_iter()
        .filter(|s| seen.insert(s.station.id))
        .take(ZONE_COUNT)
        .enumerate()
        .map(|(i, s)| Zone {
            center: s.station.clone(),
            radius_m: ZONE_RADIUS_M,
            rank: (i + 1) as u8,
            score: s.score,
            band: s.band,
        })
        .collect()
}

/// Scores `stations` and returns the top zones. Invalid or repeated
/// stations are ignored.
pub fn select_zones(stations: &[Station]) -> Vec<Zone> {
    rank_zones(&evaluate(stations).scored)
}
