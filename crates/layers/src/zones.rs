use demand::zones::Zone;
use foundation::color::Rgb;
use foundation::geo::LatLng;
use foundation::ids::StationId;
use serde::Serialize;

use crate::symbology::ZoneStyle;

/// Circle drawn around a ranked high-demand station.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ZoneOverlay {
    pub station_id: StationId,
    pub center: LatLng,
    pub radius_m: f64,
    pub rank: u8,
    pub stroke: Rgb,
    pub stroke_width_px: f32,
    pub fill: Rgb,
    pub fill_opacity: f32,
    pub label: String,
}

impl ZoneOverlay {
    pub fn from_zone(zone: &Zone, style: &ZoneStyle) -> Self {
        Self {
            station_id: zone.center.id,
            center: zone.center.position(),
            radius_m: zone.radius_m,
            rank: zone.rank,
            stroke: style.stroke,
            stroke_width_px: style.stroke_width_px,
            fill: if style.fill_by_band {
                zone.band.color()
            } else {
                style.stroke
            },
            fill_opacity: style.fill_opacity,
            label: format!("#{} {}", zone.rank, zone.center.name),
        }
    }
}
