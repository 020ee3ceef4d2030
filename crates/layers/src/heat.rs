use demand::score::ScoredStation;
use foundation::color::Rgb;
use foundation::geo::LatLng;
use serde::{Deserialize, Serialize};

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Normalized intensity in `0.0..=1.0`.
    pub at: f32,
    pub color: Rgb,
}

impl GradientStop {
    pub const fn new(at: f32, color: Rgb) -> Self {
        Self { at, color }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatOptions {
    pub radius_px: u32,
    pub blur_px: u32,
    /// Zoom level at which points reach full intensity.
    pub max_zoom: u8,
    pub gradient: Vec<GradientStop>,
}

impl Default for HeatOptions {
    fn default() -> Self {
        Self {
            radius_px: 25,
            blur_px: 15,
            max_zoom: 10,
            gradient: vec![
                GradientStop::new(0.2, Rgb(0x44, 0x44, 0xff)),
                GradientStop::new(0.4, Rgb(0x44, 0xaa, 0x44)),
                GradientStop::new(0.6, Rgb(0xff, 0x88, 0x00)),
                GradientStop::new(0.8, Rgb(0xff, 0x44, 0x44)),
                GradientStop::new(1.0, Rgb(0xff, 0x00, 0x00)),
            ],
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize)]
pub struct HeatPoint {
    pub position: LatLng,
    pub intensity: f64,
}

/// One heat point per scored station, weighted by its score.
pub fn heat_points(scored: &[ScoredStation]) -> Vec<HeatPoint> {
    scored
        .iter()
        .map(|s| HeatPoint {
            position: s.station.position(),
            intensity: s.score.get() as f64,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatLayer {
    pub options: HeatOptions,
    pub points: Vec<HeatPoint>,
}

impl HeatLayer {
    pub fn new(options: HeatOptions, points: Vec<HeatPoint>) -> Self {
        Self { options, points }
    }
}
