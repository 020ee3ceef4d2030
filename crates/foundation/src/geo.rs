use serde::{Deserialize, Serialize};

/// Geographic position in decimal degrees.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(&self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }

    /// `"lat, lng"` with four decimals.
    pub fn display_4dp(&self) -> String {
        format!("{:.4}, {:.4}", self.lat, self.lng)
    }
}
