use foundation::color::Rgb;
use serde::{Deserialize, Serialize};

/// Stroke and fill for highlighted demand zones.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ZoneStyle {
    pub stroke: Rgb,
    pub stroke_width_px: f32,
    pub fill_opacity: f32,
    /// Fill with the zone's band color instead of `stroke`.
    pub fill_by_band: bool,
}

impl ZoneStyle {
    pub const fn new(stroke: Rgb, stroke_width_px: f32, fill_opacity: f32) -> Self {
        Self {
            stroke,
            stroke_width_px,
            fill_opacity,
            fill_by_band: true,
        }
    }
}

impl Default for ZoneStyle {
    fn default() -> Self {
        Self::new(Rgb(0xff, 0x00, 0x00), 2.0, 0.15)
    }
}

/// Marker appearance. Passed explicitly to each map instead of patching a
/// shared default icon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IconTheme {
    pub class_name: String,
    pub size_px: u32,
    pub selected_size_px: u32,
    pub border_px: u32,
    pub border: Rgb,
    pub selected_border: Rgb,
    pub font_px: u32,
    pub selected_font_px: u32,
    pub selected_glyph: String,
}

impl Default for IconTheme {
    fn default() -> Self {
        Self {
            class_name: "custom-marker".to_string(),
            size_px: 24,
            selected_size_px: 32,
            border_px: 3,
            border: Rgb::WHITE,
            selected_border: Rgb(0x3f, 0x51, 0xb5),
            font_px: 12,
            selected_font_px: 14,
            selected_glyph: "★".to_string(),
        }
    }
}
