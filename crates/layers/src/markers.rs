use demand::score::{DemandScore, ScoredStation};
use demand::severity::SeverityBand;
use foundation::color::Rgb;
use foundation::geo::LatLng;
use foundation::ids::StationId;
use serde::Serialize;

use crate::symbology::IconTheme;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarkerIcon {
    pub class_name: String,
    pub size_px: u32,
    /// Offset of the geographic point from the icon's top-left corner.
    pub anchor_px: [u32; 2],
    pub fill: Rgb,
    pub border: Rgb,
    pub border_px: u32,
    pub font_px: u32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Popup {
    pub title: String,
    pub rows: Vec<(String, String)>,
}

/// Everything the backend needs to draw one station marker.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerDescriptor {
    pub station_id: StationId,
    pub position: LatLng,
    pub score: DemandScore,
    pub band: SeverityBand,
    pub selected: bool,
    pub icon: MarkerIcon,
    pub popup: Popup,
    pub popup_open: bool,
}

/// Builds marker descriptors from scored stations.
#[derive(Debug, Clone, Default)]
pub struct MarkerFactory {
    theme: IconTheme,
}

impl MarkerFactory {
    pub fn new(theme: IconTheme) -> Self {
        Self { theme }
    }

    pub fn build(&self, scored: &ScoredStation, selected: bool) -> MarkerDescriptor {
        let theme = &self.theme;
        let station = &scored.station;
        let size_px = if selected {
            theme.selected_size_px
        } else {
            theme.size_px
        };

        let icon = MarkerIcon {
            class_name: theme.class_name.clone(),
            size_px,
            anchor_px: [size_px / 2, size_px / 2],
            fill: scored.band.color(),
            border: if selected {
                theme.selected_border
            } else {
                theme.border
            },
            border_px: theme.border_px,
            font_px: if selected {
                theme.selected_font_px
            } else {
                theme.font_px
            },
            label: if selected {
                theme.selected_glyph.clone()
            } else {
                scored.score.to_string()
            },
        };

        let popup = Popup {
            title: station.name.clone(),
            rows: vec![
                ("Demand".to_string(), scored.score.to_string()),
                ("Location".to_string(), station.position().display_4dp()),
                (
                    "Status".to_string(),
                    if selected { "Selected" } else { "Active" }.to_string(),
                ),
            ],
        };

        MarkerDescriptor {
            station_id: station.id,
            position: station.position(),
            score: scored.score,
            band: scored.band,
            selected,
            icon,
            popup,
            popup_open: selected,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::MarkerFactory;
    use crate::symbology::IconTheme;
    use demand::score::{DemandScore, ScoredStation};
    use demand::severity::SeverityBand;
    use demand::station::Station;
    use foundation::color::Rgb;
    use pretty_assertions::assert_eq;

    fn scored(score: i64) -> ScoredStation {
        ScoredStation::new(Station::new(4, "Karol Bagh", 28.6512, 77.1906), DemandScore(score))
    }

    #[test]
    fn unselected_marker_shows_score() {
        let m = MarkerFactory::default().build(&scored(51), false);
        assert_eq!(m.band, SeverityBand::High);
        assert_eq!(m.icon.size_px, 24);
        assert_eq!(m.icon.anchor_px, [12, 12]);
        assert_eq!(m.icon.fill.hex(), "#ff8800");
        assert_eq!(m.icon.border, Rgb::WHITE);
        assert_eq!(m.icon.label, "51");
        assert!(!m.popup_open);
    }

    #[test]
    fn selected_marker_is_larger_and_starred() {
        let m = MarkerFactory::default().build(&scored(35), true);
        assert_eq!(m.icon.size_px, 32);
        assert_eq!(m.icon.anchor_px, [16, 16]);
        assert_eq!(m.icon.font_px, 14);
        assert_eq!(m.icon.border.hex(), "#3f51b5");
        assert_eq!(m.icon.label, "★");
        assert!(m.popup_open);
    }

    #[test]
    fn popup_lists_demand_location_status() {
        let m = MarkerFactory::default().build(&scored(61), true);
        assert_eq!(m.popup.title, "Karol Bagh");
        assert_eq!(
            m.popup.rows,
            vec![
                ("Demand".to_string(), "61".to_string()),
                ("Location".to_string(), "28.6512, 77.1906".to_string()),
                ("Status".to_string(), "Selected".to_string()),
            ]
        );
    }

    #[test]
    fn theme_is_per_factory() {
        let theme = IconTheme {
            size_px: 20,
            selected_glyph: "*".to_string(),
            ..IconTheme::default()
        };
        let custom = MarkerFactory::new(theme).build(&scored(40), true);
        let stock = MarkerFactory::default().build(&scored(40), true);
        assert_eq!(custom.icon.label, "*");
        assert_eq!(stock.icon.label, "★");

        let small = MarkerFactory::new(IconTheme {
            size_px: 20,
            ..IconTheme::default()
        });
        assert_eq!(small.build(&scored(40), false).icon.size_px, 20);
    }
}
