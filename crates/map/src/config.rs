use std::path::Path;

use layers::heat::HeatOptions;
use layers::raster::TileProvider;
use layers::symbology::{IconTheme, ZoneStyle};
use serde::{Deserialize, Serialize};

use crate::surface::MapView;

/// Delays of the deferred lifecycle steps, in milliseconds.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Timing {
    /// Wait between `init` and attaching the map to the surface.
    pub mount_delay_ms: u64,
    /// Wait between an applied update and the resize/invalidate step.
    pub invalidate_delay_ms: u64,
}

impl Default for Timing {
    fn default() -> Self {
        Self {
            mount_delay_ms: 100,
            invalidate_delay_ms: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub view: MapView,
    pub tiles: TileProvider,
    pub heat: HeatOptions,
    pub icons: IconTheme,
    pub zones: ZoneStyle,
    pub timing: Timing,
}

#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "read map config: {e}"),
            ConfigError::Parse(e) => write!(f, "parse map config: {e}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(e) => Some(e),
            ConfigError::Parse(e) => Some(e),
        }
    }
}

impl MapConfig {
    /// Parses a JSON document; missing fields keep their defaults.
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Parse)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        Self::from_json_str(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, MapConfig};
    use std::io::Write;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(MapConfig::from_json_str("{}").unwrap(), MapConfig::default());
    }

    #[test]
    fn defaults_match_dashboard() {
        let c = MapConfig::default();
        assert_eq!(c.view.zoom, 10);
        assert_eq!(c.view.center.lat, 28.6139);
        assert_eq!(c.tiles.max_zoom, 18);
        assert_eq!(c.heat.radius_px, 25);
        assert_eq!(c.timing.mount_delay_ms, 100);
        assert_eq!(c.timing.invalidate_delay_ms, 50);
    }

    #[test]
    fn partial_override() {
        let c = MapConfig::from_json_str(
            r##"{"timing": {"mount_delay_ms": 0}, "icons": {"selected_border": "#000000"}}"##,
        )
        .unwrap();
        assert_eq!(c.timing.mount_delay_ms, 0);
        assert_eq!(c.timing.invalidate_delay_ms, 50);
        assert_eq!(c.icons.selected_border.hex(), "#000000");
        assert_eq!(c.icons.size_px, 24);
    }

    #[test]
    fn reads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"view": {{"center": {{"lat": 19.07, "lng": 72.87}}, "zoom": 11}}}}"#)
            .unwrap();
        let c = MapConfig::from_path(file.path()).unwrap();
        assert_eq!(c.view.zoom, 11);
    }

    #[test]
    fn reports_bad_json_and_missing_file() {
        assert!(matches!(
            MapConfig::from_json_str("{"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            MapConfig::from_path("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
