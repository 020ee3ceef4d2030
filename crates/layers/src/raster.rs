use serde::{Deserialize, Serialize};

/// Remote raster tile source. Tiles are fetched by the rendering backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileProvider {
    /// `{s}`, `{z}`, `{x}` and `{y}` are expanded by the backend.
    pub url_template: String,
    pub attribution: String,
    pub max_zoom: u8,
}

impl TileProvider {
    pub fn openstreetmap() -> Self {
        Self {
            url_template: "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png".to_string(),
            attribution: "© OpenStreetMap contributors".to_string(),
            max_zoom: 18,
        }
    }
}

impl Default for TileProvider {
    fn default() -> Self {
        Self::openstreetmap()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileLayer {
    pub provider: TileProvider,
}

impl TileLayer {
    pub fn new(provider: TileProvider) -> Self {
        Self { provider }
    }
}

#[cfg(test)]
mod tests {
    use super::TileProvider;

    #[test]
    fn partial_config_falls_back_to_osm() {
        let p: TileProvider = serde_json::from_str(r#"{"max_zoom": 12}"#).unwrap();
        assert_eq!(p.max_zoom, 12);
        assert_eq!(p.url_template, TileProvider::openstreetmap().url_template);
    }
}
