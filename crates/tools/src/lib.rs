//! Offline driver for the station map: runs the full init/update cycle on
//! a recording surface and reports what would be drawn.

use std::cell::RefCell;
use std::fs;
use std::path::Path;
use std::rc::Rc;

use demand::station::Station;
use demand::zones::{Zone, select_zones};
use foundation::ids::StationId;
use foundation::time::Time;
use layers::heat::HeatPoint;
use layers::markers::MarkerDescriptor;
use layers::zones::ZoneOverlay;
use map::recording::RecordingSurface;
use map::{MapConfig, MapEvent, MapLifecycleManager, MapSnapshot, SurfaceHandle};
use serde::Serialize;

const SURFACE_NAME: &str = "station-map";

pub fn load_stations(path: &Path) -> Result<Vec<Station>, String> {
    let text = fs::read_to_string(path).map_err(|e| format!("read {path:?}: {e}"))?;
    parse_stations(&text).map_err(|e| format!("{path:?}: {e}"))
}

pub fn parse_stations(json: &str) -> Result<Vec<Station>, String> {
    serde_json::from_str(json).map_err(|e| format!("parse stations: {e}"))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderReport {
    pub snapshot: MapSnapshot,
    pub markers: Vec<MarkerDescriptor>,
    pub zones: Vec<ZoneOverlay>,
    pub heat_points: Vec<HeatPoint>,
    pub errors: Vec<String>,
}

/// Attaches a map, applies one update, lets the deferred steps settle and
/// returns what ended up on the surface.
pub fn render(
    stations: &[Station],
    selected: Option<StationId>,
    config: MapConfig,
) -> Result<RenderReport, String> {
    let timing = config.timing;
    let mut manager =
        MapLifecycleManager::new(RecordingSurface::with_mounted(SURFACE_NAME), config);

    let errors = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&errors);
    manager.on_event(move |event| {
        if let MapEvent::Error(err) = &event.payload {
            sink.borrow_mut().push(err.to_string());
        }
    });

    manager
        .init(SurfaceHandle::new(SURFACE_NAME))
        .map_err(|e| e.to_string())?;
    manager
        .update(stations, selected)
        .map_err(|e| e.to_string())?;

    let attached_at = Time::ZERO.after(timing.mount_delay_ms);
    manager.poll(attached_at);
    manager.poll(attached_at.after(timing.invalidate_delay_ms));

    let mut markers: Vec<MarkerDescriptor> =
        manager.surface().markers().into_iter().cloned().collect();
    markers.sort_by_key(|m| m.station_id);
    let mut zones: Vec<ZoneOverlay> = manager.surface().zones().into_iter().cloned().collect();
    zones.sort_by_key(|z| z.rank);
    let heat_points = manager
        .surface()
        .heat_points()
        .map(<[HeatPoint]>::to_vec)
        .unwrap_or_default();
    let snapshot = manager.snapshot();

    manager.dispose();
    let errors = errors.borrow().clone();
    Ok(RenderReport {
        snapshot,
        markers,
        zones,
        heat_points,
        errors,
    })
}

pub fn ranked_zones(stations: &[Station]) -> Vec<Zone> {
    select_zones(stations)
}

#[cfg(test)]
mod tests {
    use super::{load_stations, parse_stations, ranked_zones, render};
    use foundation::ids::StationId;
    use map::{MapConfig, Phase};
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const DELHI: &str = r#"[
        {"station_id": 1, "station_name": "Connaught Place", "latitude": 28.6315, "longitude": 77.2167},
        {"station_id": 2, "station_name": "Saket", "latitude": 28.5222, "longitude": 77.2076},
        {"station_id": 3, "station_name": "Dwarka", "latitude": 28.5921, "longitude": 77.0460},
        {"station_id": 4, "station_name": "Karol Bagh", "latitude": 28.6512, "longitude": 77.1906},
        {"station_id": 5, "station_name": "Lajpat Nagar", "latitude": 28.5672, "longitude": 77.2436}
    ]"#;

    #[test]
    fn renders_markers_zones_and_heat() {
        let stations = parse_stations(DELHI).unwrap();
        let report = render(&stations, Some(StationId(2)), MapConfig::default()).unwrap();

        assert_eq!(report.snapshot.phase, Phase::Ready);
        assert_eq!(report.markers.len(), 5);
        assert_eq!(report.heat_points.len(), 5);
        assert!(report.errors.is_empty());

        // Scores: 41, 39, 63, 51, 59.
        let ranked: Vec<(u8, i64)> = report
            .zones
            .iter()
            .map(|z| (z.rank, z.station_id.get()))
            .collect();
        assert_eq!(ranked, vec![(1, 3), (2, 5), (3, 4)]);

        let selected: Vec<i64> = report
            .markers
            .iter()
            .filter(|m| m.selected)
            .map(|m| m.station_id.get())
            .collect();
        assert_eq!(selected, vec![2]);
    }

    #[test]
    fn invalid_rows_show_up_as_errors() {
        let mut stations = parse_stations(DELHI).unwrap();
        stations.push(stations[0].clone());
        let report = render(&stations, None, MapConfig::default()).unwrap();
        assert_eq!(report.markers.len(), 5);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn zones_command_matches_render() {
        let stations = parse_stations(DELHI).unwrap();
        let ids: Vec<i64> = ranked_zones(&stations)
            .iter()
            .map(|z| z.center.id.get())
            .collect();
        assert_eq!(ids, vec![3, 5, 4]);
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(DELHI.as_bytes()).unwrap();
        assert_eq!(load_stations(file.path()).unwrap().len(), 5);
        assert!(parse_stations("{}").is_err());
    }
}
