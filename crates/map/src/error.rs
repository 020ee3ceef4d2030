use demand::station::StationError;
use foundation::ids::StationId;
use serde::Serialize;

/// Failure reported by a rendering backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    NotMounted(String),
    UnknownHandle,
    Rejected(String),
}

impl std::fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SurfaceError::NotMounted(surface) => write!(f, "surface {surface:?} is not mounted"),
            SurfaceError::UnknownHandle => write!(f, "unknown or released handle"),
            SurfaceError::Rejected(msg) => write!(f, "backend rejected operation: {msg}"),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// The surface operation that failed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum LayerOp {
    AddBaseLayer,
    AddHeatLayer,
    SetHeatPoints,
    AddMarker,
    UpdateMarker,
    RemoveMarker,
    AddZone,
    RemoveZone,
    RemoveLayer,
    InvalidateSize,
    RemoveMap,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapError {
    /// `init` was given a surface that is not (or no longer) mounted.
    SurfaceNotReady { surface: String, reason: String },
    /// The station was skipped; the rest of the list was processed.
    InvalidStationData(StationError),
    /// A single layer operation failed; the batch continued.
    LayerOperationFailed {
        op: LayerOp,
        station: Option<StationId>,
        source: SurfaceError,
    },
    DisposedInstanceUsed { call: &'static str },
}

impl MapError {
    pub fn kind(&self) -> &'static str {
        match self {
            MapError::SurfaceNotReady { .. } => "surface_not_ready",
            MapError::InvalidStationData(_) => "invalid_station_data",
            MapError::LayerOperationFailed { .. } => "layer_operation_failed",
            MapError::DisposedInstanceUsed { .. } => "disposed_instance_used",
        }
    }

    pub(crate) fn layer(op: LayerOp, station: Option<StationId>, source: SurfaceError) -> Self {
        MapError::LayerOperationFailed {
            op,
            station,
            source,
        }
    }
}

impl std::fmt::Display for MapError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MapError::SurfaceNotReady { surface, reason } => {
                write!(f, "surface {surface:?} not ready: {reason}")
            }
            MapError::InvalidStationData(e) => write!(f, "invalid station data: {e}"),
            MapError::LayerOperationFailed {
                op,
                station: Some(id),
                source,
            } => write!(f, "{op:?} failed for station {id}: {source}"),
            MapError::LayerOperationFailed {
                op,
                station: None,
                source,
            } => write!(f, "{op:?} failed: {source}"),
            MapError::DisposedInstanceUsed { call } => {
                write!(f, "{call} called on a disposed map")
            }
        }
    }
}

impl std::error::Error for MapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MapError::InvalidStationData(e) => Some(e),
            MapError::LayerOperationFailed { source, .. } => Some(source),
            _ => None,
        }
    }
}

impl From<StationError> for MapError {
    fn from(e: StationError) -> Self {
        MapError::InvalidStationData(e)
    }
}

#[cfg(test)]
mod tests {
    use super::{LayerOp, MapError, SurfaceError};
    use demand::station::StationError;
    use foundation::ids::StationId;
    use std::error::Error;

    #[test]
    fn display_names_station_and_op() {
        let e = MapError::layer(
            LayerOp::AddMarker,
            Some(StationId(4)),
            SurfaceError::Rejected("boom".into()),
        );
        assert_eq!(
            e.to_string(),
            "AddMarker failed for station 4: backend rejected operation: boom"
        );
        assert!(e.source().is_some());
        assert_eq!(e.kind(), "layer_operation_failed");
    }

    #[test]
    fn station_errors_convert() {
        let e: MapError = StationError::DuplicateId { id: StationId(2) }.into();
        assert_eq!(e.kind(), "invalid_station_data");
        assert_eq!(e.to_string(), "invalid station data: station id 2 appears more than once");
    }
}
