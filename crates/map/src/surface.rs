use foundation::geo::LatLng;
use foundation::handles::Handle;
use layers::heat::{HeatLayer, HeatPoint};
use layers::markers::MarkerDescriptor;
use layers::raster::TileLayer;
use layers::zones::ZoneOverlay;
use serde::{Deserialize, Serialize};

use crate::error::SurfaceError;

/// Names the host element a map is mounted into.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SurfaceHandle(pub String);

impl SurfaceHandle {
    pub fn new(name: impl Into<String>) -> Self {
        SurfaceHandle(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
}

impl Default for MapView {
    /// Delhi NCR.
    fn default() -> Self {
        Self {
            center: LatLng::new(28.6139, 77.2090),
            zoom: 10,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MapHandle(pub Handle);

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerHandle(pub Handle);

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerHandle(pub Handle);

#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OverlayHandle(pub Handle);

/// Rendering backend a map is drawn on.
///
/// Every call is a single, atomic graphical operation: on `Err` the backend
/// state is as it was before the call.
pub trait MapSurface {
    fn is_mounted(&self, surface: &SurfaceHandle) -> bool;

    fn create_map(&mut self, surface: &SurfaceHandle, view: MapView)
    -> Result<MapHandle, SurfaceError>;

    /// Removes the map and everything still attached to it.
    fn remove_map(&mut self, map: MapHandle) -> Result<(), SurfaceError>;

    fn invalidate_size(&mut self, map: MapHandle) -> Result<(), SurfaceError>;

    fn add_tile_layer(
        &mut self,
        map: MapHandle,
        layer: &TileLayer,
    ) -> Result<LayerHandle, SurfaceError>;

    fn add_heat_layer(
        &mut self,
        map: MapHandle,
        layer: &HeatLayer,
    ) -> Result<LayerHandle, SurfaceError>;

    /// Replaces the heat layer's data set in place.
    fn set_heat_points(
        &mut self,
        layer: LayerHandle,
        points: &[HeatPoint],
    ) -> Result<(), SurfaceError>;

    fn remove_layer(&mut self, layer: LayerHandle) -> Result<(), SurfaceError>;

    fn add_marker(
        &mut self,
        map: MapHandle,
        marker: &MarkerDescriptor,
    ) -> Result<MarkerHandle, SurfaceError>;

    /// Restyles an existing marker in place.
    fn update_marker(
        &mut self,
        marker: MarkerHandle,
        descriptor: &MarkerDescriptor,
    ) -> Result<(), SurfaceError>;

    fn remove_marker(&mut self, marker: MarkerHandle) -> Result<(), SurfaceError>;

    fn add_zone(
        &mut self,
        map: MapHandle,
        zone: &ZoneOverlay,
    ) -> Result<OverlayHandle, SurfaceError>;

    fn remove_zone(&mut self, zone: OverlayHandle) -> Result<(), SurfaceError>;
}
