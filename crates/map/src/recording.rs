//! In-memory [`MapSurface`] that records every operation.
//!
//! Used by the CLI to produce map snapshots without a browser, and by tests
//! to count graphical objects and inject per-operation failures.

use std::collections::{BTreeMap, BTreeSet};

use foundation::handles::{Handle, HandleAllocator};
use foundation::ids::StationId;
use layers::heat::{HeatLayer, HeatPoint};
use layers::markers::MarkerDescriptor;
use layers::raster::{TileLayer, TileProvider};
use layers::zones::ZoneOverlay;
use serde::Serialize;

use crate::error::SurfaceError;
use crate::surface::{
    LayerHandle, MapHandle, MapSurface, MapView, MarkerHandle, OverlayHandle, SurfaceHandle,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum SurfaceOp {
    CreateMap,
    RemoveMap,
    InvalidateSize,
    AddTileLayer,
    AddHeatLayer,
    SetHeatPoints,
    RemoveLayer,
    AddMarker,
    UpdateMarker,
    RemoveMarker,
    AddZone,
    RemoveZone,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceObject {
    Map { surface: SurfaceHandle, view: MapView },
    Tiles(TileProvider),
    Heat(Vec<HeatPoint>),
    Marker(MarkerDescriptor),
    Zone(ZoneOverlay),
}

#[derive(Debug, Clone)]
struct Record {
    /// Owning map; `None` for maps themselves.
    map: Option<Handle>,
    object: SurfaceObject,
}

#[derive(Debug, Clone)]
struct Fault {
    op: SurfaceOp,
    station: Option<StationId>,
    remaining: usize,
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    mounted: BTreeSet<SurfaceHandle>,
    handles: HandleAllocator,
    objects: BTreeMap<Handle, Record>,
    log: Vec<SurfaceOp>,
    faults: Vec<Fault>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface with `name` already mounted.
    pub fn with_mounted(name: &str) -> Self {
        let mut s = Self::new();
        s.mount(SurfaceHandle::new(name));
        s
    }

    pub fn mount(&mut self, surface: SurfaceHandle) {
        self.mounted.insert(surface);
    }

    pub fn unmount(&mut self, surface: &SurfaceHandle) {
        self.mounted.remove(surface);
    }

    /// Makes the next `times` calls of `op` fail.
    pub fn fail(&mut self, op: SurfaceOp, times: usize) {
        self.faults.push(Fault {
            op,
            station: None,
            remaining: times,
        });
    }

    /// Makes the next `times` calls of `op` concerning `station` fail.
    pub fn fail_for_station(&mut self, op: SurfaceOp, station: StationId, times: usize) {
        self.faults.push(Fault {
            op,
            station: Some(station),
            remaining: times,
        });
    }

    pub fn count(&self, op: SurfaceOp) -> usize {
        self.log.iter().filter(|o| **o == op).count()
    }

    pub fn live_objects(&self) -> usize {
        self.objects.len()
    }

    pub fn map_count(&self) -> usize {
        self.count_objects(|o| matches!(o, SurfaceObject::Map { .. }))
    }

    pub fn tile_layer_count(&self) -> usize {
        self.count_objects(|o| matches!(o, SurfaceObject::Tiles(_)))
    }

    pub fn heat_layer_count(&self) -> usize {
        self.count_objects(|o| matches!(o, SurfaceObject::Heat(_)))
    }

    pub fn markers(&self) -> Vec<&MarkerDescriptor> {
        self.objects
            .values()
            .filter_map(|r| match &r.object {
                SurfaceObject::Marker(d) => Some(d),
                _ => None,
            })
            .collect()
    }

    pub fn zones(&self) -> Vec<&ZoneOverlay> {
        self.objects
            .values()
            .filter_map(|r| match &r.object {
                SurfaceObject::Zone(z) => Some(z),
                _ => None,
            })
            .collect()
    }

    /// Data set of the first live heat layer.
    pub fn heat_points(&self) -> Option<&[HeatPoint]> {
        self.objects.values().find_map(|r| match &r.object {
            SurfaceObject::Heat(points) => Some(points.as_slice()),
            _ => None,
        })
    }

    fn count_objects(&self, pred: impl Fn(&SurfaceObject) -> bool) -> usize {
        self.objects.values().filter(|r| pred(&r.object)).count()
    }

    fn check_fault(
        &mut self,
        op: SurfaceOp,
        station: Option<StationId>,
    ) -> Result<(), SurfaceError> {
        let hit = self.faults.iter_mut().find(|f| {
            f.op == op && f.remaining > 0 && (f.station.is_none() || f.station == station)
        });
        if let Some(fault) = hit {
            fault.remaining -= 1;
            return Err(SurfaceError::Rejected(format!("injected {op:?} failure")));
        }
        Ok(())
    }

    fn require_map(&self, map: MapHandle) -> Result<(), SurfaceError> {
        match self.objects.get(&map.0) {
            Some(Record {
                object: SurfaceObject::Map { .. },
                ..
            }) => Ok(()),
            _ => Err(SurfaceError::UnknownHandle),
        }
    }

    fn station_of(&self, handle: Handle) -> Option<StationId> {
        match self.objects.get(&handle).map(|r| &r.object) {
            Some(SurfaceObject::Marker(d)) => Some(d.station_id),
            Some(SurfaceObject::Zone(z)) => Some(z.station_id),
            _ => None,
        }
    }

    fn insert(&mut self, map: Option<MapHandle>, object: SurfaceObject) -> Handle {
        let handle = self.handles.alloc();
        self.objects.insert(
            handle,
            Record {
                map: map.map(|m| m.0),
                object,
            },
        );
        handle
    }

    fn remove(&mut self, handle: Handle) -> Result<Record, SurfaceError> {
        let record = self
            .objects
            .remove(&handle)
            .ok_or(SurfaceError::UnknownHandle)?;
        self.handles.release(handle);
        Ok(record)
    }

    fn remove_child(
        &mut self,
        handle: Handle,
        op: SurfaceOp,
        is_kind: impl Fn(&SurfaceObject) -> bool,
    ) -> Result<(), SurfaceError> {
        match self.objects.get(&handle) {
            Some(r) if r.map.is_some() && is_kind(&r.object) => {}
            _ => return Err(SurfaceError::UnknownHandle),
        }
        let station = self.station_of(handle);
        self.check_fault(op, station)?;
        self.remove(handle)?;
        self.log.push(op);
        Ok(())
    }
}

impl MapSurface for RecordingSurface {
    fn is_mounted(&self, surface: &SurfaceHandle) -> bool {
        self.mounted.contains(surface)
    }

    fn create_map(
        &mut self,
        surface: &SurfaceHandle,
        view: MapView,
    ) -> Result<MapHandle, SurfaceError> {
        if !self.is_mounted(surface) {
            return Err(SurfaceError::NotMounted(surface.0.clone()));
        }
        self.check_fault(SurfaceOp::CreateMap, None)?;
        let handle = self.insert(
            None,
            SurfaceObject::Map {
                surface: surface.clone(),
                view,
            },
        );
        self.log.push(SurfaceOp::CreateMap);
        Ok(MapHandle(handle))
    }

    fn remove_map(&mut self, map: MapHandle) -> Result<(), SurfaceError> {
        self.require_map(map)?;
        self.check_fault(SurfaceOp::RemoveMap, None)?;
        let children: Vec<Handle> = self
            .objects
            .iter()
            .filter(|(_, r)| r.map == Some(map.0))
            .map(|(h, _)| *h)
            .collect();
        for child in children {
            self.remove(child)?;
        }
        self.remove(map.0)?;
        self.log.push(SurfaceOp::RemoveMap);
        Ok(())
    }

    fn invalidate_size(&mut self, map: MapHandle) -> Result<(), SurfaceError> {
        self.require_map(map)?;
        self.check_fault(SurfaceOp::InvalidateSize, None)?;
        self.log.push(SurfaceOp::InvalidateSize);
        Ok(())
    }

    fn add_tile_layer(
        &mut self,
        map: MapHandle,
        layer: &TileLayer,
    ) -> Result<LayerHandle, SurfaceError> {
        self.require_map(map)?;
        self.check_fault(SurfaceOp::AddTileLayer, None)?;
        let handle = self.insert(Some(map), SurfaceObject::Tiles(layer.provider.clone()));
        self.log.push(SurfaceOp::AddTileLayer);
        Ok(LayerHandle(handle))
    }

    fn add_heat_layer(
        &mut self,
        map: MapHandle,
        layer: &HeatLayer,
    ) -> Result<LayerHandle, SurfaceError> {
        self.require_map(map)?;
        self.check_fault(SurfaceOp::AddHeatLayer, None)?;
        let handle = self.insert(Some(map), SurfaceObject::Heat(layer.points.clone()));
        self.log.push(SurfaceOp::AddHeatLayer);
        Ok(LayerHandle(handle))
    }

    fn set_heat_points(
        &mut self,
        layer: LayerHandle,
        points: &[HeatPoint],
    ) -> Result<(), SurfaceError> {
        if !matches!(
            self.objects.get(&layer.0).map(|r| &r.object),
            Some(SurfaceObject::Heat(_))
        ) {
            return Err(SurfaceError::UnknownHandle);
        }
        self.check_fault(SurfaceOp::SetHeatPoints, None)?;
        if let Some(Record {
            object: SurfaceObject::Heat(data),
            ..
        }) = self.objects.get_mut(&layer.0)
        {
            *data = points.to_vec();
        }
        self.log.push(SurfaceOp::SetHeatPoints);
        Ok(())
    }

    fn remove_layer(&mut self, layer: LayerHandle) -> Result<(), SurfaceError> {
        self.remove_child(layer.0, SurfaceOp::RemoveLayer, |o| {
            matches!(o, SurfaceObject::Tiles(_) | SurfaceObject::Heat(_))
        })
    }

    fn add_marker(
        &mut self,
        map: MapHandle,
        marker: &MarkerDescriptor,
    ) -> Result<MarkerHandle, SurfaceError> {
        self.require_map(map)?;
        self.check_fault(SurfaceOp::AddMarker, Some(marker.station_id))?;
        let handle = self.insert(Some(map), SurfaceObject::Marker(marker.clone()));
        self.log.push(SurfaceOp::AddMarker);
        Ok(MarkerHandle(handle))
    }

    fn update_marker(
        &mut self,
        marker: MarkerHandle,
        descriptor: &MarkerDescriptor,
    ) -> Result<(), SurfaceError> {
        if !matches!(
            self.objects.get(&marker.0).map(|r| &r.object),
            Some(SurfaceObject::Marker(_))
        ) {
            return Err(SurfaceError::UnknownHandle);
        }
        self.check_fault(SurfaceOp::UpdateMarker, Some(descriptor.station_id))?;
        if let Some(record) = self.objects.get_mut(&marker.0) {
            record.object = SurfaceObject::Marker(descriptor.clone());
        }
        self.log.push(SurfaceOp::UpdateMarker);
        Ok(())
    }

    fn remove_marker(&mut self, marker: MarkerHandle) -> Result<(), SurfaceError> {
        self.remove_child(marker.0, SurfaceOp::RemoveMarker, |o| {
            matches!(o, SurfaceObject::Marker(_))
        })
    }

    fn add_zone(
        &mut self,
        map: MapHandle,
        zone: &ZoneOverlay,
    ) -> Result<OverlayHandle, SurfaceError> {
        self.require_map(map)?;
        self.check_fault(SurfaceOp::AddZone, Some(zone.station_id))?;
        let handle = self.insert(Some(map), SurfaceObject::Zone(zone.clone()));
        self.log.push(SurfaceOp::AddZone);
        Ok(OverlayHandle(handle))
    }

    fn remove_zone(&mut self, zone: OverlayHandle) -> Result<(), SurfaceError> {
        self.remove_child(zone.0, SurfaceOp::RemoveZone, |o| {
            matches!(o, SurfaceObject::Zone(_))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{RecordingSurface, SurfaceOp};
    use crate::error::SurfaceError;
    use crate::surface::{MapSurface, MapView, SurfaceHandle};
    use demand::score::evaluate;
    use demand::station::Station;
    use foundation::ids::StationId;
    use layers::markers::MarkerFactory;
    use layers::raster::{TileLayer, TileProvider};

    fn marker(id: i64) -> layers::markers::MarkerDescriptor {
        let eval = evaluate(&[Station::new(id, "s", 0.0, 0.0)]);
        MarkerFactory::default().build(&eval.scored[0], false)
    }

    #[test]
    fn create_map_requires_mounted_surface() {
        let mut s = RecordingSurface::new();
        let root = SurfaceHandle::new("root");
        assert_eq!(
            s.create_map(&root, MapView::default()),
            Err(SurfaceError::NotMounted("root".into()))
        );
        s.mount(root.clone());
        assert!(s.create_map(&root, MapView::default()).is_ok());
        assert_eq!(s.map_count(), 1);
    }

    #[test]
    fn remove_map_takes_children_with_it() {
        let mut s = RecordingSurface::with_mounted("root");
        let map = s
            .create_map(&SurfaceHandle::new("root"), MapView::default())
            .unwrap();
        s.add_tile_layer(map, &TileLayer::new(TileProvider::default()))
            .unwrap();
        s.add_marker(map, &marker(1)).unwrap();
        assert_eq!(s.live_objects(), 3);

        s.remove_map(map).unwrap();
        assert_eq!(s.live_objects(), 0);
        assert_eq!(s.remove_map(map), Err(SurfaceError::UnknownHandle));
    }

    #[test]
    fn stale_marker_handle_is_rejected() {
        let mut s = RecordingSurface::with_mounted("root");
        let map = s
            .create_map(&SurfaceHandle::new("root"), MapView::default())
            .unwrap();
        let h = s.add_marker(map, &marker(1)).unwrap();
        s.remove_marker(h).unwrap();
        assert_eq!(s.remove_marker(h), Err(SurfaceError::UnknownHandle));
        assert_eq!(s.count(SurfaceOp::RemoveMarker), 1);
    }

    #[test]
    fn injected_faults_are_scoped_and_counted() {
        let mut s = RecordingSurface::with_mounted("root");
        let map = s
            .create_map(&SurfaceHandle::new("root"), MapView::default())
            .unwrap();
        s.fail_for_station(SurfaceOp::AddMarker, StationId(2), 1);

        assert!(s.add_marker(map, &marker(1)).is_ok());
        assert!(s.add_marker(map, &marker(2)).is_err());
        assert!(s.add_marker(map, &marker(2)).is_ok());
        assert_eq!(s.markers().len(), 2);
        assert_eq!(s.count(SurfaceOp::AddMarker), 2);
    }
}
