use std::collections::BTreeMap;

use demand::score::evaluate;
use demand::station::Station;
use demand::zones::{Zone, rank_zones};
use foundation::ids::StationId;
use foundation::time::Time;
use layers::heat::{HeatLayer, HeatPoint, heat_points};
use layers::markers::{MarkerDescriptor, MarkerFactory};
use layers::raster::TileLayer;
use layers::zones::ZoneOverlay;
use runtime::event_bus::{Event, EventBus};
use runtime::scheduler::{Scheduler, TaskId};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::MapConfig;
use crate::error::{LayerOp, MapError};
use crate::registry::Registry;
use crate::surface::{
    LayerHandle, MapHandle, MapSurface, MarkerHandle, OverlayHandle, SurfaceHandle,
};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    Uninitialized,
    Ready,
    /// Terminal.
    Disposed,
}

/// Counts for one applied update.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateReport {
    pub markers_added: usize,
    pub markers_refreshed: usize,
    pub markers_removed: usize,
    pub markers_unchanged: usize,
    pub zones: usize,
    pub heat_points: usize,
    /// Recoverable failures; the batch was still applied around them.
    pub errors: Vec<MapError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum UpdateOutcome {
    Applied(UpdateReport),
    /// Held until the map is attached; replaces any earlier pending update.
    Deferred,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MapEvent {
    AttachScheduled { due: Time },
    Ready,
    UpdateDeferred { stations: usize },
    /// A held update was dropped because the map was disposed before it
    /// could be applied.
    UpdateDiscarded { stations: usize },
    Updated { markers: usize, zones: usize, errors: usize },
    Invalidated,
    Disposed,
    Error(MapError),
}

/// Read-only view of the state owned by a [`MapLifecycleManager`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapSnapshot {
    pub phase: Phase,
    pub attach_pending: bool,
    pub update_pending: bool,
    pub has_map: bool,
    pub has_base_layer: bool,
    pub has_heat_layer: bool,
    pub heat_points: usize,
    pub markers: Vec<StationId>,
    pub zones: Vec<(u8, StationId)>,
}

#[derive(Debug, Clone)]
enum Deferred {
    Attach { epoch: u64, surface: SurfaceHandle },
    Invalidate { epoch: u64 },
}

#[derive(Debug, Clone)]
struct PendingUpdate {
    stations: Vec<Station>,
    selected: Option<StationId>,
}

#[derive(Debug, Clone, Copy)]
struct Attached {
    map: MapHandle,
    base_layer: LayerHandle,
    heat_layer: Option<LayerHandle>,
}

/// Sole owner of one map surface and everything drawn on it.
///
/// Single-threaded and cooperative: deferred steps only run from
/// [`poll`](Self::poll), so the host decides when time advances.
pub struct MapLifecycleManager<S: MapSurface> {
    config: MapConfig,
    surface: S,
    factory: MarkerFactory,
    phase: Phase,
    /// Bumped on every attach and on dispose. Deferred work scheduled under
    /// an older epoch is discarded.
    epoch: u64,
    clock: Time,
    scheduler: Scheduler<Deferred>,
    attach_task: Option<TaskId>,
    invalidate_task: Option<TaskId>,
    attached: Option<Attached>,
    markers: Registry<MarkerHandle, MarkerDescriptor>,
    overlays: Registry<OverlayHandle, ZoneOverlay>,
    heat_point_count: usize,
    zones: Vec<Zone>,
    pending: Option<PendingUpdate>,
    events: EventBus<MapEvent>,
}

impl<S: MapSurface> MapLifecycleManager<S> {
    pub fn new(surface: S, config: MapConfig) -> Self {
        Self {
            factory: MarkerFactory::new(config.icons.clone()),
            config,
            surface,
            phase: Phase::Uninitialized,
            epoch: 0,
            clock: Time::ZERO,
            scheduler: Scheduler::new(),
            attach_task: None,
            invalidate_task: None,
            attached: None,
            markers: Registry::new(),
            overlays: Registry::new(),
            heat_point_count: 0,
            zones: Vec::new(),
            pending: None,
            events: EventBus::new(),
        }
    }

    /// Registers the callback that receives every event, including each
    /// recoverable [`MapError`].
    pub fn on_event(&mut self, listener: impl FnMut(&Event<MapEvent>) + 'static) {
        self.events.set_listener(listener);
    }

    pub fn events(&self) -> &EventBus<MapEvent> {
        &self.events
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_attach_pending(&self) -> bool {
        self.attach_task.is_some()
    }

    pub fn now(&self) -> Time {
        self.clock
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Mutable access to the backend for host-side mount bookkeeping.
    ///
    /// Objects created by this manager must not be touched through it.
    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    /// Starts attaching the map to `surface`.
    ///
    /// The attach itself runs from [`poll`](Self::poll) once the mount delay
    /// has elapsed. Calling this while an attach is pending or while ready
    /// does nothing.
    pub fn init(&mut self, surface: SurfaceHandle) -> Result<(), MapError> {
        match self.phase {
            Phase::Disposed => {
                return Err(self.reject(MapError::DisposedInstanceUsed { call: "init" }));
            }
            Phase::Ready => {
                debug!("init ignored: map already attached");
                return Ok(());
            }
            Phase::Uninitialized if self.attach_task.is_some() => {
                debug!("init ignored: attach already pending");
                return Ok(());
            }
            Phase::Uninitialized => {}
        }

        if !self.surface.is_mounted(&surface) {
            return Err(self.reject(MapError::SurfaceNotReady {
                surface: surface.0,
                reason: "surface is not mounted".to_string(),
            }));
        }

        let delay = self.config.timing.mount_delay_ms;
        let task = self.scheduler.schedule_after(
            self.clock,
            delay,
            Deferred::Attach {
                epoch: self.epoch,
                surface,
            },
        );
        self.attach_task = Some(task);
        let due = self.clock.after(delay);
        debug!(due_ms = due.as_millis(), "map attach scheduled");
        self.emit(MapEvent::AttachScheduled { due });
        Ok(())
    }

    /// Advances the logical clock to `now` and runs every deferred step that
    /// has become due. Returns how many steps ran.
    pub fn poll(&mut self, now: Time) -> usize {
        self.clock = self.clock.max(now);
        let mut ran = 0;
        while let Some((id, task)) = self.scheduler.pop_due(self.clock) {
            ran += 1;
            match task {
                Deferred::Attach { epoch, surface } => {
                    if self.attach_task == Some(id) {
                        self.attach_task = None;
                    }
                    self.run_attach(epoch, surface);
                }
                Deferred::Invalidate { epoch } => {
                    if self.invalidate_task == Some(id) {
                        self.invalidate_task = None;
                    }
                    self.run_invalidate(epoch);
                }
            }
        }
        ran
    }

    /// Applies a new station list and selection.
    ///
    /// Before the map is attached the update is held back; only the latest
    /// held update is applied once the map becomes ready.
    pub fn update(
        &mut self,
        stations: &[Station],
        selected: Option<StationId>,
    ) -> Result<UpdateOutcome, MapError> {
        match self.phase {
            Phase::Disposed => {
                Err(self.reject(MapError::DisposedInstanceUsed { call: "update" }))
            }
            Phase::Uninitialized => {
                if self.pending.is_some() {
                    debug!("replacing pending map update");
                }
                self.pending = Some(PendingUpdate {
                    stations: stations.to_vec(),
                    selected,
                });
                self.emit(MapEvent::UpdateDeferred {
                    stations: stations.len(),
                });
                Ok(UpdateOutcome::Deferred)
            }
            Phase::Ready => Ok(UpdateOutcome::Applied(self.apply(stations, selected))),
        }
    }

    /// Zones from the most recent applied update.
    pub fn current_zones(&self) -> Result<&[Zone], MapError> {
        if self.phase == Phase::Disposed {
            return Err(MapError::DisposedInstanceUsed {
                call: "current_zones",
            });
        }
        Ok(&self.zones)
    }

    /// Releases the map and everything on it and cancels deferred work.
    /// Safe to call repeatedly and while an attach is still pending.
    pub fn dispose(&mut self) {
        if self.phase == Phase::Disposed {
            debug!("dispose ignored: already disposed");
            return;
        }

        let cancelled = self.scheduler.cancel_all();
        self.attach_task = None;
        self.invalidate_task = None;
        self.epoch += 1;

        if let Some(pending) = self.pending.take() {
            warn!(
                stations = pending.stations.len(),
                "discarding update held for attach"
            );
            self.emit(MapEvent::UpdateDiscarded {
                stations: pending.stations.len(),
            });
        }

        for (id, entry) in self.markers.take_all() {
            if let Err(e) = self.surface.remove_marker(entry.handle) {
                self.report(MapError::layer(LayerOp::RemoveMarker, Some(id), e));
            }
        }
        for (id, entry) in self.overlays.take_all() {
            if let Err(e) = self.surface.remove_zone(entry.handle) {
                self.report(MapError::layer(LayerOp::RemoveZone, Some(id), e));
            }
        }
        if let Some(attached) = self.attached.take() {
            let layers = attached
                .heat_layer
                .into_iter()
                .chain(std::iter::once(attached.base_layer));
            for layer in layers {
                if let Err(e) = self.surface.remove_layer(layer) {
                    self.report(MapError::layer(LayerOp::RemoveLayer, None, e));
                }
            }
            if let Err(e) = self.surface.remove_map(attached.map) {
                self.report(MapError::layer(LayerOp::RemoveMap, None, e));
            }
        }

        self.zones.clear();
        self.heat_point_count = 0;
        self.phase = Phase::Disposed;
        info!(cancelled_tasks = cancelled, "map disposed");
        self.emit(MapEvent::Disposed);
    }

    pub fn snapshot(&self) -> MapSnapshot {
        MapSnapshot {
            phase: self.phase,
            attach_pending: self.attach_task.is_some(),
            update_pending: self.pending.is_some(),
            has_map: self.attached.is_some(),
            has_base_layer: self.attached.is_some(),
            has_heat_layer: self.attached.is_some_and(|a| a.heat_layer.is_some()),
            heat_points: self.heat_point_count,
            markers: self.markers.ids().collect(),
            zones: self.zones.iter().map(|z| (z.rank, z.center.id)).collect(),
        }
    }

    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    pub fn marker(&self, id: StationId) -> Option<&MarkerDescriptor> {
        self.markers.get(id).map(|e| &e.descriptor)
    }

    fn run_attach(&mut self, epoch: u64, surface: SurfaceHandle) {
        if epoch != self.epoch || self.phase != Phase::Uninitialized {
            debug!("discarding stale attach");
            return;
        }
        if !self.surface.is_mounted(&surface) {
            self.report(MapError::SurfaceNotReady {
                surface: surface.0,
                reason: "surface was unmounted before attach".to_string(),
            });
            return;
        }

        let map = match self.surface.create_map(&surface, self.config.view) {
            Ok(map) => map,
            Err(e) => {
                self.report(MapError::SurfaceNotReady {
                    surface: surface.0,
                    reason: e.to_string(),
                });
                return;
            }
        };

        let tiles = TileLayer::new(self.config.tiles.clone());
        let base_layer = match self.surface.add_tile_layer(map, &tiles) {
            Ok(layer) => layer,
            Err(e) => {
                self.report(MapError::layer(LayerOp::AddBaseLayer, None, e));
                if let Err(e) = self.surface.remove_map(map) {
                    self.report(MapError::layer(LayerOp::RemoveMap, None, e));
                }
                return;
            }
        };

        self.attached = Some(Attached {
            map,
            base_layer,
            heat_layer: None,
        });
        self.epoch += 1;
        self.phase = Phase::Ready;
        info!(surface = surface.as_str(), "map attached");
        self.emit(MapEvent::Ready);

        if let Some(pending) = self.pending.take() {
            self.apply(&pending.stations, pending.selected);
        }
    }

    fn run_invalidate(&mut self, epoch: u64) {
        if epoch != self.epoch || self.phase != Phase::Ready {
            return;
        }
        let Some(attached) = self.attached else {
            return;
        };
        match self.surface.invalidate_size(attached.map) {
            Ok(()) => self.emit(MapEvent::Invalidated),
            Err(e) => self.report(MapError::layer(LayerOp::InvalidateSize, None, e)),
        }
    }

    fn apply(&mut self, stations: &[Station], selected: Option<StationId>) -> UpdateReport {
        let mut report = UpdateReport::default();
        let Some(attached) = self.attached else {
            return report;
        };

        let evaluation = evaluate(stations);
        for rejected in evaluation.rejected {
            self.fail(&mut report, MapError::InvalidStationData(rejected));
        }

        let zones = rank_zones(&evaluation.scored);
        let desired_markers: BTreeMap<StationId, MarkerDescriptor> = evaluation
            .scored
            .iter()
            .map(|s| {
                let is_selected = selected == Some(s.station.id);
                (s.station.id, self.factory.build(s, is_selected))
            })
            .collect();

        self.reconcile_markers(attached.map, &desired_markers, &mut report);

        let points = heat_points(&evaluation.scored);
        self.refresh_heat(attached, points, &mut report);

        let desired_overlays: BTreeMap<StationId, ZoneOverlay> = zones
            .iter()
            .map(|z| (z.center.id, ZoneOverlay::from_zone(z, &self.config.zones)))
            .collect();
        self.reconcile_overlays(attached.map, &desired_overlays, &mut report);

        report.zones = zones.len();
        self.zones = zones;
        self.schedule_invalidate();

        debug!(
            added = report.markers_added,
            refreshed = report.markers_refreshed,
            removed = report.markers_removed,
            unchanged = report.markers_unchanged,
            zones = report.zones,
            "map updated"
        );
        self.emit(MapEvent::Updated {
            markers: self.markers.len(),
            zones: report.zones,
            errors: report.errors.len(),
        });
        report
    }

    fn reconcile_markers(
        &mut self,
        map: MapHandle,
        desired: &BTreeMap<StationId, MarkerDescriptor>,
        report: &mut UpdateReport,
    ) {
        let plan = self.markers.plan(desired);
        report.markers_unchanged = plan.unchanged;

        for id in plan.stale {
            let Some(handle) = self.markers.handle(id) else {
                continue;
            };
            // A marker that failed to go away stays registered so the next
            // update retries instead of leaking it.
            match self.surface.remove_marker(handle) {
                Ok(()) => {
                    self.markers.remove(id);
                    report.markers_removed += 1;
                }
                Err(e) => self.fail(report, MapError::layer(LayerOp::RemoveMarker, Some(id), e)),
            }
        }

        for id in plan.changed {
            let (Some(handle), Some(descriptor)) = (self.markers.handle(id), desired.get(&id))
            else {
                continue;
            };
            match self.surface.update_marker(handle, descriptor) {
                Ok(()) => {
                    self.markers.set_descriptor(id, descriptor.clone());
                    report.markers_refreshed += 1;
                }
                Err(e) => self.fail(report, MapError::layer(LayerOp::UpdateMarker, Some(id), e)),
            }
        }

        for id in plan.added {
            let Some(descriptor) = desired.get(&id) else {
                continue;
            };
            match self.surface.add_marker(map, descriptor) {
                Ok(handle) => {
                    self.markers.insert(id, handle, descriptor.clone());
                    report.markers_added += 1;
                }
                Err(e) => self.fail(report, MapError::layer(LayerOp::AddMarker, Some(id), e)),
            }
        }
    }

    fn reconcile_overlays(
        &mut self,
        map: MapHandle,
        desired: &BTreeMap<StationId, ZoneOverlay>,
        report: &mut UpdateReport,
    ) {
        let plan = self.overlays.plan(desired);

        // Overlays are redrawn rather than restyled: a changed zone is
        // removed first and then added back with the new descriptor.
        let mut to_add = plan.added;
        for id in plan.stale.into_iter().chain(plan.changed.iter().copied()) {
            let Some(handle) = self.overlays.handle(id) else {
                continue;
            };
            match self.surface.remove_zone(handle) {
                Ok(()) => {
                    self.overlays.remove(id);
                }
                Err(e) => self.fail(report, MapError::layer(LayerOp::RemoveZone, Some(id), e)),
            }
        }
        to_add.extend(
            plan.changed
                .into_iter()
                .filter(|id| self.overlays.get(*id).is_none()),
        );
        to_add.sort();

        for id in to_add {
            let Some(overlay) = desired.get(&id) else {
                continue;
            };
            match self.surface.add_zone(map, overlay) {
                Ok(handle) => {
                    self.overlays.insert(id, handle, overlay.clone());
                }
                Err(e) => self.fail(report, MapError::layer(LayerOp::AddZone, Some(id), e)),
            }
        }
    }

    fn refresh_heat(
        &mut self,
        attached: Attached,
        points: Vec<HeatPoint>,
        report: &mut UpdateReport,
    ) {
        match attached.heat_layer {
            Some(layer) => match self.surface.set_heat_points(layer, &points) {
                Ok(()) => self.heat_point_count = points.len(),
                Err(e) => self.fail(report, MapError::layer(LayerOp::SetHeatPoints, None, e)),
            },
            None if points.is_empty() => {}
            None => {
                let layer = HeatLayer::new(self.config.heat.clone(), points);
                match self.surface.add_heat_layer(attached.map, &layer) {
                    Ok(handle) => {
                        if let Some(a) = self.attached.as_mut() {
                            a.heat_layer = Some(handle);
                        }
                        self.heat_point_count = layer.points.len();
                    }
                    Err(e) => self.fail(report, MapError::layer(LayerOp::AddHeatLayer, None, e)),
                }
            }
        }
        report.heat_points = self.heat_point_count;
    }

    fn schedule_invalidate(&mut self) {
        if let Some(previous) = self.invalidate_task.take() {
            self.scheduler.cancel(previous);
        }
        let task = self.scheduler.schedule_after(
            self.clock,
            self.config.timing.invalidate_delay_ms,
            Deferred::Invalidate { epoch: self.epoch },
        );
        self.invalidate_task = Some(task);
    }

    fn fail(&mut self, report: &mut UpdateReport, err: MapError) {
        self.report(err.clone());
        report.errors.push(err);
    }

    fn report(&mut self, err: MapError) {
        match &err {
            MapError::InvalidStationData(e) => {
                warn!(station_id = %e.station_id(), error = %err, "skipping station");
            }
            _ => warn!(error = %err, "map operation failed"),
        }
        self.emit(MapEvent::Error(err));
    }

    fn reject(&mut self, err: MapError) -> MapError {
        self.report(err.clone());
        err
    }

    fn emit(&mut self, event: MapEvent) {
        self.events.emit(self.clock, event);
    }
}

impl<S: MapSurface> Drop for MapLifecycleManager<S> {
    fn drop(&mut self) {
        self.dispose();
    }
}
