//! Mutation operations.
//!
//! Every operation updates the owning zone bucket, the identity registry and
//! the tree mirror within the same call, then queues the render-cache
//! invalidations it causes. All of them require a ready session.
//!
//! An identity that no longer resolves (or resolves to the wrong kind of
//! entity) is treated as a stale reference: the call logs a warning and
//! does nothing. An identity the registry knows but whose zone bucket lacks
//! it means the indices have diverged, which panics.

use glam::Vec3;

use crate::compose::SubzoneIndex;
use crate::errors::{Result, StarmapError};
use crate::galaxy::{Layer, LayerMask, MapObject, ObjectKind, Path, PathPoint};
use crate::ids::{EntityKind, EntityRef, Identity};
use crate::session::{ChangeEvent, Session};

fn stale(op: &str, identity: Identity) {
    log::warn!("{op}: identity {identity} does not name a live entity of the expected kind; ignoring");
}

fn index_desync(identity: Identity) -> ! {
    panic!("zone buckets and identity registry disagree about {identity}");
}

impl Session {
    // ========================================================================
    // Objects
    // ========================================================================

    /// Places a new object in `zone`'s `layer` bucket.
    pub fn add_object(
        &mut self,
        zone: &str,
        layer: Layer,
        kind: ObjectKind,
        name: &str,
        position: Vec3,
    ) -> Result<Identity> {
        self.ensure_ready()?;
        if !layer.is_valid() {
            return Err(StarmapError::UnknownLayer(layer.to_string()));
        }
        if !self.settings.game.supports(kind) {
            return Err(StarmapError::UnsupportedKind(kind));
        }
        let key = self
            .zone_key(zone)
            .ok_or_else(|| StarmapError::ZoneNotFound(zone.to_string()))?;
        let Some(target) = self.zones.get_mut(key) else {
            return Err(StarmapError::ZoneNotFound(zone.to_string()));
        };

        let identity = self.registry.allocate(EntityKind::Object);
        let mut object = MapObject::new(identity, key, layer, kind, name);
        object.position = position;

        target.insert_object(object);
        self.registry.register(identity, EntityRef::Object { zone: key });
        self.tree.insert_object(identity, key, kind);
        self.pending.push(ChangeEvent::ZoneInvalidated(zone.to_string()));

        log::debug!("Added {kind:?} '{name}' as {identity} in '{zone}' {layer}");
        Ok(identity)
    }

    /// Removes an object and retires its identity.
    pub fn delete_object(&mut self, identity: Identity) -> Result<bool> {
        self.ensure_ready()?;
        let Some(EntityRef::Object { zone: key }) = self.registry.lookup(identity) else {
            stale("delete_object", identity);
            return Ok(false);
        };
        let Some(zone) = self.zones.get_mut(key) else {
            index_desync(identity);
        };
        if zone.remove_object(identity).is_none() {
            index_desync(identity);
        }

        self.registry.unregister(identity);
        self.tree.remove(identity);
        self.selection.retain(|&id| id != identity);
        self.pending.push(ChangeEvent::ZoneInvalidated(zone.name.clone()));
        Ok(true)
    }

    /// Moves an object into another zone, keeping its identity and tree node.
    ///
    /// If the destination has no bucket for the object's layer, the object
    /// lands in `common`.
    pub fn move_object(&mut self, identity: Identity, target_zone: &str) -> Result<bool> {
        self.ensure_ready()?;
        let Some(EntityRef::Object { zone: source }) = self.registry.lookup(identity) else {
            stale("move_object", identity);
            return Ok(false);
        };
        let destination = self
            .zone_key(target_zone)
            .ok_or_else(|| StarmapError::ZoneNotFound(target_zone.to_string()))?;
        if source == destination {
            return Ok(true);
        }

        let Some(mut object) = self.zones.get_mut(source).and_then(|z| z.remove_object(identity)) else {
            index_desync(identity);
        };
        let Some(dest) = self.zones.get_mut(destination) else {
            index_desync(identity);
        };
        if !dest.has_layer(object.layer) {
            log::debug!(
                "Zone '{}' has no {}; moving {identity} to common",
                dest.name,
                object.layer
            );
            object.layer = Layer::Common;
        }
        object.zone = destination;
        let kind = object.kind;
        dest.insert_object(object);

        if self
            .registry
            .relocate(identity, EntityRef::Object { zone: destination })
            .is_err()
        {
            index_desync(identity);
        }
        self.tree.repoint_object(identity, destination, kind);

        if let Some(src) = self.zones.get(source) {
            self.pending.push(ChangeEvent::ZoneInvalidated(src.name.clone()));
        }
        self.pending.push(ChangeEvent::ZoneInvalidated(target_zone.to_string()));
        Ok(true)
    }

    /// Moves an object to another layer bucket of its own zone.
    pub fn relayer_object(&mut self, identity: Identity, layer: Layer) -> Result<bool> {
        self.ensure_ready()?;
        if !layer.is_valid() {
            return Err(StarmapError::UnknownLayer(layer.to_string()));
        }
        let Some(EntityRef::Object { zone: key }) = self.registry.lookup(identity) else {
            stale("relayer_object", identity);
            return Ok(false);
        };
        let Some(zone) = self.zones.get_mut(key) else {
            index_desync(identity);
        };
        let Some(mut object) = zone.remove_object(identity) else {
            index_desync(identity);
        };
        object.layer = layer;
        zone.insert_object(object);
        self.pending.push(ChangeEvent::ObjectInvalidated(identity));
        Ok(true)
    }

    /// Overwrites an object's placement. Only that object's render state is
    /// invalidated.
    pub fn set_object_transform(
        &mut self,
        identity: Identity,
        position: Vec3,
        rotation: Vec3,
        scale: Vec3,
    ) -> Result<bool> {
        self.ensure_ready()?;
        let Some(EntityRef::Object { zone: key }) = self.registry.lookup(identity) else {
            stale("set_object_transform", identity);
            return Ok(false);
        };
        let Some(object) = self.zones.get_mut(key).and_then(|z| z.object_mut(identity)) else {
            index_desync(identity);
        };
        object.position = position;
        object.rotation = rotation;
        object.scale = scale;
        self.pending.push(ChangeEvent::ObjectInvalidated(identity));
        Ok(true)
    }

    // ========================================================================
    // Paths
    // ========================================================================

    /// Creates a path with one point at `position`. The path takes the
    /// smallest path number unused in the zone.
    ///
    /// Returns `(path, first_point)`.
    pub fn add_path(&mut self, zone: &str, position: Vec3) -> Result<(Identity, Identity)> {
        self.ensure_ready()?;
        let key = self
            .zone_key(zone)
            .ok_or_else(|| StarmapError::ZoneNotFound(zone.to_string()))?;
        let Some(target) = self.zones.get_mut(key) else {
            return Err(StarmapError::ZoneNotFound(zone.to_string()));
        };

        let index = target.free_path_index();
        let path_id = self.registry.allocate(EntityKind::Path);
        let point_id = self.registry.allocate(EntityKind::PathPoint);

        let mut path = Path::new(path_id, index, key);
        path.points.insert(0, PathPoint::new(point_id, path_id, 0, position));
        target.paths.push(path);

        self.registry.register(path_id, EntityRef::Path { zone: key });
        self.registry.register(point_id, EntityRef::PathPoint { zone: key, path: path_id });
        self.tree.insert_path(path_id, key);
        self.tree.insert_point(point_id, path_id);
        self.pending.push(ChangeEvent::PathInvalidated(path_id));

        log::debug!("Added path {index} as {path_id} in '{zone}'");
        Ok((path_id, point_id))
    }

    /// Appends a point after the path's highest point index.
    pub fn add_path_point(&mut self, path_id: Identity, position: Vec3) -> Result<Option<Identity>> {
        self.ensure_ready()?;
        let Some(EntityRef::Path { zone: key }) = self.registry.lookup(path_id) else {
            stale("add_path_point", path_id);
            return Ok(None);
        };
        let Some(path) = self.zones.get_mut(key).and_then(|z| z.path_mut(path_id)) else {
            index_desync(path_id);
        };

        let index = path.next_point_index();
        let point_id = self.registry.allocate(EntityKind::PathPoint);
        path.points.insert(index, PathPoint::new(point_id, path_id, index, position));

        self.registry.register(point_id, EntityRef::PathPoint { zone: key, path: path_id });
        self.tree.insert_point(point_id, path_id);
        self.pending.push(ChangeEvent::PathInvalidated(path_id));
        Ok(Some(point_id))
    }

    /// Removes a point. Removing the last point of a path removes the path.
    pub fn delete_path_point(&mut self, point_id: Identity) -> Result<bool> {
        self.ensure_ready()?;
        let Some(EntityRef::PathPoint { zone: key, path: path_id }) = self.registry.lookup(point_id) else {
            stale("delete_path_point", point_id);
            return Ok(false);
        };
        let Some(zone) = self.zones.get_mut(key) else {
            index_desync(point_id);
        };
        let Some(path) = zone.path_mut(path_id) else {
            index_desync(point_id);
        };
        let Some(index) = path.point_by_identity(point_id).map(|p| p.index) else {
            index_desync(point_id);
        };

        path.points.remove(&index);
        let emptied = path.points.is_empty();
        self.registry.unregister(point_id);
        self.tree.remove(point_id);
        self.selection.retain(|&id| id != point_id);

        if emptied {
            zone.remove_path(path_id);
            self.registry.unregister(path_id);
            self.tree.remove(path_id);
            self.selection.retain(|&id| id != path_id);
            log::debug!("Removed last point of {path_id}; path deleted");
        }
        self.pending.push(ChangeEvent::PathInvalidated(path_id));
        Ok(true)
    }

    /// Removes a path with all of its points.
    pub fn delete_path(&mut self, path_id: Identity) -> Result<bool> {
        self.ensure_ready()?;
        let Some(EntityRef::Path { zone: key }) = self.registry.lookup(path_id) else {
            stale("delete_path", path_id);
            return Ok(false);
        };
        let Some(path) = self.zones.get_mut(key).and_then(|z| z.remove_path(path_id)) else {
            index_desync(path_id);
        };

        for point in path.points.values() {
            self.registry.unregister(point.identity);
        }
        self.registry.unregister(path_id);
        self.tree.remove(path_id);
        self.selection
            .retain(|&id| id != path_id && path.point_by_identity(id).is_none());
        self.pending.push(ChangeEvent::PathInvalidated(path_id));
        Ok(true)
    }

    pub fn set_path_closed(&mut self, path_id: Identity, closed: bool) -> Result<bool> {
        self.ensure_ready()?;
        let Some(EntityRef::Path { zone: key }) = self.registry.lookup(path_id) else {
            stale("set_path_closed", path_id);
            return Ok(false);
        };
        let Some(path) = self.zones.get_mut(key).and_then(|z| z.path_mut(path_id)) else {
            index_desync(path_id);
        };
        path.closed = closed;
        self.pending.push(ChangeEvent::PathInvalidated(path_id));
        Ok(true)
    }

    /// Moves a point and its two control handles.
    pub fn set_path_point(
        &mut self,
        point_id: Identity,
        position: Vec3,
        control_a: Vec3,
        control_b: Vec3,
    ) -> Result<bool> {
        self.ensure_ready()?;
        let Some(EntityRef::PathPoint { zone: key, path: path_id }) = self.registry.lookup(point_id) else {
            stale("set_path_point", point_id);
            return Ok(false);
        };
        let Some(point) = self
            .zones
            .get_mut(key)
            .and_then(|z| z.path_mut(path_id))
            .and_then(|p| p.point_by_identity_mut(point_id))
        else {
            index_desync(point_id);
        };
        point.position = position;
        point.control_a = control_a;
        point.control_b = control_b;
        self.pending.push(ChangeEvent::PathInvalidated(path_id));
        Ok(true)
    }

    // ========================================================================
    // Scenarios
    // ========================================================================

    pub fn rename_scenario(&mut self, index: usize, name: &str) -> Result<()> {
        self.ensure_ready()?;
        let scenario = self
            .galaxy
            .scenario_mut(index)
            .ok_or(StarmapError::ScenarioOutOfRange(index))?;
        scenario.set_name(name);
        Ok(())
    }

    /// Writes a zone's layer mask for one scenario.
    ///
    /// Changing the main zone's mask rebuilds the subzone index; if that
    /// would produce a duplicate key the write is rolled back.
    pub fn set_layer_mask(&mut self, index: usize, zone: &str, mask: LayerMask) -> Result<()> {
        self.ensure_ready()?;
        if self.zone_key(zone).is_none() {
            return Err(StarmapError::ZoneNotFound(zone.to_string()));
        }
        let scenario = self
            .galaxy
            .scenario_mut(index)
            .ok_or(StarmapError::ScenarioOutOfRange(index))?;
        let previous = scenario.clone();
        scenario.set_layer_mask(zone, mask);

        if self.galaxy.main_zone() == Some(zone)
            && let Some(main) = self.zone_key(zone).and_then(|k| self.zones.get(k))
        {
            match SubzoneIndex::build(&self.galaxy.scenarios, main) {
                Ok(rebuilt) => self.subzones = rebuilt,
                Err(err) => {
                    if let Some(scenario) = self.galaxy.scenario_mut(index) {
                        *scenario = previous;
                    }
                    return Err(err);
                }
            }
        }

        self.invalidate_all_zones();
        Ok(())
    }
}
