//! Render-state cache and its invalidation queue.
//!
//! Mutations never touch cached render state directly. They push
//! [`ChangeEvent`]s onto an [`InvalidationQueue`]; the queue is drained at
//! the start of the next render pass, which rebuilds the affected entries
//! and hands the same events to the renderer and tree view.

use std::collections::VecDeque;

use glam::{Affine3A, Vec3};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::compose::ResolvedZone;
use crate::compose::transform::object_matrix;
use crate::galaxy::{MapObject, Path, Zone, ZoneKey};
use crate::ids::Identity;

/// Something whose cached render state must be rebuilt.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ChangeEvent {
    ZoneInvalidated(String),
    ObjectInvalidated(Identity),
    PathInvalidated(Identity),
}

/// Ordered, idempotent queue of pending invalidations.
///
/// Pushing an event that is already queued is a no-op, so the first
/// occurrence keeps its position.
#[derive(Debug, Default)]
pub struct InvalidationQueue {
    order: VecDeque<ChangeEvent>,
    queued: FxHashSet<ChangeEvent>,
}

impl InvalidationQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `false` if the event was already pending.
    pub fn push(&mut self, event: ChangeEvent) -> bool {
        if self.queued.contains(&event) {
            return false;
        }
        self.queued.insert(event.clone());
        self.order.push_back(event);
        true
    }

    /// Takes every pending event in insertion order.
    pub fn drain(&mut self) -> Vec<ChangeEvent> {
        self.queued.clear();
        self.order.drain(..).collect()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ChangeEvent> {
        self.order.iter()
    }

    pub fn clear(&mut self) {
        self.order.clear();
        self.queued.clear();
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedObject {
    pub zone: ZoneKey,
    pub world: Affine3A,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CachedPath {
    pub zone: ZoneKey,
    /// World-space point positions in point-index order.
    pub points: Vec<Vec3>,
    pub closed: bool,
}

/// Per-entity world-space state consumed by the renderer.
///
/// Only entities of zones that are live in the resolved scene have entries.
/// A zone placed more than once is cached at its first resolved instance.
#[derive(Debug, Default)]
pub struct RenderCache {
    zone_instances: FxHashMap<ZoneKey, Affine3A>,
    objects: FxHashMap<Identity, CachedObject>,
    paths: FxHashMap<Identity, CachedPath>,
}

impl RenderCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the zone instance transforms with a new resolution.
    pub fn set_zone_instances(&mut self, resolved: &[ResolvedZone]) {
        self.zone_instances.clear();
        for instance in resolved {
            self.zone_instances.entry(instance.zone).or_insert(instance.world);
        }
    }

    #[must_use]
    pub fn zone_world(&self, zone: ZoneKey) -> Option<Affine3A> {
        self.zone_instances.get(&zone).copied()
    }

    #[must_use]
    pub fn is_zone_live(&self, zone: ZoneKey) -> bool {
        self.zone_instances.contains_key(&zone)
    }

    /// Drops and recomputes every entry belonging to `key`.
    pub fn rebuild_zone(&mut self, key: ZoneKey, zone: &Zone) {
        self.objects.retain(|_, o| o.zone != key);
        self.paths.retain(|_, p| p.zone != key);
        for object in zone.objects() {
            self.rebuild_object(object);
        }
        for path in &zone.paths {
            self.rebuild_path(path);
        }
    }

    pub fn rebuild_object(&mut self, object: &MapObject) {
        let Some(zone_world) = self.zone_world(object.zone) else {
            self.objects.remove(&object.identity);
            return;
        };
        let world = zone_world * object_matrix(object.position, object.rotation, object.scale);
        self.objects.insert(
            object.identity,
            CachedObject {
                zone: object.zone,
                world,
            },
        );
    }

    pub fn rebuild_path(&mut self, path: &Path) {
        let Some(zone_world) = self.zone_world(path.zone) else {
            self.paths.remove(&path.identity);
            return;
        };
        let points = path
            .points
            .values()
            .map(|p| zone_world.transform_point3(p.position))
            .collect();
        self.paths.insert(
            path.identity,
            CachedPath {
                zone: path.zone,
                points,
                closed: path.closed,
            },
        );
    }

    pub fn remove_object(&mut self, identity: Identity) {
        self.objects.remove(&identity);
    }

    pub fn remove_path(&mut self, identity: Identity) {
        self.paths.remove(&identity);
    }

    #[must_use]
    pub fn object(&self, identity: Identity) -> Option<&CachedObject> {
        self.objects.get(&identity)
    }

    #[must_use]
    pub fn path(&self, identity: Identity) -> Option<&CachedPath> {
        self.paths.get(&identity)
    }

    #[must_use]
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    #[must_use]
    pub fn path_count(&self) -> usize {
        self.paths.len()
    }

    pub fn clear(&mut self) {
        self.zone_instances.clear();
        self.objects.clear();
        self.paths.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn queue_is_ordered_and_idempotent() {
        let mut q = InvalidationQueue::new();
        assert!(q.push(ChangeEvent::ZoneInvalidated("A".into())));
        assert!(q.push(ChangeEvent::ObjectInvalidated(Identity(3))));
        assert!(!q.push(ChangeEvent::ZoneInvalidated("A".into())));
        assert!(q.push(ChangeEvent::PathInvalidated(Identity(3))));
        assert_eq!(
            q.drain(),
            vec![
                ChangeEvent::ZoneInvalidated("A".into()),
                ChangeEvent::ObjectInvalidated(Identity(3)),
                ChangeEvent::PathInvalidated(Identity(3)),
            ]
        );
        assert!(q.is_empty());
        // Draining forgets what was queued.
        assert!(q.push(ChangeEvent::ZoneInvalidated("A".into())));
    }
}
