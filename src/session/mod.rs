//! Editor Session
//!
//! A [`Session`] owns one opened galaxy (or a single standalone zone) and
//! everything derived from it:
//!
//! - the zone arena and the [`IdentityRegistry`]
//! - the [`TreeMirror`] (identity → UI node)
//! - the [`RenderCache`] (identity → world-space render state) and the
//!   [`InvalidationQueue`] feeding it
//! - the [`SubzoneIndex`] and the current scenario / selection
//!
//! # Lifecycle
//!
//! ```text
//! open ──► Loading ──run_pending_tasks()──► Ready ──close()──► Closed
//! ```
//!
//! Opening loads every zone and assigns identities, then queues a one-shot
//! initialization task that resolves the scene and fills the render cache.
//! Mutations and render passes are rejected with
//! [`StarmapError::NotReady`] until that task has run, and with
//! [`StarmapError::SessionClosed`] after [`Session::close`].

pub mod cache;
pub mod edit;
pub mod loader;
pub mod save;
pub mod tree;

pub use cache::{CachedObject, CachedPath, ChangeEvent, InvalidationQueue, RenderCache};
pub use tree::{TreeGroup, TreeLabel, TreeMirror, TreeNode, TreeNodeKey};

use std::collections::VecDeque;

use glam::Vec3;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::compose::{Composer, ResolvedZone, SubzoneIndex};
use crate::errors::{Result, StarmapError};
use crate::galaxy::{Galaxy, LayerMask, MapObject, Path, PathPoint, Scenario, Zone, ZoneKey};
use crate::ids::{EntityRef, Identity, IdentityRegistry};
use crate::record::RecordSource;
use crate::settings::EditorSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Loading,
    Ready,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    /// A whole galaxy, resolved per scenario.
    Galaxy,
    /// One zone on its own, resolved with a manually chosen layer mask.
    Zone,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeferredTask {
    InitialCache,
}

pub struct Session {
    pub(crate) settings: EditorSettings,
    pub(crate) mode: SessionMode,
    pub(crate) state: SessionState,
    pub(crate) galaxy: Galaxy,

    pub(crate) zones: SlotMap<ZoneKey, Zone>,
    pub(crate) zone_by_name: FxHashMap<String, ZoneKey>,

    pub(crate) registry: IdentityRegistry,
    pub(crate) tree: TreeMirror,
    pub(crate) cache: RenderCache,
    pub(crate) pending: InvalidationQueue,
    pub(crate) subzones: SubzoneIndex,

    deferred: VecDeque<DeferredTask>,

    pub(crate) current_scenario: usize,
    pub(crate) zone_only_mask: LayerMask,
    pub(crate) selection: Vec<Identity>,
}

impl Session {
    fn empty(settings: EditorSettings, mode: SessionMode, galaxy: Galaxy) -> Self {
        Self {
            settings,
            mode,
            state: SessionState::Loading,
            galaxy,
            zones: SlotMap::with_key(),
            zone_by_name: FxHashMap::default(),
            registry: IdentityRegistry::new(),
            tree: TreeMirror::new(),
            cache: RenderCache::new(),
            pending: InvalidationQueue::new(),
            subzones: SubzoneIndex::default(),
            deferred: VecDeque::new(),
            current_scenario: 0,
            zone_only_mask: LayerMask::empty(),
            selection: Vec::new(),
        }
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Opens a galaxy: loads its scenarios and every zone in its zone list,
    /// assigning identities in zone, layer, then list order.
    ///
    /// Any failure aborts the whole open; no partially loaded session is
    /// returned.
    pub fn open(source: &dyn RecordSource, galaxy: &str, settings: EditorSettings) -> Result<Self> {
        settings.validate()?;

        let zone_names = source.zone_list(galaxy)?;
        let Some(main_zone) = zone_names.first().cloned() else {
            return Err(StarmapError::record_source(
                format!("opening galaxy '{galaxy}'"),
                "zone list is empty",
            ));
        };

        let scenarios = source
            .scenario_rows(galaxy)?
            .into_iter()
            .map(|row| Scenario::from_record(row, settings.field_decode))
            .collect::<Result<Vec<_>>>()?;

        let mut session = Self::empty(
            settings,
            SessionMode::Galaxy,
            Galaxy::new(galaxy, zone_names.clone(), scenarios),
        );

        for name in &zone_names {
            if session.zone_by_name.contains_key(name) {
                log::warn!("Zone '{name}' listed twice in galaxy '{galaxy}'; loading once");
                continue;
            }
            let records = source.open_zone(name)?;
            session.load_zone(name, records)?;
        }

        let main = session
            .zone(&main_zone)
            .ok_or_else(|| StarmapError::ZoneNotFound(main_zone.clone()))?;
        session.subzones = SubzoneIndex::build(&session.galaxy.scenarios, main)?;

        session.deferred.push_back(DeferredTask::InitialCache);
        log::info!(
            "Opened galaxy '{galaxy}': {} zones, {} scenarios, {} identities",
            session.zones.len(),
            session.galaxy.scenarios.len(),
            session.registry.len()
        );
        Ok(session)
    }

    /// Opens a single zone for standalone editing.
    pub fn open_zone(source: &dyn RecordSource, zone: &str, settings: EditorSettings) -> Result<Self> {
        settings.validate()?;
        let records = source.open_zone(zone)?;

        let mut session = Self::empty(
            settings,
            SessionMode::Zone,
            Galaxy::new(zone, vec![zone.to_string()], Vec::new()),
        );
        session.load_zone(zone, records)?;
        session.deferred.push_back(DeferredTask::InitialCache);
        log::info!("Opened zone '{zone}': {} identities", session.registry.len());
        Ok(session)
    }

    /// Runs queued deferred tasks. The first call performs the initial
    /// resolve-and-cache pass and makes the session ready.
    pub fn run_pending_tasks(&mut self) -> Result<()> {
        if self.state == SessionState::Closed {
            return Err(StarmapError::SessionClosed);
        }
        while let Some(task) = self.deferred.pop_front() {
            match task {
                DeferredTask::InitialCache => self.initial_cache_pass()?,
            }
        }
        Ok(())
    }

    fn initial_cache_pass(&mut self) -> Result<()> {
        let resolved = self.resolve_current()?;
        self.cache.set_zone_instances(&resolved);
        for (key, zone) in &self.zones {
            self.cache.rebuild_zone(key, zone);
        }
        self.state = SessionState::Ready;
        log::debug!(
            "Initial cache pass: {} zone instances, {} objects, {} paths cached",
            resolved.len(),
            self.cache.object_count(),
            self.cache.path_count()
        );
        Ok(())
    }

    /// Releases every zone, identity, tree node and cache entry.
    pub fn close(&mut self) {
        self.deferred.clear();
        self.pending.clear();
        self.selection.clear();
        self.cache.clear();
        self.tree.clear();
        self.registry.clear();
        self.subzones = SubzoneIndex::default();
        self.zone_by_name.clear();
        self.zones.clear();
        self.state = SessionState::Closed;
        log::info!("Closed session for '{}'", self.galaxy.name);
    }

    pub(crate) fn ensure_ready(&self) -> Result<()> {
        match self.state {
            SessionState::Ready => Ok(()),
            SessionState::Loading => Err(StarmapError::NotReady),
            SessionState::Closed => Err(StarmapError::SessionClosed),
        }
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    #[must_use]
    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    #[must_use]
    pub fn settings(&self) -> &EditorSettings {
        &self.settings
    }

    // ========================================================================
    // Composition
    // ========================================================================

    fn composer(&self) -> Composer<'_> {
        Composer::new(&self.zones, &self.zone_by_name, self.settings.max_depth)
    }

    /// Live zone instances of the galaxy under a scenario.
    pub fn resolve(&self, scenario_index: usize) -> Result<Vec<ResolvedZone>> {
        if self.state == SessionState::Closed {
            return Err(StarmapError::SessionClosed);
        }
        let scenario = self
            .galaxy
            .scenario(scenario_index)
            .ok_or(StarmapError::ScenarioOutOfRange(scenario_index))?;
        let root = self.galaxy.main_zone().unwrap_or_default();
        self.composer().resolve(scenario, root)
    }

    /// Live zone instances when `zone` is edited on its own with `mask`.
    #[must_use]
    pub fn resolve_zone_only(&self, zone: &str, mask: LayerMask) -> Vec<ResolvedZone> {
        self.composer()
            .resolve_zone_only(zone, mask, self.settings.standalone_marker_depth)
    }

    /// Resolves with the current scenario (galaxy mode) or the current
    /// zone-only mask (zone mode).
    pub fn resolve_current(&self) -> Result<Vec<ResolvedZone>> {
        match self.mode {
            SessionMode::Galaxy if self.galaxy.scenarios.is_empty() => {
                log::warn!("Galaxy '{}' has no scenarios; nothing to resolve", self.galaxy.name);
                Ok(Vec::new())
            }
            SessionMode::Galaxy => self.resolve(self.current_scenario),
            SessionMode::Zone => {
                if self.state == SessionState::Closed {
                    return Err(StarmapError::SessionClosed);
                }
                let root = self.galaxy.main_zone().unwrap_or_default();
                Ok(self.resolve_zone_only(root, self.zone_only_mask))
            }
        }
    }

    #[must_use]
    pub fn current_scenario(&self) -> usize {
        self.current_scenario
    }

    /// Switches the active scenario and invalidates every zone.
    pub fn select_scenario(&mut self, index: usize) -> Result<()> {
        if index >= self.galaxy.scenarios.len() {
            return Err(StarmapError::ScenarioOutOfRange(index));
        }
        self.current_scenario = index;
        self.invalidate_all_zones();
        Ok(())
    }

    /// Sets the mask used to resolve a standalone zone.
    pub fn set_zone_only_mask(&mut self, mask: LayerMask) {
        self.zone_only_mask = mask;
        self.invalidate_all_zones();
    }

    pub(crate) fn invalidate_all_zones(&mut self) {
        for zone in self.zones.values() {
            self.pending.push(ChangeEvent::ZoneInvalidated(zone.name.clone()));
        }
    }

    /// Converts a world-space delta into `zone`'s local frame under a
    /// scenario, for dragging objects inside rotated subzones.
    #[must_use]
    pub fn zone_local_delta(&self, scenario_index: usize, zone: &str, delta: Vec3) -> Vec3 {
        self.subzones.zone_local_delta(scenario_index, zone, delta)
    }

    #[must_use]
    pub fn subzones(&self) -> &SubzoneIndex {
        &self.subzones
    }

    // ========================================================================
    // Render Pass
    // ========================================================================

    /// Events queued since the last render pass.
    pub fn pending_events(&self) -> impl Iterator<Item = &ChangeEvent> {
        self.pending.iter()
    }

    /// Drains pending invalidations, rebuilds the affected cache entries and
    /// returns the events for the renderer and tree view.
    pub fn begin_render_pass(&mut self) -> Result<Vec<ChangeEvent>> {
        self.ensure_ready()?;
        let events = self.pending.drain();

        if events.iter().any(|e| matches!(e, ChangeEvent::ZoneInvalidated(_))) {
            let resolved = self.resolve_current()?;
            self.cache.set_zone_instances(&resolved);
        }

        for event in &events {
            match event {
                ChangeEvent::ZoneInvalidated(name) => {
                    if let Some(&key) = self.zone_by_name.get(name)
                        && let Some(zone) = self.zones.get(key)
                    {
                        self.cache.rebuild_zone(key, zone);
                    }
                }
                ChangeEvent::ObjectInvalidated(id) => {
                    let object = self
                        .registry
                        .lookup(*id)
                        .and_then(|e| self.zones.get(e.zone()))
                        .and_then(|z| z.object(*id));
                    match object {
                        Some(object) => self.cache.rebuild_object(object),
                        None => self.cache.remove_object(*id),
                    }
                }
                ChangeEvent::PathInvalidated(id) => {
                    let path = self
                        .registry
                        .lookup(*id)
                        .and_then(|e| self.zones.get(e.zone()))
                        .and_then(|z| z.path(*id));
                    match path {
                        Some(path) => self.cache.rebuild_path(path),
                        None => self.cache.remove_path(*id),
                    }
                }
            }
        }
        Ok(events)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[must_use]
    pub fn galaxy(&self) -> &Galaxy {
        &self.galaxy
    }

    #[must_use]
    pub fn registry(&self) -> &IdentityRegistry {
        &self.registry
    }

    #[must_use]
    pub fn tree(&self) -> &TreeMirror {
        &self.tree
    }

    #[must_use]
    pub fn render_cache(&self) -> &RenderCache {
        &self.cache
    }

    #[must_use]
    pub fn lookup(&self, identity: Identity) -> Option<EntityRef> {
        self.registry.lookup(identity)
    }

    #[must_use]
    pub fn zone_key(&self, name: &str) -> Option<ZoneKey> {
        self.zone_by_name.get(name).copied()
    }

    #[must_use]
    pub fn zone(&self, name: &str) -> Option<&Zone> {
        self.zone_key(name).and_then(|k| self.zones.get(k))
    }

    #[must_use]
    pub fn zone_by_key(&self, key: ZoneKey) -> Option<&Zone> {
        self.zones.get(key)
    }

    /// Loaded zones in arena order.
    pub fn zones(&self) -> impl Iterator<Item = (ZoneKey, &Zone)> {
        self.zones.iter()
    }

    #[must_use]
    pub fn object(&self, identity: Identity) -> Option<&MapObject> {
        match self.registry.lookup(identity)? {
            EntityRef::Object { zone } => self.zones.get(zone)?.object(identity),
            _ => None,
        }
    }

    #[must_use]
    pub fn path(&self, identity: Identity) -> Option<&Path> {
        match self.registry.lookup(identity)? {
            EntityRef::Path { zone } => self.zones.get(zone)?.path(identity),
            _ => None,
        }
    }

    #[must_use]
    pub fn path_point(&self, identity: Identity) -> Option<&PathPoint> {
        match self.registry.lookup(identity)? {
            EntityRef::PathPoint { zone, path } => {
                self.zones.get(zone)?.path(path)?.point_by_identity(identity)
            }
            _ => None,
        }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Adds a live entity to the selection. Returns `false` for unknown or
    /// already selected identities.
    pub fn select(&mut self, identity: Identity) -> bool {
        if !self.registry.contains(identity) || self.selection.contains(&identity) {
            return false;
        }
        self.selection.push(identity);
        true
    }

    pub fn deselect(&mut self, identity: Identity) -> bool {
        let before = self.selection.len();
        self.selection.retain(|&id| id != identity);
        self.selection.len() != before
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    #[must_use]
    pub fn selection(&self) -> &[Identity] {
        &self.selection
    }
}
