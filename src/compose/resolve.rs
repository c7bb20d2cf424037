//! Zone composition.
//!
//! Walks the zone-placement tree from a root zone and reports every zone
//! instance that is live, with its effective layer mask and accumulated
//! world transform.
//!
//! For each zone instance:
//! 1. Its mask is looked up independently (scenario column for that zone).
//! 2. The instance is emitted.
//! 3. Below the depth cap, every placement in an active bucket (`common`
//!    first) is followed with `world · T(position) · R(rotation)`.
//!
//! The depth cap terminates placement cycles. Output order is a pre-order
//! walk, so resolving twice over unchanged data yields identical output.

use glam::Affine3A;
use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use crate::compose::transform::placement_matrix;
use crate::errors::Result;
use crate::galaxy::{LayerMask, Scenario, Zone, ZoneKey};

/// One live zone instance.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedZone {
    pub zone: ZoneKey,
    pub name: String,
    pub world: Affine3A,
    pub mask: LayerMask,
    /// Nesting depth of this instance; the root is 0. Zone-only resolutions
    /// report the root at the configured marker depth.
    pub depth: u32,
}

/// Read-only view over the loaded zones.
pub struct Composer<'a> {
    zones: &'a SlotMap<ZoneKey, Zone>,
    by_name: &'a FxHashMap<String, ZoneKey>,
    max_depth: u32,
}

impl<'a> Composer<'a> {
    #[must_use]
    pub fn new(
        zones: &'a SlotMap<ZoneKey, Zone>,
        by_name: &'a FxHashMap<String, ZoneKey>,
        max_depth: u32,
    ) -> Self {
        Self {
            zones,
            by_name,
            max_depth,
        }
    }

    /// Resolves every zone instance reachable from `root` under `scenario`.
    ///
    /// Every loaded zone's mask column is decoded before walking, so a
    /// malformed column fails the whole resolution rather than part of it.
    pub fn resolve(&self, scenario: &Scenario, root: &str) -> Result<Vec<ResolvedZone>> {
        let mut masks = FxHashMap::default();
        for name in self.by_name.keys() {
            masks.insert(name.as_str(), scenario.layer_mask(name)?);
        }
        let mut out = Vec::new();
        self.resolve_into(
            root,
            Affine3A::IDENTITY,
            0,
            &|name| masks.get(name).copied().unwrap_or_default(),
            &mut out,
        );
        Ok(out)
    }

    /// Resolves a single zone with a manually chosen mask, for editing a
    /// zone on its own.
    ///
    /// There is no scenario row, so nested zones resolve with `common`
    /// only. Placements are still followed up to the depth cap. The root
    /// entry is stamped with `marker_depth`.
    pub fn resolve_zone_only(&self, zone: &str, mask: LayerMask, marker_depth: u32) -> Vec<ResolvedZone> {
        let mut out = Vec::new();
        let root_mask = |name: &str| {
            if name == zone {
                mask
            } else {
                LayerMask::empty()
            }
        };
        self.resolve_into(zone, Affine3A::IDENTITY, 0, &root_mask, &mut out);
        if let Some(root) = out.first_mut() {
            root.depth = marker_depth;
        }
        out
    }

    fn resolve_into(
        &self,
        name: &str,
        world: Affine3A,
        depth: u32,
        mask_of: &dyn Fn(&str) -> LayerMask,
        out: &mut Vec<ResolvedZone>,
    ) {
        let Some(&key) = self.by_name.get(name) else {
            log::warn!("Placement refers to zone '{name}' which is not loaded; skipping");
            return;
        };
        let Some(zone) = self.zones.get(key) else {
            return;
        };

        let mask = mask_of(name);
        out.push(ResolvedZone {
            zone: key,
            name: zone.name.clone(),
            world,
            mask,
            depth,
        });

        if depth >= self.max_depth {
            if zone.active_placements(mask).next().is_some() {
                log::debug!("Depth cap {} reached at zone '{name}'; not descending", self.max_depth);
            }
            return;
        }

        for placement in zone.active_placements(mask) {
            let child_world = world * placement_matrix(placement.position, placement.rotation);
            self.resolve_into(&placement.target_zone, child_world, depth + 1, mask_of, out);
        }
    }
}
