//! Subzone key index.
//!
//! Maps `"{scenario_index}/{zone_name}"` to the main-zone placement that
//! positions that zone while the scenario is active. Built once at load from
//! the main zone's `common` placements plus those of its lettered layers
//! active in each scenario.

use glam::Vec3;
use rustc_hash::FxHashMap;

use crate::compose::transform::inverse_rotate;
use crate::errors::{Result, StarmapError};
use crate::galaxy::{Scenario, Zone, ZonePlacement};

#[derive(Debug, Clone, Default)]
pub struct SubzoneIndex {
    entries: FxHashMap<String, ZonePlacement>,
}

impl SubzoneIndex {
    #[must_use]
    pub fn key(scenario_index: usize, zone: &str) -> String {
        format!("{scenario_index}/{zone}")
    }

    /// Fails with [`StarmapError::DuplicateZoneKey`] if a zone is placed
    /// twice within one scenario.
    pub fn build(scenarios: &[Scenario], main_zone: &Zone) -> Result<Self> {
        let mut entries = FxHashMap::default();
        for (index, scenario) in scenarios.iter().enumerate() {
            let mask = scenario.layer_mask(&main_zone.name)?;
            for placement in main_zone.active_placements(mask) {
                let key = Self::key(index, &placement.target_zone);
                if entries.contains_key(&key) {
                    return Err(StarmapError::DuplicateZoneKey(key));
                }
                entries.insert(key, placement.clone());
            }
        }
        log::debug!("Subzone index for '{}': {} entries", main_zone.name, entries.len());
        Ok(Self { entries })
    }

    #[must_use]
    pub fn get(&self, scenario_index: usize, zone: &str) -> Option<&ZonePlacement> {
        self.entries.get(&Self::key(scenario_index, zone))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Converts a world-space delta into the local frame of `zone` under the
    /// given scenario. Zones without a placement (the main zone itself) use
    /// the world frame.
    #[must_use]
    pub fn zone_local_delta(&self, scenario_index: usize, zone: &str, delta: Vec3) -> Vec3 {
        match self.get(scenario_index, zone) {
            Some(placement) => inverse_rotate(delta, placement.rotation),
            None => delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::Layer;

    fn main_zone() -> Zone {
        let mut zone = Zone::new("Main");
        zone.add_placement(ZonePlacement::new("Base", Layer::Common, Vec3::ZERO, Vec3::ZERO));
        zone.add_placement(ZonePlacement::new(
            "Tower",
            Layer::Lettered(0),
            Vec3::new(0.0, 100.0, 0.0),
            Vec3::new(0.0, 90.0, 0.0),
        ));
        zone
    }

    #[test]
    fn keys_follow_active_layers() {
        let scenarios = vec![
            Scenario::new(1, "One").with_mask("Main", 0),
            Scenario::new(2, "Two").with_mask("Main", 1),
        ];
        let index = SubzoneIndex::build(&scenarios, &main_zone()).unwrap();
        assert!(index.get(0, "Base").is_some());
        assert!(index.get(0, "Tower").is_none());
        assert!(index.get(1, "Tower").is_some());
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn duplicate_key_fails_construction() {
        let mut zone = main_zone();
        zone.add_placement(ZonePlacement::new("Base", Layer::Lettered(0), Vec3::ONE, Vec3::ZERO));
        let scenarios = vec![
            Scenario::new(1, "One").with_mask("Main", 0),
            Scenario::new(2, "Two").with_mask("Main", 1),
        ];
        let err = SubzoneIndex::build(&scenarios, &zone).unwrap_err();
        assert!(matches!(err, StarmapError::DuplicateZoneKey(ref k) if k == "1/Base"));
    }

    #[test]
    fn local_delta_undoes_placement_rotation() {
        let scenarios = vec![Scenario::new(1, "One").with_mask("Main", 1)];
        let index = SubzoneIndex::build(&scenarios, &main_zone()).unwrap();
        // Tower is yawed 90 degrees: world -Z is local +X.
        let local = index.zone_local_delta(0, "Tower", Vec3::new(0.0, 0.0, -1.0));
        assert!((local - Vec3::X).length() < 1e-5, "{local:?}");
        assert_eq!(index.zone_local_delta(0, "Main", Vec3::X), Vec3::X);
    }
}
