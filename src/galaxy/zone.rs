use std::collections::BTreeMap;

use glam::Vec3;

use crate::errors::Result;
use crate::galaxy::{Layer, LayerMask, MapObject, Path};
use crate::ids::Identity;
use crate::record::Record;
use crate::settings::FieldDecodePolicy;

/// "Zone `target_zone` is instantiated here at this offset and orientation."
#[derive(Debug, Clone, PartialEq)]
pub struct ZonePlacement {
    pub target_zone: String,
    /// Layer of the containing zone this placement belongs to.
    pub layer: Layer,
    pub position: Vec3,
    /// Euler angles in degrees, applied Z, then Y, then X.
    pub rotation: Vec3,
    pub fields: Record,
}

impl ZonePlacement {
    #[must_use]
    pub fn new(target_zone: &str, layer: Layer, position: Vec3, rotation: Vec3) -> Self {
        Self {
            target_zone: target_zone.to_string(),
            layer,
            position,
            rotation,
            fields: Record::new(),
        }
    }

    pub fn from_record(layer: Layer, fields: Record, policy: FieldDecodePolicy) -> Result<Self> {
        Ok(Self {
            target_zone: fields.read::<String>("name", policy)?,
            layer,
            position: fields.read_vec3("pos", policy)?,
            rotation: fields.read_vec3("dir", policy)?,
            fields,
        })
    }

    #[must_use]
    pub fn to_record(&self) -> Record {
        let mut record = self.fields.clone();
        record.put("name", self.target_zone.as_str());
        record.put_vec3("pos", self.position);
        record.put_vec3("dir", self.rotation);
        record
    }
}

/// One loaded sub-level.
///
/// Objects live in exactly one layer bucket. A bucket existing (even empty)
/// means the zone carries that layer; moving an object into a zone that
/// lacks its layer places it in `common` instead.
#[derive(Debug, Clone, PartialEq)]
pub struct Zone {
    pub name: String,
    pub layers: BTreeMap<Layer, Vec<MapObject>>,
    pub paths: Vec<Path>,
    pub placements: BTreeMap<Layer, Vec<ZonePlacement>>,
}

impl Zone {
    #[must_use]
    pub fn new(name: &str) -> Self {
        let mut layers = BTreeMap::new();
        layers.insert(Layer::Common, Vec::new());
        Self {
            name: name.to_string(),
            layers,
            paths: Vec::new(),
            placements: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn has_layer(&self, layer: Layer) -> bool {
        self.layers.contains_key(&layer)
    }

    /// Declares a layer bucket without adding objects.
    pub fn ensure_layer(&mut self, layer: Layer) {
        self.layers.entry(layer).or_default();
    }

    // ========================================================================
    // Objects
    // ========================================================================

    /// Iterates every object, buckets in layer order.
    pub fn objects(&self) -> impl Iterator<Item = &MapObject> {
        self.layers.values().flatten()
    }

    /// Objects in buckets active under `mask`.
    pub fn active_objects(&self, mask: LayerMask) -> impl Iterator<Item = &MapObject> {
        self.layers
            .iter()
            .filter(move |(layer, _)| layer.is_active(mask))
            .flat_map(|(_, objects)| objects)
    }

    #[must_use]
    pub fn object(&self, identity: Identity) -> Option<&MapObject> {
        self.objects().find(|o| o.identity == identity)
    }

    pub fn object_mut(&mut self, identity: Identity) -> Option<&mut MapObject> {
        self.layers
            .values_mut()
            .flat_map(|objects| objects.iter_mut())
            .find(|o| o.identity == identity)
    }

    /// Appends to the object's own layer bucket, creating it if needed.
    pub fn insert_object(&mut self, object: MapObject) {
        self.layers.entry(object.layer).or_default().push(object);
    }

    /// Removes the object from whichever bucket holds it.
    pub fn remove_object(&mut self, identity: Identity) -> Option<MapObject> {
        self.layers.values_mut().find_map(|objects| {
            let pos = objects.iter().position(|o| o.identity == identity)?;
            Some(objects.remove(pos))
        })
    }

    /// Identities of one bucket, in list order.
    #[must_use]
    pub fn layer_identities(&self, layer: Layer) -> Vec<Identity> {
        self.layers
            .get(&layer)
            .map(|objects| objects.iter().map(|o| o.identity).collect())
            .unwrap_or_default()
    }

    // ========================================================================
    // Paths
    // ========================================================================

    #[must_use]
    pub fn path(&self, identity: Identity) -> Option<&Path> {
        self.paths.iter().find(|p| p.identity == identity)
    }

    pub fn path_mut(&mut self, identity: Identity) -> Option<&mut Path> {
        self.paths.iter_mut().find(|p| p.identity == identity)
    }

    pub fn remove_path(&mut self, identity: Identity) -> Option<Path> {
        let pos = self.paths.iter().position(|p| p.identity == identity)?;
        Some(self.paths.remove(pos))
    }

    /// Smallest path number not used by any path in this zone.
    #[must_use]
    pub fn free_path_index(&self) -> u32 {
        (0..)
            .find(|i| !self.paths.iter().any(|p| p.index == *i))
            .unwrap_or_default()
    }

    // ========================================================================
    // Placements
    // ========================================================================

    /// Placements in buckets active under `mask`, `common` first.
    pub fn active_placements(&self, mask: LayerMask) -> impl Iterator<Item = &ZonePlacement> {
        self.placements
            .iter()
            .filter(move |(layer, _)| layer.is_active(mask))
            .flat_map(|(_, placements)| placements)
    }

    pub fn add_placement(&mut self, placement: ZonePlacement) {
        self.placements.entry(placement.layer).or_default().push(placement);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::{ObjectKind, ZoneKey};
    use slotmap::SlotMap;

    #[test]
    fn free_path_index_fills_gaps() {
        let mut keys: SlotMap<ZoneKey, ()> = SlotMap::with_key();
        let key = keys.insert(());
        let mut zone = Zone::new("Z");
        assert_eq!(zone.free_path_index(), 0);
        zone.paths.push(Path::new(Identity(0), 0, key));
        zone.paths.push(Path::new(Identity(1), 2, key));
        assert_eq!(zone.free_path_index(), 1);
    }

    #[test]
    fn remove_preserves_order_of_survivors() {
        let mut keys: SlotMap<ZoneKey, ()> = SlotMap::with_key();
        let key = keys.insert(());
        let mut zone = Zone::new("Z");
        for i in 0..4 {
            zone.insert_object(MapObject::new(Identity(i), key, Layer::Common, ObjectKind::General, "Kuribo"));
        }
        zone.remove_object(Identity(1));
        assert_eq!(
            zone.layer_identities(Layer::Common),
            vec![Identity(0), Identity(2), Identity(3)]
        );
    }

    #[test]
    fn active_placements_follow_mask() {
        let mut zone = Zone::new("Z");
        zone.add_placement(ZonePlacement::new("Sub", Layer::Lettered(1), Vec3::ZERO, Vec3::ZERO));
        zone.add_placement(ZonePlacement::new("Base", Layer::Common, Vec3::ZERO, Vec3::ZERO));
        let names: Vec<&str> = zone
            .active_placements(LayerMask::empty())
            .map(|p| p.target_zone.as_str())
            .collect();
        assert_eq!(names, vec!["Base"]);
        let names: Vec<&str> = zone
            .active_placements(LayerMask::B)
            .map(|p| p.target_zone.as_str())
            .collect();
        assert_eq!(names, vec!["Base", "Sub"]);
    }
}
