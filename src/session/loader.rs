//! Zone loading.
//!
//! Turns one zone's raw rows into a [`Zone`] and assigns identities on the
//! way in. Allocation order is fixed so identities are reproducible:
//!
//! 1. objects, by layer (`common`, then `layera`..`layerp`), then list order
//! 2. paths in list order, each path before its points

use crate::errors::Result;
use crate::galaxy::{Layer, MapObject, Path, PathPoint, Zone, ZoneKey, ZonePlacement};
use crate::ids::{EntityKind, EntityRef};
use crate::record::{LayerRecords, PathRecords, ZoneRecords};
use crate::session::Session;

impl Session {
    pub(crate) fn load_zone(&mut self, name: &str, records: ZoneRecords) -> Result<ZoneKey> {
        let key = self.zones.insert(Zone::new(name));
        self.zone_by_name.insert(name.to_string(), key);
        self.tree.add_zone(key, name, self.settings.game);

        let mut layers = records
            .layers
            .into_iter()
            .map(|(layer_name, layer)| -> Result<(Layer, LayerRecords)> {
                Ok((layer_name.parse::<Layer>()?, layer))
            })
            .collect::<Result<Vec<_>>>()?;
        layers.sort_by_key(|(layer, _)| *layer);

        let mut zone = Zone::new(name);
        for (layer, layer_records) in layers {
            self.load_layer(key, &mut zone, layer, layer_records)?;
        }
        for (i, path_records) in records.paths.into_iter().enumerate() {
            let path = self.load_path(key, i as u32, path_records)?;
            zone.paths.push(path);
        }

        log::debug!(
            "Loaded zone '{name}': {} objects, {} paths, {} placements",
            zone.objects().count(),
            zone.paths.len(),
            zone.placements.values().map(Vec::len).sum::<usize>()
        );
        if let Some(slot) = self.zones.get_mut(key) {
            *slot = zone;
        }
        Ok(key)
    }

    fn load_layer(&mut self, key: ZoneKey, zone: &mut Zone, layer: Layer, records: LayerRecords) -> Result<()> {
        let policy = self.settings.field_decode;
        zone.ensure_layer(layer);

        for (kind, record) in records.objects {
            if !self.settings.game.supports(kind) {
                log::warn!(
                    "Zone '{}' {layer}: skipping {} row, not part of {:?}",
                    zone.name,
                    kind.list_name(),
                    self.settings.game
                );
                continue;
            }
            let identity = self.registry.allocate(EntityKind::Object);
            let object = MapObject::from_record(identity, key, layer, kind, record, policy)?;
            self.registry.register(identity, EntityRef::Object { zone: key });
            self.tree.insert_object(identity, key, kind);
            zone.insert_object(object);
        }

        for record in records.placements {
            zone.add_placement(ZonePlacement::from_record(layer, record, policy)?);
        }
        Ok(())
    }

    fn load_path(&mut self, key: ZoneKey, fallback_index: u32, records: PathRecords) -> Result<Path> {
        let policy = self.settings.field_decode;
        let path_id = self.registry.allocate(EntityKind::Path);
        let mut path = Path::from_record(path_id, fallback_index, key, records.header, policy)?;
        self.registry.register(path_id, EntityRef::Path { zone: key });
        self.tree.insert_path(path_id, key);

        for (i, record) in records.points.into_iter().enumerate() {
            let point_id = self.registry.allocate(EntityKind::PathPoint);
            let mut point = PathPoint::from_record(point_id, path_id, i as u32, record, policy)?;
            if path.points.contains_key(&point.index) {
                let index = path.next_point_index();
                log::warn!(
                    "Path '{}' has duplicate point index {}; renumbering to {index}",
                    path.name,
                    point.index
                );
                point.index = index;
            }
            self.registry.register(point_id, EntityRef::PathPoint { zone: key, path: path_id });
            self.tree.insert_point(point_id, path_id);
            path.points.insert(point.index, point);
        }
        Ok(path)
    }
}
