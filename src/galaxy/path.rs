use std::collections::BTreeMap;

use glam::Vec3;

use crate::errors::Result;
use crate::galaxy::ZoneKey;
use crate::ids::Identity;
use crate::record::Record;
use crate::settings::FieldDecodePolicy;

/// A control vertex of a spline [`Path`].
#[derive(Debug, Clone, PartialEq)]
pub struct PathPoint {
    pub identity: Identity,
    /// Owning path's identity.
    pub path: Identity,
    /// Key within the owning path.
    pub index: u32,
    pub position: Vec3,
    pub control_a: Vec3,
    pub control_b: Vec3,
    pub fields: Record,
}

impl PathPoint {
    #[must_use]
    pub fn new(identity: Identity, path: Identity, index: u32, position: Vec3) -> Self {
        Self {
            identity,
            path,
            index,
            position,
            control_a: position,
            control_b: position,
            fields: Record::new(),
        }
    }

    pub fn from_record(
        identity: Identity,
        path: Identity,
        fallback_index: u32,
        fields: Record,
        policy: FieldDecodePolicy,
    ) -> Result<Self> {
        let index = if fields.contains("id") {
            u32::try_from(fields.read::<i16>("id", policy)?).unwrap_or(fallback_index)
        } else {
            fallback_index
        };
        Ok(Self {
            identity,
            path,
            index,
            position: fields.read_vec3("pnt0", policy)?,
            control_a: fields.read_vec3("pnt1", policy)?,
            control_b: fields.read_vec3("pnt2", policy)?,
            fields,
        })
    }

    #[must_use]
    pub fn to_record(&self) -> Record {
        let mut record = self.fields.clone();
        record.put("id", i16::try_from(self.index).unwrap_or(i16::MAX));
        record.put_vec3("pnt0", self.position);
        record.put_vec3("pnt1", self.control_a);
        record.put_vec3("pnt2", self.control_b);
        record
    }
}

/// An ordered spline definition inside a zone.
#[derive(Debug, Clone, PartialEq)]
pub struct Path {
    pub identity: Identity,
    /// Per-zone path number. Dense: a deleted path's index is reused.
    pub index: u32,
    pub zone: ZoneKey,
    pub name: String,
    pub closed: bool,
    pub points: BTreeMap<u32, PathPoint>,
    pub fields: Record,
}

impl Path {
    #[must_use]
    pub fn new(identity: Identity, index: u32, zone: ZoneKey) -> Self {
        Self {
            identity,
            index,
            zone,
            name: format!("Path{index}"),
            closed: false,
            points: BTreeMap::new(),
            fields: Record::new(),
        }
    }

    /// Builds a path from its header row. Points are added by the caller.
    pub fn from_record(
        identity: Identity,
        fallback_index: u32,
        zone: ZoneKey,
        fields: Record,
        policy: FieldDecodePolicy,
    ) -> Result<Self> {
        let index = if fields.contains("no") {
            u32::try_from(fields.read::<i32>("no", policy)?).unwrap_or(fallback_index)
        } else {
            fallback_index
        };
        let closed = fields.read::<String>("closed", policy)? == "CLOSE";
        Ok(Self {
            identity,
            index,
            zone,
            name: fields.read::<String>("name", policy)?,
            closed,
            points: BTreeMap::new(),
            fields,
        })
    }

    /// Index for the next appended point: one past the largest, or 0.
    #[must_use]
    pub fn next_point_index(&self) -> u32 {
        self.points.last_key_value().map_or(0, |(k, _)| k + 1)
    }

    pub fn point_by_identity(&self, identity: Identity) -> Option<&PathPoint> {
        self.points.values().find(|p| p.identity == identity)
    }

    pub fn point_by_identity_mut(&mut self, identity: Identity) -> Option<&mut PathPoint> {
        self.points.values_mut().find(|p| p.identity == identity)
    }

    #[must_use]
    pub fn header_record(&self) -> Record {
        let mut record = self.fields.clone();
        record.put("no", i32::try_from(self.index).unwrap_or(i32::MAX));
        record.put("name", self.name.as_str());
        record.put("closed", if self.closed { "CLOSE" } else { "OPEN" });
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::FieldValue;
    use slotmap::SlotMap;

    #[test]
    fn point_indices_append_after_maximum() {
        let mut zones: SlotMap<ZoneKey, ()> = SlotMap::with_key();
        let zone = zones.insert(());
        let mut path = Path::new(Identity(0), 0, zone);
        assert_eq!(path.next_point_index(), 0);

        path.points.insert(0, PathPoint::new(Identity(1), Identity(0), 0, Vec3::ZERO));
        path.points.insert(4, PathPoint::new(Identity(2), Identity(0), 4, Vec3::ZERO));
        assert_eq!(path.next_point_index(), 5);

        // Gaps below the maximum are not reused.
        path.points.remove(&0);
        assert_eq!(path.next_point_index(), 5);
    }

    #[test]
    fn header_reads_closed_flag() {
        let mut zones: SlotMap<ZoneKey, ()> = SlotMap::with_key();
        let zone = zones.insert(());
        let header = Record::new()
            .with("no", 3i32)
            .with("name", "Rail")
            .with("closed", "CLOSE");
        let path = Path::from_record(Identity(9), 0, zone, header, FieldDecodePolicy::Strict).unwrap();
        assert_eq!(path.index, 3);
        assert!(path.closed);
        assert_eq!(
            path.header_record().get("closed"),
            Some(&FieldValue::String("CLOSE".to_string()))
        );
    }
}
