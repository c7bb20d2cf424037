use glam::Vec3;

use crate::errors::Result;
use crate::galaxy::{Layer, ZoneKey};
use crate::ids::Identity;
use crate::record::Record;
use crate::settings::FieldDecodePolicy;

/// The fixed set of placeable object kinds.
///
/// Each kind is stored in its own list per layer. Which kinds exist depends
/// on the game, see [`GameVariant::supports`](crate::settings::GameVariant::supports).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectKind {
    General,
    MapPart,
    Gravity,
    Start,
    Area,
    Camera,
    Cutscene,
    Position,
    Child,
    Sound,
    Changer,
    Debug,
}

impl ObjectKind {
    pub const ALL: [ObjectKind; 12] = [
        Self::General,
        Self::MapPart,
        Self::Gravity,
        Self::Start,
        Self::Area,
        Self::Camera,
        Self::Cutscene,
        Self::Position,
        Self::Child,
        Self::Sound,
        Self::Changer,
        Self::Debug,
    ];

    /// Name of the per-layer table this kind is stored in.
    #[must_use]
    pub fn list_name(self) -> &'static str {
        match self {
            Self::General => "ObjInfo",
            Self::MapPart => "MapPartsInfo",
            Self::Gravity => "PlanetObjInfo",
            Self::Start => "StartInfo",
            Self::Area => "AreaObjInfo",
            Self::Camera => "CameraCubeInfo",
            Self::Cutscene => "DemoObjInfo",
            Self::Position => "GeneralPosInfo",
            Self::Child => "ChildObjInfo",
            Self::Sound => "SoundInfo",
            Self::Changer => "ChangeObjInfo",
            Self::Debug => "DebugMoveInfo",
        }
    }

    #[must_use]
    pub fn from_list_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.list_name().eq_ignore_ascii_case(name))
    }

    /// Whether objects of this kind carry a scale column.
    #[must_use]
    pub fn has_scale(self) -> bool {
        !matches!(self, Self::Start | Self::Position | Self::Debug)
    }
}

/// A placed entity inside one `(zone, layer)` bucket.
#[derive(Debug, Clone, PartialEq)]
pub struct MapObject {
    pub identity: Identity,
    /// Owning zone. A lookup key; the zone's layer bucket owns the object.
    pub zone: ZoneKey,
    pub layer: Layer,
    pub kind: ObjectKind,
    pub name: String,
    pub position: Vec3,
    /// Euler angles in degrees.
    pub rotation: Vec3,
    pub scale: Vec3,
    /// The full source row, forwarded untouched on save apart from the
    /// columns above.
    pub fields: Record,
}

impl MapObject {
    /// Creates a fresh object with default fields.
    #[must_use]
    pub fn new(identity: Identity, zone: ZoneKey, layer: Layer, kind: ObjectKind, name: &str) -> Self {
        Self {
            identity,
            zone,
            layer,
            kind,
            name: name.to_string(),
            position: Vec3::ZERO,
            rotation: Vec3::ZERO,
            scale: Vec3::ONE,
            fields: Record::new(),
        }
    }

    pub fn from_record(
        identity: Identity,
        zone: ZoneKey,
        layer: Layer,
        kind: ObjectKind,
        fields: Record,
        policy: FieldDecodePolicy,
    ) -> Result<Self> {
        let scale = if kind.has_scale() {
            fields.read_vec3("scale", policy)?
        } else {
            Vec3::ONE
        };
        Ok(Self {
            identity,
            zone,
            layer,
            kind,
            name: fields.read::<String>("name", policy)?,
            position: fields.read_vec3("pos", policy)?,
            rotation: fields.read_vec3("dir", policy)?,
            scale,
            fields,
        })
    }

    /// The source row with the edited columns written back.
    #[must_use]
    pub fn to_record(&self) -> Record {
        let mut record = self.fields.clone();
        record.put("name", self.name.as_str());
        record.put_vec3("pos", self.position);
        record.put_vec3("dir", self.rotation);
        if self.kind.has_scale() {
            record.put_vec3("scale", self.scale);
        }
        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn list_names_are_unique_and_reversible() {
        for kind in ObjectKind::ALL {
            assert_eq!(ObjectKind::from_list_name(kind.list_name()), Some(kind));
        }
        assert_eq!(ObjectKind::from_list_name("objinfo"), Some(ObjectKind::General));
        assert_eq!(ObjectKind::from_list_name("StageObjInfo"), None);
    }
}
