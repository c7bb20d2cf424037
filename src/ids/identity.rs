use std::fmt;

use crate::galaxy::ZoneKey;

/// Galaxy-wide identifier of an object, path or path point.
///
/// All three entity families draw from one integer space, so an identity
/// names exactly one live entity regardless of its zone or layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identity(pub u32);

impl Identity {
    #[inline]
    #[must_use]
    pub fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Entity family an identity is allocated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Object,
    Path,
    PathPoint,
}

/// Where a registered identity lives.
///
/// This is a lookup key into the owning zone, never an owner of the entity.
/// The zone's buckets remain authoritative for the entity's data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityRef {
    Object { zone: ZoneKey },
    Path { zone: ZoneKey },
    PathPoint { zone: ZoneKey, path: Identity },
}

impl EntityRef {
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        match self {
            Self::Object { .. } => EntityKind::Object,
            Self::Path { .. } => EntityKind::Path,
            Self::PathPoint { .. } => EntityKind::PathPoint,
        }
    }

    #[must_use]
    pub fn zone(&self) -> ZoneKey {
        match *self {
            Self::Object { zone } | Self::Path { zone } | Self::PathPoint { zone, .. } => zone,
        }
    }
}
