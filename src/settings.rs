//! Editor Settings
//!
//! Configuration for a [`Session`](crate::session::Session): which game's
//! object kinds are recognised, how deep zone placements are followed, and
//! how malformed record fields are decoded.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use starmap::settings::{EditorSettings, GameVariant};
//!
//! let settings = EditorSettings {
//!     game: GameVariant::Galaxy1,
//!     max_depth: 8,
//!     ..Default::default()
//! };
//!
//! // Or from a JSON document; missing keys fall back to defaults.
//! let settings = EditorSettings::from_json(r#"{ "max_depth": 3 }"#)?;
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{Result, StarmapError};
use crate::galaxy::ObjectKind;

/// Default cap on nested zone placements followed by the composer.
pub const DEFAULT_MAX_DEPTH: u32 = 5;

/// Depth value stamped on zone-only resolutions.
pub const DEFAULT_STANDALONE_MARKER_DEPTH: u32 = 99;

// ---------------------------------------------------------------------------
// GameVariant
// ---------------------------------------------------------------------------

/// The game whose level format is being edited.
///
/// The two games share the zone/layer/scenario model but differ in which
/// object lists exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum GameVariant {
    Galaxy1,
    #[default]
    Galaxy2,
}

impl GameVariant {
    /// Returns `true` if zones of this game carry lists of `kind`.
    #[must_use]
    pub fn supports(self, kind: ObjectKind) -> bool {
        match kind {
            ObjectKind::Child | ObjectKind::Sound => self == Self::Galaxy1,
            ObjectKind::Changer => self == Self::Galaxy2,
            _ => true,
        }
    }

    /// All object kinds present in this game, in list load order.
    pub fn kinds(self) -> impl Iterator<Item = ObjectKind> {
        ObjectKind::ALL.into_iter().filter(move |k| self.supports(*k))
    }
}

// ---------------------------------------------------------------------------
// FieldDecodePolicy
// ---------------------------------------------------------------------------

/// What to do when a record field's stored type differs from the one read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FieldDecodePolicy {
    /// Log a warning and use the zero value of the requested type.
    #[default]
    ZeroOnMismatch,
    /// Fail with [`StarmapError::FieldTypeMismatch`].
    Strict,
}

// ---------------------------------------------------------------------------
// EditorSettings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorSettings {
    pub game: GameVariant,
    /// Placements nested deeper than this are not followed. Guards against
    /// placement cycles.
    pub max_depth: u32,
    /// Depth reported for the root of a zone-only resolution.
    pub standalone_marker_depth: u32,
    pub field_decode: FieldDecodePolicy,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            game: GameVariant::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            standalone_marker_depth: DEFAULT_STANDALONE_MARKER_DEPTH,
            field_decode: FieldDecodePolicy::default(),
        }
    }
}

impl EditorSettings {
    /// Parses settings from JSON and validates them.
    pub fn from_json(text: &str) -> Result<Self> {
        let settings: Self = serde_json::from_str(text)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_depth == 0 {
            return Err(StarmapError::InvalidSettings(
                "max_depth must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_game_constants() {
        let s = EditorSettings::default();
        assert_eq!(s.max_depth, 5);
        assert_eq!(s.standalone_marker_depth, 99);
        assert_eq!(s.game, GameVariant::Galaxy2);
        assert_eq!(s.field_decode, FieldDecodePolicy::ZeroOnMismatch);
    }

    #[test]
    fn json_fills_missing_keys() {
        let s = EditorSettings::from_json(r#"{ "max_depth": 3, "game": "Galaxy1" }"#).unwrap();
        assert_eq!(s.max_depth, 3);
        assert_eq!(s.game, GameVariant::Galaxy1);
        assert_eq!(s.standalone_marker_depth, 99);
    }

    #[test]
    fn zero_depth_is_rejected() {
        let err = EditorSettings::from_json(r#"{ "max_depth": 0 }"#).unwrap_err();
        assert!(matches!(err, StarmapError::InvalidSettings(_)));
    }

    #[test]
    fn variant_kind_subsets() {
        assert!(GameVariant::Galaxy1.supports(ObjectKind::Sound));
        assert!(!GameVariant::Galaxy1.supports(ObjectKind::Changer));
        assert!(GameVariant::Galaxy2.supports(ObjectKind::Changer));
        assert!(!GameVariant::Galaxy2.supports(ObjectKind::Child));
        assert!(GameVariant::Galaxy2.kinds().all(|k| k != ObjectKind::Sound));
    }
}
