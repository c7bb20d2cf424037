//! Level Data Model
//!
//! The galaxy/zone hierarchy the editor works on:
//! - [`Galaxy`]: zone list and scenarios
//! - [`Zone`]: per-layer objects, paths and nested zone placements
//! - [`Scenario`]: per-zone [`LayerMask`] selection for one game mode
//! - [`MapObject`], [`Path`], [`PathPoint`]: identified entities
//!
//! Entities refer back to their zone through a [`ZoneKey`] into the
//! session's zone arena; the zone's buckets own the entity data.

pub mod galaxy;
pub mod layer;
pub mod object;
pub mod path;
pub mod scenario;
pub mod zone;

pub use galaxy::Galaxy;
pub use layer::{LETTERED_LAYER_COUNT, Layer, LayerMask};
pub use object::{MapObject, ObjectKind};
pub use path::{Path, PathPoint};
pub use scenario::Scenario;
pub use zone::{Zone, ZonePlacement};

use slotmap::new_key_type;

new_key_type! {
    pub struct ZoneKey;
}
