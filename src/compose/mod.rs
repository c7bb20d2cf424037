//! Composition Engine
//!
//! Determines which zones are live under a scenario and where they sit:
//! - [`Composer`]: recursive, depth-capped placement walk
//! - [`SubzoneIndex`]: `"{scenario}/{zone}"` → governing placement
//! - [`transform`]: Euler/placement matrix helpers

pub mod resolve;
pub mod subzone;
pub mod transform;

pub use resolve::{Composer, ResolvedZone};
pub use subzone::SubzoneIndex;
