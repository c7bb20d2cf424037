//! Entity identity: galaxy-wide identifiers and the registry that owns them.

pub mod identity;
pub mod registry;

pub use identity::{EntityKind, EntityRef, Identity};
pub use registry::{IdentityRegistry, RegistryError};
