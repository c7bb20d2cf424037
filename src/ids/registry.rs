//! Identity Registry
//!
//! Allocates and retires galaxy-wide [`Identity`] values and resolves them
//! to the entity they name.
//!
//! # Allocation
//!
//! Objects, paths and path points share one integer space. [`allocate`]
//! always returns the smallest non-negative integer not currently in use,
//! so the space stays dense after deletions:
//!
//! - Released identities below the high-water mark are kept in an ordered
//!   hole set; the smallest hole is handed out first.
//! - With no holes, allocation appends at the high-water mark.
//!
//! # Invariant Violations
//!
//! Registering an occupied identity, unregistering an absent one, and
//! running out of identities are programmer errors and panic. The checked
//! [`try_register`] / [`try_unregister`] variants report the same conditions
//! as [`RegistryError`] for callers that want to inspect them.
//!
//! [`allocate`]: IdentityRegistry::allocate
//! [`try_register`]: IdentityRegistry::try_register
//! [`try_unregister`]: IdentityRegistry::try_unregister

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::ids::{EntityKind, EntityRef, Identity};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Identity {0} is already registered")]
    IdentityConflict(Identity),

    #[error("Identity {0} is not registered")]
    NotRegistered(Identity),

    #[error("Identity {identity} was reserved for {reserved:?}, registered as {registered:?}")]
    KindMismatch {
        identity: Identity,
        reserved: EntityKind,
        registered: EntityKind,
    },
}

#[derive(Debug, Clone, Copy)]
enum Slot {
    /// Handed out by `allocate`, not yet registered.
    Reserved(EntityKind),
    Live(EntityRef),
}

#[derive(Debug, Default)]
pub struct IdentityRegistry {
    slots: FxHashMap<Identity, Slot>,
    /// Free identities below `high_water`.
    holes: BTreeSet<u32>,
    /// One past the largest identity ever handed out or registered.
    high_water: u32,
}

impl IdentityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves and returns the smallest unused identity.
    ///
    /// The identity stays reserved for `kind` until [`register`](Self::register)
    /// or [`unregister`](Self::unregister) is called with it.
    pub fn allocate(&mut self, kind: EntityKind) -> Identity {
        let id = if let Some(hole) = self.holes.pop_first() {
            hole
        } else {
            let id = self.high_water;
            let Some(next) = self.high_water.checked_add(1) else {
                panic!("identity space exhausted");
            };
            self.high_water = next;
            id
        };

        let identity = Identity(id);
        self.slots.insert(identity, Slot::Reserved(kind));
        identity
    }

    /// Records that `identity` names `entity`.
    ///
    /// # Panics
    ///
    /// If the identity is already live, or was reserved for another kind.
    pub fn register(&mut self, identity: Identity, entity: EntityRef) {
        if let Err(err) = self.try_register(identity, entity) {
            panic!("identity registry invariant violated: {err}");
        }
    }

    pub fn try_register(&mut self, identity: Identity, entity: EntityRef) -> Result<(), RegistryError> {
        match self.slots.get(&identity) {
            Some(Slot::Live(_)) => return Err(RegistryError::IdentityConflict(identity)),
            Some(Slot::Reserved(kind)) if *kind != entity.kind() => {
                return Err(RegistryError::KindMismatch {
                    identity,
                    reserved: *kind,
                    registered: entity.kind(),
                });
            }
            Some(Slot::Reserved(_)) => {}
            None => self.claim(identity.0),
        }

        self.slots.insert(identity, Slot::Live(entity));
        Ok(())
    }

    /// Marks an identity that was never allocated as in use.
    fn claim(&mut self, id: u32) {
        if id < self.high_water {
            self.holes.remove(&id);
        } else {
            self.holes.extend(self.high_water..id);
            let Some(next) = id.checked_add(1) else {
                panic!("identity space exhausted");
            };
            self.high_water = next;
        }
    }

    /// Releases an identity (live or merely reserved) for reuse.
    ///
    /// # Panics
    ///
    /// If the identity is neither live nor reserved.
    pub fn unregister(&mut self, identity: Identity) -> Option<EntityRef> {
        match self.try_unregister(identity) {
            Ok(entity) => entity,
            Err(err) => panic!("identity registry invariant violated: {err}"),
        }
    }

    /// Returns the released entity, or `None` if the identity was only reserved.
    pub fn try_unregister(&mut self, identity: Identity) -> Result<Option<EntityRef>, RegistryError> {
        let slot = self
            .slots
            .remove(&identity)
            .ok_or(RegistryError::NotRegistered(identity))?;
        self.holes.insert(identity.0);

        Ok(match slot {
            Slot::Live(entity) => Some(entity),
            Slot::Reserved(_) => None,
        })
    }

    /// Repoints a live identity at a new location, keeping the identity.
    pub fn relocate(&mut self, identity: Identity, entity: EntityRef) -> Result<(), RegistryError> {
        match self.slots.get_mut(&identity) {
            Some(Slot::Live(old)) => {
                *old = entity;
                Ok(())
            }
            _ => Err(RegistryError::NotRegistered(identity)),
        }
    }

    #[must_use]
    pub fn lookup(&self, identity: Identity) -> Option<EntityRef> {
        match self.slots.get(&identity) {
            Some(Slot::Live(entity)) => Some(*entity),
            _ => None,
        }
    }

    #[must_use]
    pub fn contains(&self, identity: Identity) -> bool {
        self.lookup(identity).is_some()
    }

    /// Number of live identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.values().filter(|s| matches!(s, Slot::Live(_))).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn high_water_mark(&self) -> u32 {
        self.high_water
    }

    /// Live identities in ascending order.
    #[must_use]
    pub fn identities(&self) -> Vec<Identity> {
        let mut ids: Vec<Identity> = self
            .slots
            .iter()
            .filter(|(_, s)| matches!(s, Slot::Live(_)))
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Drops every entry and resets allocation to zero.
    pub fn clear(&mut self) {
        self.slots.clear();
        self.holes.clear();
        self.high_water = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::ZoneKey;
    use slotmap::SlotMap;

    fn zone_key() -> ZoneKey {
        let mut map: SlotMap<ZoneKey, ()> = SlotMap::with_key();
        map.insert(())
    }

    fn alloc_object(reg: &mut IdentityRegistry, zone: ZoneKey) -> Identity {
        let id = reg.allocate(EntityKind::Object);
        reg.register(id, EntityRef::Object { zone });
        id
    }

    #[test]
    fn allocates_densely_from_zero() {
        let zone = zone_key();
        let mut reg = IdentityRegistry::new();
        let ids: Vec<u32> = (0..4).map(|_| alloc_object(&mut reg, zone).0).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
        assert_eq!(reg.high_water_mark(), 4);
    }

    #[test]
    fn reuses_smallest_hole() {
        let zone = zone_key();
        let mut reg = IdentityRegistry::new();
        for _ in 0..5 {
            alloc_object(&mut reg, zone);
        }
        reg.unregister(Identity(3));
        reg.unregister(Identity(1));
        assert_eq!(alloc_object(&mut reg, zone), Identity(1));
        assert_eq!(alloc_object(&mut reg, zone), Identity(3));
        assert_eq!(alloc_object(&mut reg, zone), Identity(5));
    }

    #[test]
    fn released_maximum_is_reused() {
        let zone = zone_key();
        let mut reg = IdentityRegistry::new();
        for _ in 0..3 {
            alloc_object(&mut reg, zone);
        }
        reg.unregister(Identity(2));
        assert_eq!(reg.allocate(EntityKind::Object), Identity(2));
        // High-water mark never moves backwards.
        assert_eq!(reg.high_water_mark(), 3);
    }

    #[test]
    fn reserved_identity_is_not_handed_out_twice() {
        let mut reg = IdentityRegistry::new();
        let a = reg.allocate(EntityKind::Path);
        let b = reg.allocate(EntityKind::PathPoint);
        assert_ne!(a, b);
        assert!(reg.lookup(a).is_none());
    }

    #[test]
    fn explicit_register_leaves_holes_below() {
        let zone = zone_key();
        let mut reg = IdentityRegistry::new();
        reg.register(Identity(3), EntityRef::Object { zone });
        assert_eq!(alloc_object(&mut reg, zone), Identity(0));
        assert_eq!(alloc_object(&mut reg, zone), Identity(1));
        assert_eq!(alloc_object(&mut reg, zone), Identity(2));
        assert_eq!(alloc_object(&mut reg, zone), Identity(4));
    }

    #[test]
    fn double_register_is_a_conflict() {
        let zone = zone_key();
        let mut reg = IdentityRegistry::new();
        let id = alloc_object(&mut reg, zone);
        assert_eq!(
            reg.try_register(id, EntityRef::Path { zone }),
            Err(RegistryError::IdentityConflict(id))
        );
    }

    #[test]
    #[should_panic(expected = "invariant violated")]
    fn double_register_panics() {
        let zone = zone_key();
        let mut reg = IdentityRegistry::new();
        let id = alloc_object(&mut reg, zone);
        reg.register(id, EntityRef::Object { zone });
    }

    #[test]
    fn unregister_absent_is_reported() {
        let mut reg = IdentityRegistry::new();
        assert_eq!(
            reg.try_unregister(Identity(7)),
            Err(RegistryError::NotRegistered(Identity(7)))
        );
    }

    #[test]
    fn reserved_kind_must_match() {
        let zone = zone_key();
        let mut reg = IdentityRegistry::new();
        let id = reg.allocate(EntityKind::Path);
        assert!(matches!(
            reg.try_register(id, EntityRef::Object { zone }),
            Err(RegistryError::KindMismatch { .. })
        ));
    }

    #[test]
    fn identities_stay_unique_under_churn() {
        let zone = zone_key();
        let mut reg = IdentityRegistry::new();
        let mut live = Vec::new();
        for step in 0u32..200 {
            if step % 3 == 2 && !live.is_empty() {
                let victim = live.remove((step as usize * 7) % live.len());
                reg.unregister(victim);
            } else {
                let id = alloc_object(&mut reg, zone);
                assert!(!live.contains(&id));
                live.push(id);
            }
            let mut sorted = live.clone();
            sorted.sort_unstable();
            assert_eq!(reg.identities(), sorted);
        }
    }
}
