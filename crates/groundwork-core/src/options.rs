use crate::id::EntityId;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

bitflags! {
    /// Rule categories a caller can switch on for one validation.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct RuleFlags: u8 {
        /// Skip the territory ownership-percentage check.
        const IGNORE_OWNERSHIP_PERCENTAGE = 0b0000_0001;
        /// Permit placement fully inside an enclosing structure.
        const ALLOW_INSIDE_STRUCTURE      = 0b0000_0010;
        /// The requester never blocks its own placement.
        const IGNORE_REQUESTER            = 0b0000_0100;
        /// Reject a flat piece laid over an identical existing floor.
        const CHECK_DUPLICATE_FLOOR       = 0b0000_1000;
        /// The anchor must sit exactly on natural terrain.
        const NEEDS_GROUND_LEVEL          = 0b0001_0000;
        /// Flat cells need a walkable surface directly beneath.
        const NEEDS_SURFACE               = 0b0010_0000;
    }
}

/// Rule selection for a single validation call.
///
/// Built fresh by the caller for every request and passed by reference; the
/// validator never keeps or mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationOptions {
    pub flags: RuleFlags,
    /// Chebyshev radius around the footprint that must be free of blocking
    /// geometry.
    pub clearance: u16,
    /// Entities ignored by every collision test.
    pub excluded: BTreeSet<EntityId>,
}

impl ValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_flags(mut self, flags: RuleFlags) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_clearance(mut self, clearance: u16) -> Self {
        self.clearance = clearance;
        self
    }

    pub fn exclude(mut self, entity: EntityId) -> Self {
        self.excluded.insert(entity);
        self
    }

    pub fn has(&self, flag: RuleFlags) -> bool {
        self.flags.contains(flag)
    }

    pub fn is_excluded(&self, entity: EntityId) -> bool {
        self.excluded.contains(&entity)
    }
}
