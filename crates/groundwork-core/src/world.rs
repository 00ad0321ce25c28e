//! Read-only world queries the placement validator depends on.
//!
//! A host server implements [`WorldQuery`] over its own map data.
//! [`crate::snapshot::WorldSnapshot`] is a self-contained in-memory
//! implementation. Every query can fail with a [`QueryError`]; the validator
//! treats any such failure as a denied placement.

use crate::geometry::{Point3D, VerticalSpan};
use crate::id::{EntityId, MapId, StructureId, TerritoryId, VesselId};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Natural terrain at one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainSample {
    /// Lowest corner altitude.
    pub low: i32,
    /// Average altitude: the natural ground height.
    pub avg: i32,
    /// Highest corner altitude.
    pub high: i32,
    pub impassable: bool,
}

impl TerrainSample {
    /// Flat, passable ground at `z`.
    pub fn flat(z: i32) -> Self {
        Self {
            low: z,
            avg: z,
            high: z,
            impassable: false,
        }
    }

    /// Vertical extent of the terrain body, `[low, high + 1)`.
    pub fn span(&self) -> VerticalSpan {
        VerticalSpan::new(self.low, self.high - self.low + 1)
    }

    /// Whether something placed at `z` stands directly on this terrain.
    pub fn is_walkable_at(&self, z: i32) -> bool {
        !self.impassable && self.avg == z
    }
}

/// A piece of static (map-baked) geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaticTile {
    pub z: i32,
    pub height: i32,
    pub surface: bool,
    pub impassable: bool,
}

impl StaticTile {
    pub fn span(&self) -> VerticalSpan {
        VerticalSpan::new(self.z, self.height)
    }
}

/// What a dynamic item is, as far as placement cares.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemRole {
    #[default]
    Plain,
    Wall,
    Door,
    /// Teleporters, moongates and other interactive travel pads.
    Teleporter,
}

/// A dynamic item lying on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemTile {
    pub entity: EntityId,
    pub z: i32,
    pub height: i32,
    pub surface: bool,
    pub impassable: bool,
    /// Locked down / not movable.
    pub stationary: bool,
    pub role: ItemRole,
}

impl ItemTile {
    pub fn span(&self) -> VerticalSpan {
        VerticalSpan::new(self.z, self.height)
    }
}

/// A mobile (player or creature) standing on a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobileTile {
    pub entity: EntityId,
    pub z: i32,
    pub hidden: bool,
    /// Staff-level privilege.
    pub privileged: bool,
}

impl MobileTile {
    /// Hidden staff never block placement; everyone else does.
    pub fn blocks_placement(&self) -> bool {
        !(self.hidden && self.privileged)
    }
}

/// Ownership figures a territory uses for its housing-percentage rule.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipStatus {
    /// Required share of structures owned by members, in percent. `None`
    /// disables the rule for this territory.
    pub required_percent: Option<u8>,
    pub member_owned: u32,
    pub total: u32,
}

impl OwnershipStatus {
    /// Whether the configured threshold (if any) is met.
    pub fn is_satisfied(&self) -> bool {
        match self.required_percent {
            None => true,
            Some(_) if self.total == 0 => true,
            Some(pct) => {
                u64::from(self.member_owned) * 100 >= u64::from(pct) * u64::from(self.total)
            }
        }
    }
}

/// Errors raised by a world adapter.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    #[error("tile ({x}, {y}) is not loaded")]
    Unloaded { x: i32, y: i32 },
    #[error("unknown structure")]
    UnknownStructure,
    #[error("unknown territory {0:?}")]
    UnknownTerritory(TerritoryId),
    #[error("world adapter fault: {0}")]
    Backend(String),
}

// ---------------------------------------------------------------------------
// WorldQuery
// ---------------------------------------------------------------------------

/// Read-only view of one world used during placement validation.
///
/// Implementations must be side-effect free: the validator may call any
/// query any number of times, in any order.
pub trait WorldQuery {
    /// Whether `map` refers to a live map.
    fn has_map(&self, map: MapId) -> bool;

    fn terrain(&self, x: i32, y: i32) -> Result<TerrainSample, QueryError>;

    fn statics_at(&self, x: i32, y: i32) -> Result<Vec<StaticTile>, QueryError>;

    fn items_at(&self, x: i32, y: i32) -> Result<Vec<ItemTile>, QueryError>;

    fn mobiles_at(&self, x: i32, y: i32) -> Result<Vec<MobileTile>, QueryError>;

    /// The structure enclosing a body of `height` standing at `point`, if any.
    fn structure_at(&self, point: Point3D, height: i32)
    -> Result<Option<StructureId>, QueryError>;

    fn structure_is_staircase(
        &self,
        structure: StructureId,
        point: Point3D,
    ) -> Result<bool, QueryError>;

    /// Whether `structure` is owned by a member of `territory`.
    fn structure_owned_by_member(
        &self,
        structure: StructureId,
        territory: TerritoryId,
    ) -> Result<bool, QueryError>;

    fn vessel_at(&self, point: Point3D) -> Result<Option<VesselId>, QueryError>;

    fn territory_at(&self, point: Point3D) -> Result<Option<TerritoryId>, QueryError>;

    /// Whether `requester` may build inside `territory`.
    fn territory_authorizes(
        &self,
        territory: TerritoryId,
        requester: EntityId,
    ) -> Result<bool, QueryError>;

    fn territory_ownership(&self, territory: TerritoryId)
    -> Result<OwnershipStatus, QueryError>;
}
