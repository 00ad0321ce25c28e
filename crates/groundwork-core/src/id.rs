use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a dynamic entity (item or mobile) in the world.
    pub struct EntityId;

    /// Identifies an enclosing multi-cell structure (a house).
    pub struct StructureId;

    /// Identifies a floating vessel.
    pub struct VesselId;
}

/// Identifies a shape in the shape table. Cheap to copy and compare.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ShapeId(pub u16);

/// Identifies a world map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MapId(pub u32);

/// Identifies a territory (township).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TerritoryId(pub u32);
