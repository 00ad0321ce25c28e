//! In-memory world implementing [`WorldQuery`].
//!
//! [`WorldSnapshot`] holds a frozen copy of everything placement cares
//! about: terrain, statics, items, mobiles, structures, vessels and
//! territories. Hosts can fill one from their live state before validating
//! a batch of requests, and tests use it as the reference world.

use crate::geometry::{Point3D, TileRect, VerticalSpan};
use crate::id::{EntityId, MapId, StructureId, TerritoryId, VesselId};
use crate::world::{
    ItemRole, ItemTile, MobileTile, OwnershipStatus, QueryError, StaticTile, TerrainSample,
    WorldQuery,
};
use slotmap::SlotMap;
use std::collections::{BTreeMap, BTreeSet};

// ---------------------------------------------------------------------------
// Specs
// ---------------------------------------------------------------------------

/// Description of an item to drop into the snapshot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ItemSpec {
    pub z: i32,
    pub height: i32,
    pub surface: bool,
    pub impassable: bool,
    pub stationary: bool,
    pub role: ItemRole,
}

impl ItemSpec {
    pub fn new(z: i32, height: i32) -> Self {
        Self {
            z,
            height,
            ..Default::default()
        }
    }

    pub fn surface(mut self) -> Self {
        self.surface = true;
        self
    }

    pub fn impassable(mut self) -> Self {
        self.impassable = true;
        self
    }

    pub fn stationary(mut self) -> Self {
        self.stationary = true;
        self
    }

    pub fn role(mut self, role: ItemRole) -> Self {
        self.role = role;
        self
    }
}

/// Description of an enclosing structure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureSpec {
    pub area: TileRect,
    /// Lowest altitude inside the structure.
    pub bottom: i32,
    /// Altitude of the roof (exclusive).
    pub top: i32,
    pub staircases: BTreeSet<(i32, i32)>,
    /// Territory whose member owns the structure.
    pub owner: Option<TerritoryId>,
}

impl StructureSpec {
    pub fn new(area: TileRect, bottom: i32, top: i32) -> Self {
        Self {
            area,
            bottom,
            top,
            staircases: BTreeSet::new(),
            owner: None,
        }
    }

    pub fn staircase(mut self, x: i32, y: i32) -> Self {
        self.staircases.insert((x, y));
        self
    }

    pub fn owned_by(mut self, territory: TerritoryId) -> Self {
        self.owner = Some(territory);
        self
    }

    fn span(&self) -> VerticalSpan {
        VerticalSpan::new(self.bottom, self.top - self.bottom)
    }
}

/// Description of a territory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TerritorySpec {
    pub areas: Vec<TileRect>,
    pub members: BTreeSet<EntityId>,
    pub ownership: OwnershipStatus,
}

impl TerritorySpec {
    pub fn new(area: TileRect) -> Self {
        Self {
            areas: vec![area],
            ..Default::default()
        }
    }

    pub fn area(mut self, area: TileRect) -> Self {
        self.areas.push(area);
        self
    }

    pub fn member(mut self, entity: EntityId) -> Self {
        self.members.insert(entity);
        self
    }

    pub fn ownership(mut self, ownership: OwnershipStatus) -> Self {
        self.ownership = ownership;
        self
    }

    fn contains(&self, x: i32, y: i32) -> bool {
        self.areas.iter().any(|a| a.contains(x, y))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EntityRecord {
    /// Known to the world but not standing on any tile.
    Detached,
    Item { x: i32, y: i32, tile: ItemTile },
    Mobile { x: i32, y: i32, tile: MobileTile },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct VesselRecord {
    area: TileRect,
    span: VerticalSpan,
}

// ---------------------------------------------------------------------------
// WorldSnapshot
// ---------------------------------------------------------------------------

/// A frozen, in-memory world.
///
/// Tiles without explicit terrain use the snapshot's default terrain (flat,
/// passable ground at z 0 unless changed).
#[derive(Debug, Clone)]
pub struct WorldSnapshot {
    maps: BTreeSet<MapId>,
    default_terrain: TerrainSample,
    terrain: BTreeMap<(i32, i32), TerrainSample>,
    statics: BTreeMap<(i32, i32), Vec<StaticTile>>,
    entities: SlotMap<EntityId, EntityRecord>,
    tiles: BTreeMap<(i32, i32), Vec<EntityId>>,
    structures: SlotMap<StructureId, StructureSpec>,
    vessels: SlotMap<VesselId, VesselRecord>,
    territories: BTreeMap<TerritoryId, TerritorySpec>,
}

impl WorldSnapshot {
    /// An empty world containing a single map.
    pub fn new(map: MapId) -> Self {
        Self {
            maps: BTreeSet::from([map]),
            default_terrain: TerrainSample::flat(0),
            terrain: BTreeMap::new(),
            statics: BTreeMap::new(),
            entities: SlotMap::with_key(),
            tiles: BTreeMap::new(),
            structures: SlotMap::with_key(),
            vessels: SlotMap::with_key(),
            territories: BTreeMap::new(),
        }
    }

    pub fn add_map(&mut self, map: MapId) {
        self.maps.insert(map);
    }

    // -- Terrain and statics --

    pub fn set_default_terrain(&mut self, sample: TerrainSample) {
        self.default_terrain = sample;
    }

    pub fn set_terrain(&mut self, x: i32, y: i32, sample: TerrainSample) {
        self.terrain.insert((x, y), sample);
    }

    /// Set the terrain of every tile in `rect`.
    pub fn fill_terrain(&mut self, rect: TileRect, sample: TerrainSample) {
        for y in rect.min_y..=rect.max_y {
            for x in rect.min_x..=rect.max_x {
                self.terrain.insert((x, y), sample);
            }
        }
    }

    pub fn add_static(&mut self, x: i32, y: i32, tile: StaticTile) {
        self.statics.entry((x, y)).or_default().push(tile);
    }

    // -- Entities --

    /// Register an entity that is not standing on any tile (an off-screen
    /// requester, for example).
    pub fn add_entity(&mut self) -> EntityId {
        self.entities.insert(EntityRecord::Detached)
    }

    pub fn add_item(&mut self, x: i32, y: i32, spec: ItemSpec) -> EntityId {
        let id = self.entities.insert_with_key(|entity| EntityRecord::Item {
            x,
            y,
            tile: ItemTile {
                entity,
                z: spec.z,
                height: spec.height,
                surface: spec.surface,
                impassable: spec.impassable,
                stationary: spec.stationary,
                role: spec.role,
            },
        });
        self.tiles.entry((x, y)).or_default().push(id);
        id
    }

    pub fn add_mobile(
        &mut self,
        x: i32,
        y: i32,
        z: i32,
        hidden: bool,
        privileged: bool,
    ) -> EntityId {
        let id = self.entities.insert_with_key(|entity| EntityRecord::Mobile {
            x,
            y,
            tile: MobileTile {
                entity,
                z,
                hidden,
                privileged,
            },
        });
        self.tiles.entry((x, y)).or_default().push(id);
        id
    }

    /// Remove an entity. Returns false if it was not present.
    pub fn remove_entity(&mut self, id: EntityId) -> bool {
        let Some(record) = self.entities.remove(id) else {
            return false;
        };
        let pos = match record {
            EntityRecord::Detached => None,
            EntityRecord::Item { x, y, .. } | EntityRecord::Mobile { x, y, .. } => Some((x, y)),
        };
        if let Some(pos) = pos {
            if let Some(list) = self.tiles.get_mut(&pos) {
                list.retain(|&e| e != id);
                if list.is_empty() {
                    self.tiles.remove(&pos);
                }
            }
        }
        true
    }

    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // -- Structures, vessels, territories --

    pub fn add_structure(&mut self, spec: StructureSpec) -> StructureId {
        self.structures.insert(spec)
    }

    pub fn add_vessel(&mut self, area: TileRect, z: i32, height: i32) -> VesselId {
        self.vessels.insert(VesselRecord {
            area,
            span: VerticalSpan::new(z, height),
        })
    }

    /// Insert or replace a territory.
    pub fn add_territory(&mut self, id: TerritoryId, spec: TerritorySpec) {
        self.territories.insert(id, spec);
    }

    /// Add a member to an existing territory. Returns false if the territory
    /// is unknown.
    pub fn add_member(&mut self, territory: TerritoryId, entity: EntityId) -> bool {
        match self.territories.get_mut(&territory) {
            Some(spec) => {
                spec.members.insert(entity);
                true
            }
            None => false,
        }
    }

    fn territory(&self, id: TerritoryId) -> Result<&TerritorySpec, QueryError> {
        self.territories
            .get(&id)
            .ok_or(QueryError::UnknownTerritory(id))
    }

    fn structure(&self, id: StructureId) -> Result<&StructureSpec, QueryError> {
        self.structures.get(id).ok_or(QueryError::UnknownStructure)
    }

    fn entities_on(&self, x: i32, y: i32) -> impl Iterator<Item = &EntityRecord> {
        self.tiles
            .get(&(x, y))
            .into_iter()
            .flatten()
            .filter_map(|&id| self.entities.get(id))
    }
}

impl WorldQuery for WorldSnapshot {
    fn has_map(&self, map: MapId) -> bool {
        self.maps.contains(&map)
    }

    fn terrain(&self, x: i32, y: i32) -> Result<TerrainSample, QueryError> {
        Ok(self
            .terrain
            .get(&(x, y))
            .copied()
            .unwrap_or(self.default_terrain))
    }

    fn statics_at(&self, x: i32, y: i32) -> Result<Vec<StaticTile>, QueryError> {
        Ok(self.statics.get(&(x, y)).cloned().unwrap_or_default())
    }

    fn items_at(&self, x: i32, y: i32) -> Result<Vec<ItemTile>, QueryError> {
        Ok(self
            .entities_on(x, y)
            .filter_map(|record| match record {
                EntityRecord::Item { tile, .. } => Some(*tile),
                _ => None,
            })
            .collect())
    }

    fn mobiles_at(&self, x: i32, y: i32) -> Result<Vec<MobileTile>, QueryError> {
        Ok(self
            .entities_on(x, y)
            .filter_map(|record| match record {
                EntityRecord::Mobile { tile, .. } => Some(*tile),
                _ => None,
            })
            .collect())
    }

    fn structure_at(
        &self,
        point: Point3D,
        height: i32,
    ) -> Result<Option<StructureId>, QueryError> {
        let body = VerticalSpan::new(point.z, height);
        Ok(self
            .structures
            .iter()
            .find(|(_, s)| s.area.contains(point.x, point.y) && s.span().overlaps(&body))
            .map(|(id, _)| id))
    }

    fn structure_is_staircase(
        &self,
        structure: StructureId,
        point: Point3D,
    ) -> Result<bool, QueryError> {
        Ok(self
            .structure(structure)?
            .staircases
            .contains(&(point.x, point.y)))
    }

    fn structure_owned_by_member(
        &self,
        structure: StructureId,
        territory: TerritoryId,
    ) -> Result<bool, QueryError> {
        Ok(self.structure(structure)?.owner == Some(territory))
    }

    fn vessel_at(&self, point: Point3D) -> Result<Option<VesselId>, QueryError> {
        let probe = VerticalSpan::flat(point.z);
        Ok(self
            .vessels
            .iter()
            .find(|(_, v)| v.area.contains(point.x, point.y) && v.span.overlaps(&probe))
            .map(|(id, _)| id))
    }

    fn territory_at(&self, point: Point3D) -> Result<Option<TerritoryId>, QueryError> {
        Ok(self
            .territories
            .iter()
            .find(|(_, t)| t.contains(point.x, point.y))
            .map(|(&id, _)| id))
    }

    fn territory_authorizes(
        &self,
        territory: TerritoryId,
        requester: EntityId,
    ) -> Result<bool, QueryError> {
        Ok(self.territory(territory)?.members.contains(&requester))
    }

    fn territory_ownership(&self, territory: TerritoryId) -> Result<OwnershipStatus, QueryError> {
        Ok(self.territory(territory)?.ownership)
    }
}
