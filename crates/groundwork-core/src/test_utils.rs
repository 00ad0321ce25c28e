//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::footprint::{Cell, CompositeDefinition, CompositePiece, Footprint, FootprintEntry};
use crate::geometry::{Point3D, TileRect};
use crate::id::*;
use crate::shape::{ShapeFlags, ShapeTable, ShapeTableBuilder};
use crate::snapshot::{TerritorySpec, WorldSnapshot};
use crate::world::*;
use std::collections::BTreeSet;

// ===========================================================================
// Shapes
// ===========================================================================

pub fn floor() -> ShapeId {
    ShapeId(0)
}
pub fn wall() -> ShapeId {
    ShapeId(1)
}
pub fn pillar() -> ShapeId {
    ShapeId(2)
}
pub fn banner() -> ShapeId {
    ShapeId(3)
}
pub fn door() -> ShapeId {
    ShapeId(4)
}

/// Shape table whose ids match the helpers above.
pub fn standard_shapes() -> ShapeTable {
    let mut b = ShapeTableBuilder::new();
    let entries = [
        ("floor", 0, ShapeFlags::SURFACE),
        ("wall", 20, ShapeFlags::IMPASSABLE | ShapeFlags::WALL),
        ("pillar", 10, ShapeFlags::IMPASSABLE),
        ("banner", 10, ShapeFlags::NO_COLLISION),
        ("door", 20, ShapeFlags::DOOR),
    ];
    for (name, height, flags) in entries {
        b.register(name, height, flags)
            .expect("standard shape names are unique");
    }
    b.build()
}

// ===========================================================================
// Footprints
// ===========================================================================

/// A single flat cell at the anchor.
pub fn flat_cell() -> Footprint {
    cells(&[(0, 0, 0, 0)])
}

/// A single cell of the given height at the anchor.
pub fn tall_cell(height: u16) -> Footprint {
    cells(&[(0, 0, 0, height)])
}

/// A `w` x `d` block of flat floor cells with the anchor at the north-west
/// corner.
pub fn floor_block(w: i32, d: i32) -> Footprint {
    let mut spec = Vec::new();
    for y in 0..d {
        for x in 0..w {
            spec.push((x, y, 0, 0));
        }
    }
    cells(&spec)
}

/// Footprint from `(x, y, z, height)` tuples, all using the floor shape.
pub fn cells(spec: &[(i32, i32, i32, u16)]) -> Footprint {
    let entries = spec
        .iter()
        .map(|&(x, y, z, height)| FootprintEntry {
            shape: floor(),
            cell: Cell::new(Point3D::new(x, y, z), height),
        })
        .collect();
    Footprint::from_entries(entries).expect("test footprints are non-empty")
}

/// A small hut: a floor, two walls and a decorative banner.
pub fn hut() -> CompositeDefinition {
    let piece = |shape, x, y, z| CompositePiece {
        shape,
        offset: Point3D::new(x, y, z),
    };
    CompositeDefinition {
        name: "hut".to_string(),
        pieces: vec![
            piece(floor(), 0, 0, 0),
            piece(wall(), 1, 0, 0),
            piece(wall(), 0, 1, 0),
            piece(banner(), 1, 1, 10),
        ],
    }
}

// ===========================================================================
// Worlds
// ===========================================================================

pub const TEST_MAP: MapId = MapId(0);
pub const TOWN: TerritoryId = TerritoryId(1);

/// A flat world with one territory covering `(0, 0)..=(199, 199)` whose only
/// member is the returned requester.
pub fn town_world() -> (WorldSnapshot, EntityId) {
    let mut world = WorldSnapshot::new(TEST_MAP);
    let mayor = world.add_entity();
    world.add_territory(
        TOWN,
        TerritorySpec::new(TileRect::new(0, 0, 199, 199)).member(mayor),
    );
    (world, mayor)
}

pub fn blocking_static(z: i32, height: i32) -> StaticTile {
    StaticTile {
        z,
        height,
        surface: false,
        impassable: true,
    }
}

pub fn surface_static(z: i32, height: i32) -> StaticTile {
    StaticTile {
        z,
        height,
        surface: true,
        impassable: false,
    }
}

// ===========================================================================
// Fault injection
// ===========================================================================

/// Wraps a world and fails every tile-level query for selected tiles.
#[derive(Debug)]
pub struct FaultyWorld<W> {
    pub inner: W,
    pub faulty: BTreeSet<(i32, i32)>,
}

impl<W: WorldQuery> FaultyWorld<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            faulty: BTreeSet::new(),
        }
    }

    pub fn fail_at(mut self, x: i32, y: i32) -> Self {
        self.faulty.insert((x, y));
        self
    }

    fn check(&self, x: i32, y: i32) -> Result<(), QueryError> {
        if self.faulty.contains(&(x, y)) {
            Err(QueryError::Backend(format!("injected fault at ({x}, {y})")))
        } else {
            Ok(())
        }
    }
}

impl<W: WorldQuery> WorldQuery for FaultyWorld<W> {
    fn has_map(&self, map: MapId) -> bool {
        self.inner.has_map(map)
    }

    fn terrain(&self, x: i32, y: i32) -> Result<TerrainSample, QueryError> {
        self.check(x, y)?;
        self.inner.terrain(x, y)
    }

    fn statics_at(&self, x: i32, y: i32) -> Result<Vec<StaticTile>, QueryError> {
        self.check(x, y)?;
        self.inner.statics_at(x, y)
    }

    fn items_at(&self, x: i32, y: i32) -> Result<Vec<ItemTile>, QueryError> {
        self.check(x, y)?;
        self.inner.items_at(x, y)
    }

    fn mobiles_at(&self, x: i32, y: i32) -> Result<Vec<MobileTile>, QueryError> {
        self.check(x, y)?;
        self.inner.mobiles_at(x, y)
    }

    fn structure_at(
        &self,
        point: Point3D,
        height: i32,
    ) -> Result<Option<StructureId>, QueryError> {
        self.check(point.x, point.y)?;
        self.inner.structure_at(point, height)
    }

    fn structure_is_staircase(
        &self,
        structure: StructureId,
        point: Point3D,
    ) -> Result<bool, QueryError> {
        self.check(point.x, point.y)?;
        self.inner.structure_is_staircase(structure, point)
    }

    fn structure_owned_by_member(
        &self,
        structure: StructureId,
        territory: TerritoryId,
    ) -> Result<bool, QueryError> {
        self.inner.structure_owned_by_member(structure, territory)
    }

    fn vessel_at(&self, point: Point3D) -> Result<Option<VesselId>, QueryError> {
        self.check(point.x, point.y)?;
        self.inner.vessel_at(point)
    }

    fn territory_at(&self, point: Point3D) -> Result<Option<TerritoryId>, QueryError> {
        self.check(point.x, point.y)?;
        self.inner.territory_at(point)
    }

    fn territory_authorizes(
        &self,
        territory: TerritoryId,
        requester: EntityId,
    ) -> Result<bool, QueryError> {
        self.inner.territory_authorizes(territory, requester)
    }

    fn territory_ownership(&self, territory: TerritoryId) -> Result<OwnershipStatus, QueryError> {
        self.inner.territory_ownership(territory)
    }
}
