//! Canonical footprint of a candidate structure.
//!
//! Placement requests arrive in one of three forms (a single shape, a
//! composite definition, or an explicit cell list). [`Footprint::from_source`]
//! converts any of them once into an anchor-relative list of
//! `(shape, cell)` pairs that the validator consumes.

use crate::geometry::{Bounds3, Point3D, VerticalSpan};
use crate::id::ShapeId;
use crate::shape::ShapeTable;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One cell of a footprint: an anchor-relative offset and a height.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cell {
    pub offset: Point3D,
    pub height: u16,
}

impl Cell {
    pub fn new(offset: Point3D, height: u16) -> Self {
        Self { offset, height }
    }

    /// Flat (floor-like) cells have no vertical extent.
    pub fn is_flat(&self) -> bool {
        self.height == 0
    }

    /// Vertical span of this cell once placed at `anchor`.
    pub fn span_at(&self, anchor: Point3D) -> VerticalSpan {
        VerticalSpan::new(anchor.z + self.offset.z, i32::from(self.height))
    }
}

/// A shape placed at one cell of a footprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FootprintEntry {
    pub shape: ShapeId,
    pub cell: Cell,
}

/// One piece of a composite structure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositePiece {
    pub shape: ShapeId,
    pub offset: Point3D,
}

/// A multi-piece structure definition (walls, floors, decorations...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompositeDefinition {
    pub name: String,
    pub pieces: Vec<CompositePiece>,
}

/// The shapes a placement request can take.
#[derive(Debug, Clone)]
pub enum FootprintSource<'a> {
    /// A single shape at the anchor.
    Single(ShapeId),
    /// A composite structure; non-physical pieces are dropped.
    Composite(&'a CompositeDefinition),
    /// An explicit list of cells, used as given.
    Cells(Vec<FootprintEntry>),
}

/// Errors building a footprint.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FootprintError {
    #[error("footprint has no physical cells")]
    Empty,
    #[error("unknown shape {0:?}")]
    UnknownShape(ShapeId),
}

// ---------------------------------------------------------------------------
// Footprint
// ---------------------------------------------------------------------------

/// A non-empty, anchor-relative list of cells a structure would occupy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<FootprintEntry>", into = "Vec<FootprintEntry>")]
pub struct Footprint {
    entries: Vec<FootprintEntry>,
}

impl Footprint {
    /// Normalize a placement source into a footprint.
    pub fn from_source(
        source: FootprintSource<'_>,
        shapes: &ShapeTable,
    ) -> Result<Self, FootprintError> {
        match source {
            FootprintSource::Single(shape) => {
                let data = shapes.get(shape).ok_or(FootprintError::UnknownShape(shape))?;
                Ok(Self {
                    entries: vec![FootprintEntry {
                        shape,
                        cell: Cell::new(Point3D::ORIGIN, data.height),
                    }],
                })
            }
            FootprintSource::Composite(def) => {
                let mut entries = Vec::with_capacity(def.pieces.len());
                for piece in &def.pieces {
                    let data = shapes
                        .get(piece.shape)
                        .ok_or(FootprintError::UnknownShape(piece.shape))?;
                    if !data.is_physical() {
                        continue;
                    }
                    entries.push(FootprintEntry {
                        shape: piece.shape,
                        cell: Cell::new(piece.offset, data.height),
                    });
                }
                Self::from_entries(entries)
            }
            FootprintSource::Cells(entries) => {
                for entry in &entries {
                    if shapes.get(entry.shape).is_none() {
                        return Err(FootprintError::UnknownShape(entry.shape));
                    }
                }
                Self::from_entries(entries)
            }
        }
    }

    /// Build a footprint directly from entries without consulting a shape
    /// table. Fails only when `entries` is empty.
    pub fn from_entries(entries: Vec<FootprintEntry>) -> Result<Self, FootprintError> {
        if entries.is_empty() {
            return Err(FootprintError::Empty);
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[FootprintEntry] {
        &self.entries
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.entries.iter().map(|e| &e.cell)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false: a footprint holds at least one entry.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Anchor-relative bounding box over all offsets.
    pub fn bounds(&self) -> Bounds3 {
        let mut cells = self.cells();
        // Non-empty by construction.
        let first = cells.next().map(|c| c.offset).unwrap_or_default();
        let mut bounds = Bounds3::point(first);
        for cell in cells {
            bounds.include(cell.offset);
        }
        bounds
    }

    /// Combined vertical span of every cell placed at `anchor`.
    pub fn vertical_span_at(&self, anchor: Point3D) -> VerticalSpan {
        let mut bottom = i32::MAX;
        let mut top = i32::MIN;
        for cell in self.cells() {
            let span = cell.span_at(anchor);
            bottom = bottom.min(span.z);
            top = top.max(span.top());
        }
        VerticalSpan::new(bottom, top - bottom)
    }
}

impl TryFrom<Vec<FootprintEntry>> for Footprint {
    type Error = FootprintError;

    fn try_from(entries: Vec<FootprintEntry>) -> Result<Self, Self::Error> {
        Self::from_entries(entries)
    }
}

impl From<Footprint> for Vec<FootprintEntry> {
    fn from(footprint: Footprint) -> Self {
        footprint.entries
    }
}
