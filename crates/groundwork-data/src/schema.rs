//! Serde data file structs for placement content.
//!
//! These structs define the on-disk format for shapes and composite
//! structures. They are deserialized from RON, JSON, or TOML data files and
//! then resolved into core types by the loader.

use groundwork_core::geometry::Point3D;
use groundwork_core::shape::ShapeFlags;
use serde::Deserialize;

// ===========================================================================
// Shapes
// ===========================================================================

/// A shape definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ShapeDef {
    pub name: String,
    #[serde(default)]
    pub height: u16,
    #[serde(default)]
    pub flags: Vec<ShapeFlagData>,
}

/// One shape flag, spelled in snake case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapeFlagData {
    Surface,
    Impassable,
    NoCollision,
    Wall,
    Door,
}

impl ShapeFlagData {
    pub fn to_flags(self) -> ShapeFlags {
        match self {
            ShapeFlagData::Surface => ShapeFlags::SURFACE,
            ShapeFlagData::Impassable => ShapeFlags::IMPASSABLE,
            ShapeFlagData::NoCollision => ShapeFlags::NO_COLLISION,
            ShapeFlagData::Wall => ShapeFlags::WALL,
            ShapeFlagData::Door => ShapeFlags::DOOR,
        }
    }
}

impl ShapeDef {
    /// Union of all listed flags.
    pub fn flag_set(&self) -> ShapeFlags {
        self.flags
            .iter()
            .fold(ShapeFlags::empty(), |acc, f| acc | f.to_flags())
    }
}

// ===========================================================================
// Composites
// ===========================================================================

/// A composite piece, supporting both short tuple form and full form.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum PieceData {
    /// Short form: `("shape_name", x, y, z)`.
    Short(String, i32, i32, i32),
    /// Full form with named fields; omitted offsets are zero.
    Full {
        shape: String,
        #[serde(default)]
        x: i32,
        #[serde(default)]
        y: i32,
        #[serde(default)]
        z: i32,
    },
}

impl PieceData {
    pub fn shape(&self) -> &str {
        match self {
            PieceData::Short(shape, ..) | PieceData::Full { shape, .. } => shape,
        }
    }

    pub fn offset(&self) -> Point3D {
        match *self {
            PieceData::Short(_, x, y, z) | PieceData::Full { x, y, z, .. } => {
                Point3D::new(x, y, z)
            }
        }
    }
}

/// A composite structure definition in a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct CompositeDef {
    pub name: String,
    pub pieces: Vec<PieceData>,
}

// ===========================================================================
// Tests
// ===========================================================================
