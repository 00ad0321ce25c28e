use crate::id::ShapeId;
use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

bitflags! {
    /// Physical properties of a shape.
    ///
    /// Footprint resolution reads only `NO_COLLISION`. The other flags are
    /// carried through the table for hosts that build their world records
    /// from the same shape data; the validator itself takes obstacle
    /// properties from [`WorldQuery`](crate::world::WorldQuery) records.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct ShapeFlags: u8 {
        /// Something can stand or be built on top of this shape.
        const SURFACE      = 0b0000_0001;
        /// Nothing can pass through this shape.
        const IMPASSABLE   = 0b0000_0010;
        /// Decorative piece with no collision footprint.
        const NO_COLLISION = 0b0000_0100;
        const WALL         = 0b0000_1000;
        const DOOR         = 0b0001_0000;
    }
}

/// A shape definition: the per-cell height and physical flags of one tile
/// graphic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeData {
    pub name: String,
    pub height: u16,
    pub flags: ShapeFlags,
}

impl ShapeData {
    /// Whether the shape contributes cells to a footprint.
    pub fn is_physical(&self) -> bool {
        !self.flags.contains(ShapeFlags::NO_COLLISION)
    }
}

/// Builder for an immutable [`ShapeTable`].
/// Two-phase lifecycle: registration -> finalization.
#[derive(Debug, Default)]
pub struct ShapeTableBuilder {
    shapes: Vec<ShapeData>,
    name_to_id: HashMap<String, ShapeId>,
}

impl ShapeTableBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a shape. Returns its ID.
    pub fn register(
        &mut self,
        name: &str,
        height: u16,
        flags: ShapeFlags,
    ) -> Result<ShapeId, ShapeTableError> {
        if self.name_to_id.contains_key(name) {
            return Err(ShapeTableError::DuplicateName(name.to_string()));
        }
        let raw = u16::try_from(self.shapes.len()).map_err(|_| ShapeTableError::Full)?;
        let id = ShapeId(raw);
        self.shapes.push(ShapeData {
            name: name.to_string(),
            height,
            flags,
        });
        self.name_to_id.insert(name.to_string(), id);
        Ok(id)
    }

    /// Finalize and build the immutable table.
    pub fn build(self) -> ShapeTable {
        ShapeTable {
            shapes: self.shapes,
            name_to_id: self.name_to_id,
        }
    }
}

/// Immutable shape table. Frozen after build(). Thread-safe to share.
#[derive(Debug, Clone, Default)]
pub struct ShapeTable {
    shapes: Vec<ShapeData>,
    name_to_id: HashMap<String, ShapeId>,
}

impl ShapeTable {
    pub fn get(&self, id: ShapeId) -> Option<&ShapeData> {
        self.shapes.get(id.0 as usize)
    }

    pub fn shape_id(&self, name: &str) -> Option<ShapeId> {
        self.name_to_id.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ShapeTableError {
    #[error("duplicate shape name: {0}")]
    DuplicateName(String),
    #[error("shape table is full")]
    Full,
}
