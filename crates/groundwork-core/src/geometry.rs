//! Grid positions, rectangles and vertical spans.
//!
//! The world is a stack of square tiles addressed by integer `(x, y)` with
//! an integer altitude `z`. Horizontal proximity is measured with the
//! Chebyshev (chessboard) metric; vertical occupancy is described by
//! [`VerticalSpan`].

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Point3D
// ---------------------------------------------------------------------------

/// A position (or an anchor-relative offset) in the world.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Point3D {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Point3D {
    pub const ORIGIN: Point3D = Point3D { x: 0, y: 0, z: 0 };

    pub fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// This point translated by `offset` on all three axes.
    pub fn offset(&self, offset: Point3D) -> Point3D {
        Point3D::new(self.x + offset.x, self.y + offset.y, self.z + offset.z)
    }

    /// Chebyshev distance in the horizontal plane, ignoring `z`.
    pub fn chebyshev_distance_2d(&self, other: &Point3D) -> u32 {
        (self.x - other.x)
            .unsigned_abs()
            .max((self.y - other.y).unsigned_abs())
    }
}

// ---------------------------------------------------------------------------
// TileRect
// ---------------------------------------------------------------------------

/// An axis-aligned rectangle of tiles, inclusive on both corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TileRect {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl TileRect {
    /// Build a rectangle from two corners in any order.
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            min_x: x1.min(x2),
            min_y: y1.min(y2),
            max_x: x1.max(x2),
            max_y: y1.max(y2),
        }
    }

    /// A rectangle covering a single tile.
    pub fn tile(x: i32, y: i32) -> Self {
        Self::new(x, y, x, y)
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn width(&self) -> u32 {
        (self.max_x - self.min_x).unsigned_abs() + 1
    }

    pub fn height(&self) -> u32 {
        (self.max_y - self.min_y).unsigned_abs() + 1
    }
}

// ---------------------------------------------------------------------------
// Bounds3
// ---------------------------------------------------------------------------

/// Minimum and maximum corner over all three axes of a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bounds3 {
    pub min: Point3D,
    pub max: Point3D,
}

impl Bounds3 {
    /// Bounds of a single point.
    pub fn point(p: Point3D) -> Self {
        Self { min: p, max: p }
    }

    /// Grow the bounds to include `p`.
    pub fn include(&mut self, p: Point3D) {
        self.min = Point3D::new(self.min.x.min(p.x), self.min.y.min(p.y), self.min.z.min(p.z));
        self.max = Point3D::new(self.max.x.max(p.x), self.max.y.max(p.y), self.max.z.max(p.z));
    }

    /// Number of tiles spanned along x.
    pub fn width(&self) -> u32 {
        (self.max.x - self.min.x).unsigned_abs() + 1
    }

    /// Number of tiles spanned along y.
    pub fn depth(&self) -> u32 {
        (self.max.y - self.min.y).unsigned_abs() + 1
    }
}

// ---------------------------------------------------------------------------
// VerticalSpan
// ---------------------------------------------------------------------------

/// Vertical occupancy at one tile.
///
/// A span with height 0 is *flat*: it sits at a single altitude and has no
/// vertical extent. A span with positive height occupies `[z, z + height)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VerticalSpan {
    pub z: i32,
    pub height: i32,
}

impl VerticalSpan {
    pub fn new(z: i32, height: i32) -> Self {
        Self {
            z,
            height: height.max(0),
        }
    }

    pub fn flat(z: i32) -> Self {
        Self { z, height: 0 }
    }

    pub fn is_flat(&self) -> bool {
        self.height == 0
    }

    /// Altitude of the top of the span (equal to `z` for flat spans).
    pub fn top(&self) -> i32 {
        self.z + self.height
    }

    /// Whether two spans share any altitude.
    ///
    /// Flat vs flat compares altitudes, flat vs tall tests membership in the
    /// half-open tall interval, and tall vs tall intersects the intervals.
    pub fn overlaps(&self, other: &VerticalSpan) -> bool {
        match (self.is_flat(), other.is_flat()) {
            (true, true) => self.z == other.z,
            (true, false) => other.z <= self.z && self.z < other.top(),
            (false, true) => self.z <= other.z && other.z < self.top(),
            (false, false) => self.z < other.top() && other.z < self.top(),
        }
    }
}
