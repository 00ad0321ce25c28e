//! Chebyshev distance transform over a small square grid.
//!
//! A [`DistanceBuffer`] is reset to the far sentinel, seeded with zeros at
//! footprint cells, and relaxed with [`chebyshev_transform`]. Afterwards
//! every cell reachable from a seed holds `max(|dx|, |dy|)` to the nearest
//! seed. [`DistanceGrid`] ties a transformed buffer to world coordinates
//! for one footprint at one anchor.

use crate::pool::{DistanceBufferPool, PooledBuffer};
use groundwork_core::footprint::Footprint;
use groundwork_core::geometry::Point3D;

/// Value a cell holds before relaxation, and afterwards when no seed
/// reaches it.
pub const FAR: u16 = 1;

const UNREACHED: u16 = u16::MAX;

// ---------------------------------------------------------------------------
// DistanceBuffer
// ---------------------------------------------------------------------------

/// Square grid of `u16` distances, row-major.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DistanceBuffer {
    side: usize,
    cells: Vec<u16>,
}

impl DistanceBuffer {
    /// A `side` x `side` buffer filled with [`FAR`].
    pub fn new(side: usize) -> Self {
        Self {
            side,
            cells: vec![FAR; side * side],
        }
    }

    pub fn side(&self) -> usize {
        self.side
    }

    /// Fill every cell with [`FAR`], keeping the allocation.
    pub fn reset(&mut self) {
        self.cells.clear();
        self.cells.resize(self.side * self.side, FAR);
    }

    /// Mark `(x, y)` as a seed. Returns false when out of range.
    pub fn seed(&mut self, x: i32, y: i32) -> bool {
        match self.index(x, y) {
            Some(i) => {
                self.cells[i] = 0;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, x: i32, y: i32) -> Option<u16> {
        self.index(x, y).map(|i| self.cells[i])
    }

    /// Number of seeded (zero-distance) cells.
    pub fn seed_count(&self) -> usize {
        self.cells.iter().filter(|&&d| d == 0).count()
    }

    /// Row-major `(x, y, distance)` triples.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, u16)> + '_ {
        let side = self.side;
        self.cells
            .iter()
            .enumerate()
            .map(move |(i, &d)| (i % side, i / side, d))
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let x = usize::try_from(x).ok()?;
        let y = usize::try_from(y).ok()?;
        if x < self.side && y < self.side {
            Some(y * self.side + x)
        } else {
            None
        }
    }
}

// ---------------------------------------------------------------------------
// Transform
// ---------------------------------------------------------------------------

/// Relax a seeded buffer into exact Chebyshev distances.
///
/// Zero cells are seeds; every other value is treated as unknown. A forward
/// raster pass pulls from the west, north-west, north and north-east
/// neighbours, a backward pass from the east, south-east, south and
/// south-west ones. With unit weights on all eight neighbours the two
/// passes are exact for the chessboard metric. Cells no seed reaches end
/// at [`FAR`].
pub fn chebyshev_transform(buffer: &mut DistanceBuffer) {
    let n = buffer.side;
    if n == 0 {
        return;
    }
    let cells = &mut buffer.cells;
    for d in cells.iter_mut() {
        if *d != 0 {
            *d = UNREACHED;
        }
    }

    for y in 0..n {
        for x in 0..n {
            let i = y * n + x;
            let mut best = cells[i];
            if x > 0 {
                best = best.min(step(cells[i - 1]));
            }
            if y > 0 {
                let up = i - n;
                best = best.min(step(cells[up]));
                if x > 0 {
                    best = best.min(step(cells[up - 1]));
                }
                if x + 1 < n {
                    best = best.min(step(cells[up + 1]));
                }
            }
            cells[i] = best;
        }
    }

    for y in (0..n).rev() {
        for x in (0..n).rev() {
            let i = y * n + x;
            let mut best = cells[i];
            if x + 1 < n {
                best = best.min(step(cells[i + 1]));
            }
            if y + 1 < n {
                let down = i + n;
                best = best.min(step(cells[down]));
                if x + 1 < n {
                    best = best.min(step(cells[down + 1]));
                }
                if x > 0 {
                    best = best.min(step(cells[down - 1]));
                }
            }
            cells[i] = best;
        }
    }

    for d in cells.iter_mut() {
        if *d == UNREACHED {
            *d = FAR;
        }
    }
}

fn step(d: u16) -> u16 {
    if d == UNREACHED { UNREACHED } else { d + 1 }
}

// ---------------------------------------------------------------------------
// DistanceGrid
// ---------------------------------------------------------------------------

/// Distances from every tile around a placed footprint to its nearest cell.
///
/// The grid is square, `max(bbox width, bbox depth) + 2 * margin` on a side
/// (clamped by the pool), with the footprint's bounding box centered in it.
/// When the clamp cuts into the footprint, cells falling outside the grid
/// are not seeded and [`DistanceGrid::covers_footprint`] is false; the
/// distances are then meaningless.
#[derive(Debug)]
pub struct DistanceGrid<'a> {
    buffer: PooledBuffer<'a>,
    origin_x: i32,
    origin_y: i32,
    unseeded: usize,
}

impl<'a> DistanceGrid<'a> {
    pub fn build(
        pool: &'a DistanceBufferPool,
        footprint: &Footprint,
        anchor: Point3D,
        margin: u16,
    ) -> Self {
        let bounds = footprint.bounds();
        let (w, d) = (bounds.width() as usize, bounds.depth() as usize);
        let requested = w.max(d) + 2 * usize::from(margin);
        let mut buffer = pool.checkout(requested);
        let side = buffer.side() as i64;

        let lead_x = (side - w as i64) / 2;
        let lead_y = (side - d as i64) / 2;
        let origin_x = (i64::from(anchor.x) + i64::from(bounds.min.x) - lead_x) as i32;
        let origin_y = (i64::from(anchor.y) + i64::from(bounds.min.y) - lead_y) as i32;

        let mut unseeded = 0;
        for cell in footprint.cells() {
            let world = anchor.offset(cell.offset);
            if !buffer.seed(world.x - origin_x, world.y - origin_y) {
                unseeded += 1;
            }
        }
        chebyshev_transform(&mut buffer);

        Self {
            buffer,
            origin_x,
            origin_y,
            unseeded,
        }
    }

    /// Footprint cells that fell outside the grid.
    pub fn unseeded(&self) -> usize {
        self.unseeded
    }

    pub fn covers_footprint(&self) -> bool {
        self.unseeded == 0
    }

    /// World `(x, y)` of grid cell `(0, 0)`.
    pub fn origin(&self) -> (i32, i32) {
        (self.origin_x, self.origin_y)
    }

    pub fn side(&self) -> usize {
        self.buffer.side()
    }

    /// Distance at a world tile, or `None` outside the grid.
    pub fn distance_at(&self, x: i32, y: i32) -> Option<u16> {
        self.buffer.get(x - self.origin_x, y - self.origin_y)
    }

    /// Row-major `(world x, world y, distance)` over the whole grid.
    pub fn iter(&self) -> impl Iterator<Item = (i32, i32, u16)> + '_ {
        let (ox, oy) = self.origin();
        self.buffer
            .iter()
            .map(move |(x, y, d)| (ox + x as i32, oy + y as i32, d))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use groundwork_core::test_utils;

    fn transformed(side: usize, seeds: &[(i32, i32)]) -> DistanceBuffer {
        let mut buf = DistanceBuffer::new(side);
        for &(x, y) in seeds {
            assert!(buf.seed(x, y));
        }
        chebyshev_transform(&mut buf);
        buf
    }

    #[test]
    fn new_buffer_is_far() {
        let buf = DistanceBuffer::new(4);
        assert_eq!(buf.side(), 4);
        assert!(buf.iter().all(|(_, _, d)| d == FAR));
    }

    #[test]
    fn seed_out_of_range_is_rejected() {
        let mut buf = DistanceBuffer::new(3);
        assert!(!buf.seed(3, 0));
        assert!(!buf.seed(-1, 1));
        assert_eq!(buf.seed_count(), 0);
    }

    #[test]
    fn single_seed_gives_chessboard_rings() {
        let buf = transformed(7, &[(3, 3)]);
        assert_eq!(buf.get(3, 3), Some(0));
        assert_eq!(buf.get(4, 4), Some(1));
        assert_eq!(buf.get(0, 0), Some(3));
        assert_eq!(buf.get(6, 1), Some(3));
        assert_eq!(buf.get(5, 3), Some(2));
    }

    #[test]
    fn corner_seed_reaches_far_corner() {
        let buf = transformed(5, &[(0, 0)]);
        assert_eq!(buf.get(4, 4), Some(4));
        assert_eq!(buf.get(4, 0), Some(4));
        assert_eq!(buf.get(0, 4), Some(4));
    }

    #[test]
    fn nearest_of_two_seeds_wins() {
        let buf = transformed(9, &[(1, 4), (7, 4)]);
        assert_eq!(buf.get(4, 4), Some(3));
        assert_eq!(buf.get(2, 0), Some(4));
        assert_eq!(buf.get(8, 8), Some(4));
    }

    #[test]
    fn no_seeds_stays_far() {
        let buf = transformed(6, &[]);
        assert!(buf.iter().all(|(_, _, d)| d == FAR));
    }

    #[test]
    fn transform_is_idempotent() {
        let mut buf = transformed(8, &[(2, 5), (6, 1)]);
        let before = buf.clone();
        chebyshev_transform(&mut buf);
        assert_eq!(buf, before);
    }

    #[test]
    fn reset_clears_previous_seeds() {
        let mut buf = transformed(4, &[(1, 1)]);
        buf.reset();
        assert!(buf.iter().all(|(_, _, d)| d == FAR));
        assert_eq!(buf.side(), 4);
    }

    #[test]
    fn grid_centers_single_cell() {
        let pool = DistanceBufferPool::new(22);
        let fp = test_utils::flat_cell();
        let grid = DistanceGrid::build(&pool, &fp, Point3D::new(100, 100, 0), 2);
        assert_eq!(grid.side(), 5);
        assert_eq!(grid.origin(), (98, 98));
        assert_eq!(grid.distance_at(100, 100), Some(0));
        assert_eq!(grid.distance_at(98, 101), Some(2));
        assert_eq!(grid.distance_at(97, 100), None);
    }

    #[test]
    fn grid_covers_margin_around_block() {
        let pool = DistanceBufferPool::new(22);
        let fp = test_utils::floor_block(3, 2);
        let grid = DistanceGrid::build(&pool, &fp, Point3D::new(10, 10, 0), 1);
        assert_eq!(grid.side(), 5);
        for x in 10..13 {
            for y in 10..12 {
                assert_eq!(grid.distance_at(x, y), Some(0));
            }
        }
        assert_eq!(grid.distance_at(9, 9), Some(1));
        assert_eq!(grid.distance_at(13, 12), Some(1));
        assert_eq!(grid.iter().count(), 25);
    }

    #[test]
    fn clamped_grid_still_seeds_inner_cells() {
        let pool = DistanceBufferPool::new(4);
        let fp = test_utils::floor_block(8, 1);
        let grid = DistanceGrid::build(&pool, &fp, Point3D::ORIGIN, 3);
        assert_eq!(grid.side(), 4);
        assert_eq!(grid.origin(), (2, -1));
        assert_eq!(grid.distance_at(3, 0), Some(0));
        assert_eq!(grid.distance_at(3, 2), Some(2));
        assert_eq!(grid.distance_at(0, 0), None);
        assert_eq!(grid.unseeded(), 4);
        assert!(!grid.covers_footprint());
    }

    #[test]
    fn grid_within_cap_covers_footprint() {
        let pool = DistanceBufferPool::new(22);
        let fp = test_utils::floor_block(4, 4);
        let grid = DistanceGrid::build(&pool, &fp, Point3D::ORIGIN, 3);
        assert_eq!(grid.unseeded(), 0);
        assert!(grid.covers_footprint());
    }

    #[test]
    fn sparse_wide_footprint_seeds_nothing() {
        let pool = DistanceBufferPool::new(22);
        let fp = test_utils::cells(&[(0, 0, 0, 10), (30, 0, 0, 10)]);
        let grid = DistanceGrid::build(&pool, &fp, Point3D::new(50, 50, 0), 3);
        assert_eq!(grid.side(), 22);
        assert_eq!(grid.unseeded(), 2);
        assert!(!grid.covers_footprint());
    }
}
