//! Property-based tests for the distance transform and the validator.

use groundwork_core::footprint::{Cell, Footprint, FootprintEntry};
use groundwork_core::geometry::Point3D;
use groundwork_core::options::ValidationOptions;
use groundwork_core::test_utils::*;
use groundwork_placement::distance::{DistanceBuffer, FAR, chebyshev_transform};
use groundwork_placement::{DistanceBufferPool, PlacementRequest, PlacementValidator};
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

fn arb_seeds(side: usize) -> impl Strategy<Value = Vec<(i32, i32)>> {
    let s = side as i32;
    proptest::collection::vec((0..s, 0..s), 1..6)
}

fn arb_offsets() -> impl Strategy<Value = Vec<(i32, i32)>> {
    proptest::collection::vec((-4..4i32, -4..4i32), 1..8)
}

fn chebyshev(a: (i32, i32), b: (i32, i32)) -> u16 {
    (a.0 - b.0).unsigned_abs().max((a.1 - b.1).unsigned_abs()) as u16
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A single seed yields max(|dx|, |dy|) everywhere in the grid.
    #[test]
    fn single_seed_is_chessboard(side in 1usize..=22, cx in 0usize..22, cy in 0usize..22) {
        let (cx, cy) = ((cx % side) as i32, (cy % side) as i32);
        let mut buf = DistanceBuffer::new(side);
        prop_assert!(buf.seed(cx, cy));
        chebyshev_transform(&mut buf);
        for (x, y, d) in buf.iter() {
            prop_assert_eq!(d, chebyshev((x as i32, y as i32), (cx, cy)));
        }
    }

    /// Every cell matches a brute-force scan over the seeds.
    #[test]
    fn matches_brute_force(seeds in arb_seeds(16)) {
        let mut buf = DistanceBuffer::new(16);
        for &(x, y) in &seeds {
            buf.seed(x, y);
        }
        chebyshev_transform(&mut buf);
        for (x, y, d) in buf.iter() {
            let expected = seeds
                .iter()
                .map(|&s| chebyshev((x as i32, y as i32), s))
                .min()
                .unwrap_or(FAR);
            prop_assert_eq!(d, expected);
        }
    }

    /// Whatever was asked for, the pool never exceeds its cap.
    #[test]
    fn checkout_is_clamped(cap in 1usize..30, asked in 0usize..100) {
        let pool = DistanceBufferPool::new(cap);
        let buf = pool.checkout(asked);
        prop_assert_eq!(buf.side(), asked.clamp(1, cap));
    }

    /// Repeated validation of the same placement gives the same answer.
    #[test]
    fn validation_is_deterministic(offsets in arb_offsets(), clearance in 0u16..4) {
        let (mut world, mayor) = town_world();
        world.add_static(102, 101, blocking_static(0, 10));
        let entries = offsets
            .iter()
            .map(|&(x, y)| FootprintEntry {
                shape: floor(),
                cell: Cell::new(Point3D::new(x, y, 0), 0),
            })
            .collect();
        let footprint = Footprint::from_entries(entries).unwrap();
        let options = ValidationOptions::new().with_clearance(clearance);
        let request = PlacementRequest {
            map: TEST_MAP,
            anchor: Point3D::new(100, 100, 0),
            footprint: &footprint,
            requester: mayor,
            options: &options,
        };
        let validator = PlacementValidator::default();
        let first = validator.validate(&world, &request);
        for _ in 0..3 {
            prop_assert_eq!(validator.validate(&world, &request), first);
        }
    }
}
