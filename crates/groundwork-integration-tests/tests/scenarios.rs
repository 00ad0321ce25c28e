//! End-to-end placement scenarios across core and placement crates.
//!
//! Each test builds a small world snapshot, asks the validator about one
//! placement and pins the exact result, including which rule wins when
//! several are broken at once.

use groundwork_core::config::ValidatorConfig;
use groundwork_core::footprint::Footprint;
use groundwork_core::geometry::{Point3D, TileRect};
use groundwork_core::id::{EntityId, TerritoryId};
use groundwork_core::options::{RuleFlags, ValidationOptions};
use groundwork_core::outcome::ValidationResult;
use groundwork_core::snapshot::{ItemSpec, StructureSpec, TerritorySpec, WorldSnapshot};
use groundwork_core::test_utils::*;
use groundwork_core::world::{ItemRole, OwnershipStatus, TerrainSample, WorldQuery};
use groundwork_placement::{PlacementRequest, PlacementValidator};

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn validate_with<W: WorldQuery>(
    validator: &PlacementValidator,
    world: &W,
    requester: EntityId,
    footprint: &Footprint,
    anchor: Point3D,
    options: &ValidationOptions,
) -> ValidationResult {
    validator.validate(
        world,
        &PlacementRequest {
            map: TEST_MAP,
            anchor,
            footprint,
            requester,
            options,
        },
    )
}

fn validate<W: WorldQuery>(
    world: &W,
    requester: EntityId,
    footprint: &Footprint,
    anchor: Point3D,
    options: &ValidationOptions,
) -> ValidationResult {
    init_tracing();
    validate_with(
        &PlacementValidator::default(),
        world,
        requester,
        footprint,
        anchor,
        options,
    )
}

fn at(x: i32, y: i32, z: i32) -> Point3D {
    Point3D::new(x, y, z)
}

// ===========================================================================
// Reference scenarios
// ===========================================================================

#[test]
fn scenario_a_flat_cell_on_open_ground() {
    let (world, mayor) = town_world();
    let result = validate(
        &world,
        mayor,
        &flat_cell(),
        at(100, 100, 0),
        &ValidationOptions::default(),
    );
    assert_eq!(result, ValidationResult::Valid);
    assert_eq!(result.message(), None);
}

#[test]
fn scenario_b_static_obstacle() {
    let (mut world, mayor) = town_world();
    world.add_static(100, 100, blocking_static(0, 20));
    let result = validate(
        &world,
        mayor,
        &flat_cell(),
        at(100, 100, 0),
        &ValidationOptions::default(),
    );
    assert_eq!(result, ValidationResult::Blocked);
    assert_eq!(result.message(), Some("That location is blocked."));
}

#[test]
fn scenario_c_footprint_across_two_territories() {
    let (mut world, mayor) = town_world();
    world.add_territory(
        TerritoryId(2),
        TerritorySpec::new(TileRect::new(200, 0, 399, 199)).member(mayor),
    );
    let fp = floor_block(2, 1);
    let options = ValidationOptions::default();

    // Each half on its own is fine.
    assert_eq!(
        validate(&world, mayor, &flat_cell(), at(199, 50, 0), &options),
        ValidationResult::Valid
    );
    assert_eq!(
        validate(&world, mayor, &flat_cell(), at(200, 50, 0), &options),
        ValidationResult::Valid
    );
    assert_eq!(
        validate(&world, mayor, &fp, at(199, 50, 0), &options),
        ValidationResult::OutsideTownship
    );
}

#[test]
fn scenario_d_floor_over_open_air() {
    let (world, mayor) = town_world();
    let options = ValidationOptions::new().with_flags(RuleFlags::NEEDS_SURFACE);
    let result = validate(&world, mayor, &flat_cell(), at(100, 100, 30), &options);
    assert_eq!(result, ValidationResult::NoSurface);

    let grounded = validate(&world, mayor, &flat_cell(), at(100, 100, 0), &options);
    assert_eq!(grounded, ValidationResult::Valid);
}

// ===========================================================================
// Stage ordering
// ===========================================================================

#[test]
fn territory_beats_collision() {
    let (mut world, mayor) = town_world();
    world.add_static(250, 250, blocking_static(0, 20));
    let result = validate(
        &world,
        mayor,
        &flat_cell(),
        at(250, 250, 0),
        &ValidationOptions::default(),
    );
    assert_eq!(result, ValidationResult::OutsideTownship);
}

#[test]
fn housing_percentage_beats_inside_house() {
    let mut world = WorldSnapshot::new(TEST_MAP);
    let mayor = world.add_entity();
    world.add_territory(
        TOWN,
        TerritorySpec::new(TileRect::new(0, 0, 199, 199))
            .member(mayor)
            .ownership(OwnershipStatus {
                required_percent: Some(50),
                member_owned: 1,
                total: 3,
            }),
    );
    world.add_structure(StructureSpec::new(TileRect::new(10, 10, 14, 14), 0, 20));
    let result = validate(
        &world,
        mayor,
        &flat_cell(),
        at(12, 12, 0),
        &ValidationOptions::default(),
    );
    assert_eq!(result, ValidationResult::HousingPercentage);
}

#[test]
fn inside_house_beats_vessel() {
    let (mut world, mayor) = town_world();
    world.add_structure(StructureSpec::new(TileRect::new(10, 10, 14, 14), 0, 20));
    world.add_vessel(TileRect::new(10, 10, 14, 14), 0, 20);
    let result = validate(
        &world,
        mayor,
        &flat_cell(),
        at(12, 12, 0),
        &ValidationOptions::default(),
    );
    assert_eq!(result, ValidationResult::InsideHouse);
}

#[test]
fn ground_level_beats_collision() {
    let (mut world, mayor) = town_world();
    world.add_static(100, 100, blocking_static(0, 20));
    let options = ValidationOptions::new().with_flags(RuleFlags::NEEDS_GROUND_LEVEL);
    let result = validate(&world, mayor, &flat_cell(), at(100, 100, 5), &options);
    assert_eq!(result, ValidationResult::NoGround);
}

#[test]
fn collision_beats_surface() {
    let (mut world, mayor) = town_world();
    world.add_static(100, 100, blocking_static(25, 15));
    let options = ValidationOptions::new().with_flags(RuleFlags::NEEDS_SURFACE);
    let result = validate(&world, mayor, &flat_cell(), at(100, 100, 30), &options);
    assert_eq!(result, ValidationResult::Blocked);
}

#[test]
fn surface_beats_mobile() {
    let (mut world, mayor) = town_world();
    world.add_mobile(100, 100, 20, false, false);
    let options = ValidationOptions::new().with_flags(RuleFlags::NEEDS_SURFACE);
    let result = validate(&world, mayor, &flat_cell(), at(100, 100, 30), &options);
    assert_eq!(result, ValidationResult::NoSurface);
}

#[test]
fn mobile_beats_proximity() {
    let (mut world, mayor) = town_world();
    world.add_mobile(100, 100, 0, false, false);
    world.add_structure(StructureSpec::new(TileRect::new(101, 100, 103, 102), 0, 20));
    let result = validate(
        &world,
        mayor,
        &flat_cell(),
        at(100, 100, 0),
        &ValidationOptions::default(),
    );
    assert_eq!(result, ValidationResult::BlockedByMobile);
}

#[test]
fn structure_checked_before_clearance_on_same_tile() {
    let (mut world, mayor) = town_world();
    world.add_structure(StructureSpec::new(TileRect::tile(101, 100), 0, 20).owned_by(TOWN));
    world.add_static(101, 100, blocking_static(0, 10));
    let options = ValidationOptions::new().with_clearance(2);
    let result = validate(&world, mayor, &flat_cell(), at(100, 100, 0), &options);
    assert_eq!(result, ValidationResult::AgainstHouse);
}

#[test]
fn earlier_cell_decides_within_footprint() {
    let (mut world, mayor) = town_world();
    // First cell is blocked, second cell leaves the territory.
    world.add_static(199, 50, blocking_static(0, 20));
    let result = validate(
        &world,
        mayor,
        &floor_block(2, 1),
        at(199, 50, 0),
        &ValidationOptions::default(),
    );
    assert_eq!(result, ValidationResult::Blocked);
}

// ===========================================================================
// Structures and staircases
// ===========================================================================

#[test]
fn staircase_anchor_skips_interior_rules() {
    let (mut world, mayor) = town_world();
    world.add_structure(
        StructureSpec::new(TileRect::new(10, 10, 14, 14), 0, 20).staircase(12, 12),
    );
    let options = ValidationOptions::default();

    let result = validate(&world, mayor, &flat_cell(), at(12, 12, 0), &options);
    assert_eq!(result, ValidationResult::Valid);

    let beside = validate(&world, mayor, &flat_cell(), at(11, 12, 0), &options);
    assert_eq!(beside, ValidationResult::InsideHouse);
}

#[test]
fn staircase_offset_comes_from_config() {
    let (mut world, _) = town_world();
    world.add_structure(
        StructureSpec::new(TileRect::new(10, 10, 14, 14), 0, 20).staircase(12, 12),
    );
    let validator = PlacementValidator::new(ValidatorConfig {
        staircase_z_offset: 3,
        ..Default::default()
    });
    let ctx = validator.resolve_anchor(&world, at(12, 12, 0), 0).unwrap();
    assert!(ctx.on_staircase);
    assert_eq!(ctx.point, at(12, 12, 3));
}

#[test]
fn wider_house_clearance_from_config() {
    let (mut world, mayor) = town_world();
    world.add_structure(StructureSpec::new(TileRect::new(103, 95, 106, 105), 0, 20).owned_by(TOWN));
    let options = ValidationOptions::default();
    let fp = flat_cell();

    assert_eq!(
        validate(&world, mayor, &fp, at(100, 100, 0), &options),
        ValidationResult::Valid
    );

    let wide = PlacementValidator::new(ValidatorConfig {
        house_clearance: 3,
        ..Default::default()
    });
    assert_eq!(
        validate_with(&wide, &world, mayor, &fp, at(100, 100, 0), &options),
        ValidationResult::AgainstHouse
    );
}

#[test]
fn structure_above_tall_footprint_is_ignored() {
    let (mut world, mayor) = town_world();
    world.add_structure(StructureSpec::new(TileRect::new(101, 100, 104, 103), 40, 60));
    let result = validate(
        &world,
        mayor,
        &tall_cell(20),
        at(100, 100, 0),
        &ValidationOptions::default(),
    );
    assert_eq!(result, ValidationResult::Valid);
}

// ===========================================================================
// Clearance and exclusions
// ===========================================================================

#[test]
fn clearance_boundary_is_inclusive() {
    let (mut world, mayor) = town_world();
    let fp = floor_block(3, 3);
    // Footprint covers x 100..=102, so x 105 is three tiles away.
    world.add_item(105, 101, ItemSpec::new(0, 10).impassable());

    let three = ValidationOptions::new().with_clearance(3);
    assert_eq!(
        validate(&world, mayor, &fp, at(100, 100, 0), &three),
        ValidationResult::NoClearance
    );
    let two = ValidationOptions::new().with_clearance(2);
    assert_eq!(
        validate(&world, mayor, &fp, at(100, 100, 0), &two),
        ValidationResult::Valid
    );
}

#[test]
fn clearance_ignores_non_overlapping_heights() {
    let (mut world, mayor) = town_world();
    world.add_static(101, 100, blocking_static(30, 10));
    let options = ValidationOptions::new().with_clearance(2);
    let result = validate(&world, mayor, &tall_cell(20), at(100, 100, 0), &options);
    assert_eq!(result, ValidationResult::Valid);
}

#[test]
fn excluded_entities_never_block() {
    let (mut world, mayor) = town_world();
    let cart = world.add_item(100, 100, ItemSpec::new(0, 8).impassable());
    let horse = world.add_mobile(100, 100, 0, false, false);
    let post = world.add_item(102, 100, ItemSpec::new(0, 8).impassable());

    let options = ValidationOptions::new()
        .with_clearance(2)
        .exclude(cart)
        .exclude(horse)
        .exclude(post);
    let result = validate(&world, mayor, &flat_cell(), at(100, 100, 0), &options);
    assert_eq!(result, ValidationResult::Valid);

    let partial = ValidationOptions::new().with_clearance(2).exclude(cart).exclude(horse);
    let result = validate(&world, mayor, &flat_cell(), at(100, 100, 0), &partial);
    assert_eq!(result, ValidationResult::NoClearance);
}

#[test]
fn hidden_mobiles_depend_on_privilege() {
    let (mut world, mayor) = town_world();
    world.add_mobile(100, 100, 0, true, true);
    let options = ValidationOptions::default();
    assert_eq!(
        validate(&world, mayor, &flat_cell(), at(100, 100, 0), &options),
        ValidationResult::Valid
    );

    world.add_mobile(100, 100, 0, true, false);
    assert_eq!(
        validate(&world, mayor, &flat_cell(), at(100, 100, 0), &options),
        ValidationResult::BlockedByMobile
    );
}

#[test]
fn teleporter_within_threshold() {
    let (mut world, mayor) = town_world();
    world.add_item(98, 98, ItemSpec::new(0, 0).role(ItemRole::Teleporter));
    let options = ValidationOptions::default();
    assert_eq!(
        validate(&world, mayor, &flat_cell(), at(100, 100, 0), &options),
        ValidationResult::NearTeleporter
    );
    assert_eq!(
        validate(&world, mayor, &flat_cell(), at(101, 100, 0), &options),
        ValidationResult::Valid
    );
}

#[test]
fn duplicate_floor_only_on_same_tile_and_height() {
    let (mut world, mayor) = town_world();
    world.add_item(101, 100, ItemSpec::new(0, 0).surface().stationary());
    let options = ValidationOptions::new().with_flags(RuleFlags::CHECK_DUPLICATE_FLOOR);

    assert_eq!(
        validate(&world, mayor, &floor_block(2, 1), at(100, 100, 0), &options),
        ValidationResult::DuplicateFloor
    );
    assert_eq!(
        validate(&world, mayor, &flat_cell(), at(100, 100, 0), &options),
        ValidationResult::Valid
    );
}

// ===========================================================================
// Faults and determinism
// ===========================================================================

#[test]
fn faults_fail_closed() {
    let (world, mayor) = town_world();
    let options = ValidationOptions::default();

    let at_anchor = FaultyWorld::new(world.clone()).fail_at(100, 100);
    assert_eq!(
        validate(&at_anchor, mayor, &flat_cell(), at(100, 100, 0), &options),
        ValidationResult::Invalid
    );

    let in_grid = FaultyWorld::new(world.clone()).fail_at(104, 97);
    assert_eq!(
        validate(&in_grid, mayor, &flat_cell(), at(100, 100, 0), &options),
        ValidationResult::Invalid
    );

    let far_away = FaultyWorld::new(world).fail_at(120, 100);
    assert_eq!(
        validate(&far_away, mayor, &flat_cell(), at(100, 100, 0), &options),
        ValidationResult::Valid
    );
}

#[test]
fn repeated_validation_is_stable() {
    let (mut world, mayor) = town_world();
    world.add_static(103, 101, blocking_static(0, 10));
    world.add_item(97, 99, ItemSpec::new(0, 0).role(ItemRole::Teleporter));
    world.set_terrain(101, 101, TerrainSample::flat(2));
    let fp = floor_block(3, 2);
    let options = ValidationOptions::new()
        .with_clearance(1)
        .with_flags(RuleFlags::NEEDS_SURFACE);

    let first = validate(&world, mayor, &fp, at(100, 100, 0), &options);
    for _ in 0..10 {
        assert_eq!(validate(&world, mayor, &fp, at(100, 100, 0), &options), first);
    }
}
