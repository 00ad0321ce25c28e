//! The ordered placement rule pipeline.
//!
//! Stages run in a fixed order and the first failing stage decides the
//! result:
//!
//! 1. sanity (live map, non-empty footprint)
//! 2. territory at the anchor authorizes the requester
//! 3. territory housing percentage
//! 4. enclosing structure at the anchor (staircases shift the anchor up)
//! 5. vessel at the anchor
//! 6. ground level
//! 7. per footprint cell: territory, structure, collision, surface, mobiles
//! 8. anchor inside a structure: done
//! 9. proximity scan over the distance grid
//!
//! World adapter faults surface as [`PlacementFault`] from
//! [`PlacementValidator::try_validate`] and as `Invalid` from
//! [`PlacementValidator::validate`].

use crate::distance::DistanceGrid;
use crate::pool::DistanceBufferPool;
use groundwork_core::config::ValidatorConfig;
use groundwork_core::footprint::{Cell, Footprint, FootprintSource};
use groundwork_core::geometry::{Point3D, VerticalSpan};
use groundwork_core::id::{EntityId, MapId, StructureId, TerritoryId};
use groundwork_core::options::{RuleFlags, ValidationOptions};
use groundwork_core::outcome::ValidationResult;
use groundwork_core::shape::ShapeTable;
use groundwork_core::world::{ItemRole, ItemTile, QueryError, StaticTile, WorldQuery};
use std::collections::BTreeSet;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// One placement to check.
#[derive(Debug, Clone, Copy)]
pub struct PlacementRequest<'a> {
    pub map: MapId,
    pub anchor: Point3D,
    pub footprint: &'a Footprint,
    pub requester: EntityId,
    pub options: &'a ValidationOptions,
}

/// A placement whose footprint has not been normalized yet.
#[derive(Debug, Clone)]
pub struct SourceRequest<'a> {
    pub map: MapId,
    pub anchor: Point3D,
    pub source: FootprintSource<'a>,
    pub requester: EntityId,
    pub options: &'a ValidationOptions,
}

/// What sits at the anchor, as seen by stage 4.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorContext {
    /// Effective anchor; raised by the staircase offset on a staircase.
    pub point: Point3D,
    pub structure: Option<StructureId>,
    pub on_staircase: bool,
}

/// A validation that could not be decided.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlacementFault {
    #[error("world query failed: {0}")]
    Query(#[from] QueryError),
}

// Early exit from the pipeline: a rule verdict or a fault.
enum Halt {
    Reject(ValidationResult),
    Fault(PlacementFault),
}

impl From<QueryError> for Halt {
    fn from(err: QueryError) -> Self {
        Halt::Fault(PlacementFault::Query(err))
    }
}

fn reject(stage: &'static str, result: ValidationResult) -> Halt {
    tracing::debug!("placement rejected at {} stage: {:?}", stage, result);
    Halt::Reject(result)
}

// ---------------------------------------------------------------------------
// PlacementValidator
// ---------------------------------------------------------------------------

/// Decides whether footprints may be built.
///
/// Holds only the fixed thresholds and a pool of scratch distance buffers,
/// so a single validator can be shared across threads.
#[derive(Debug)]
pub struct PlacementValidator {
    config: ValidatorConfig,
    pool: DistanceBufferPool,
}

impl Default for PlacementValidator {
    fn default() -> Self {
        Self::new(ValidatorConfig::default())
    }
}

impl PlacementValidator {
    pub fn new(config: ValidatorConfig) -> Self {
        let pool = DistanceBufferPool::new(config.max_grid_size);
        Self { config, pool }
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    pub fn pool(&self) -> &DistanceBufferPool {
        &self.pool
    }

    /// Run the pipeline, failing closed on any world fault.
    pub fn validate<W>(&self, world: &W, request: &PlacementRequest<'_>) -> ValidationResult
    where
        W: WorldQuery + ?Sized,
    {
        match self.try_validate(world, request) {
            Ok(result) => result,
            Err(fault) => {
                tracing::warn!(
                    "placement at ({}, {}, {}) failed closed: {}",
                    request.anchor.x,
                    request.anchor.y,
                    request.anchor.z,
                    fault
                );
                ValidationResult::Invalid
            }
        }
    }

    /// Run the pipeline, reporting world faults to the caller.
    pub fn try_validate<W>(
        &self,
        world: &W,
        request: &PlacementRequest<'_>,
    ) -> Result<ValidationResult, PlacementFault>
    where
        W: WorldQuery + ?Sized,
    {
        match self.run(world, request) {
            Ok(()) => Ok(ValidationResult::Valid),
            Err(Halt::Reject(result)) => Ok(result),
            Err(Halt::Fault(fault)) => Err(fault),
        }
    }

    /// Normalize `request.source` against `shapes` and validate it. A source
    /// that yields no footprint is `Invalid`.
    pub fn validate_source<W>(
        &self,
        world: &W,
        shapes: &ShapeTable,
        request: SourceRequest<'_>,
    ) -> ValidationResult
    where
        W: WorldQuery + ?Sized,
    {
        let footprint = match Footprint::from_source(request.source, shapes) {
            Ok(footprint) => footprint,
            Err(err) => {
                tracing::debug!("placement rejected, bad footprint: {}", err);
                return ValidationResult::Invalid;
            }
        };
        self.validate(
            world,
            &PlacementRequest {
                map: request.map,
                anchor: request.anchor,
                footprint: &footprint,
                requester: request.requester,
                options: request.options,
            },
        )
    }

    /// Validate many requests against one world.
    ///
    /// With the `parallel` feature the requests are spread over the rayon
    /// thread pool. Results are in request order either way.
    pub fn validate_batch<W>(
        &self,
        world: &W,
        requests: &[PlacementRequest<'_>],
    ) -> Vec<ValidationResult>
    where
        W: WorldQuery + Sync + ?Sized,
    {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            requests
                .par_iter()
                .map(|request| self.validate(world, request))
                .collect()
        }
        #[cfg(not(feature = "parallel"))]
        {
            requests
                .iter()
                .map(|request| self.validate(world, request))
                .collect()
        }
    }

    /// Look up the structure enclosing a footprint of `height` at `anchor`.
    ///
    /// On a staircase the returned point is raised by the configured
    /// staircase offset.
    pub fn resolve_anchor<W>(
        &self,
        world: &W,
        anchor: Point3D,
        height: i32,
    ) -> Result<AnchorContext, PlacementFault>
    where
        W: WorldQuery + ?Sized,
    {
        let structure = world.structure_at(anchor, height)?;
        let on_staircase = match structure {
            Some(s) => world.structure_is_staircase(s, anchor)?,
            None => false,
        };
        let mut point = anchor;
        if on_staircase {
            point.z += self.config.staircase_z_offset;
        }
        Ok(AnchorContext {
            point,
            structure,
            on_staircase,
        })
    }

    // -----------------------------------------------------------------------
    // Pipeline
    // -----------------------------------------------------------------------

    fn run<W>(&self, world: &W, request: &PlacementRequest<'_>) -> Result<(), Halt>
    where
        W: WorldQuery + ?Sized,
    {
        let footprint = request.footprint;
        let options = request.options;

        if footprint.is_empty() || !world.has_map(request.map) {
            return Err(reject("sanity", ValidationResult::Invalid));
        }

        let territory = match world.territory_at(request.anchor)? {
            Some(t) if world.territory_authorizes(t, request.requester)? => t,
            _ => return Err(reject("territory", ValidationResult::OutsideTownship)),
        };

        if !options.has(RuleFlags::IGNORE_OWNERSHIP_PERCENTAGE)
            && !world.territory_ownership(territory)?.is_satisfied()
        {
            return Err(reject("ownership", ValidationResult::HousingPercentage));
        }

        let height = footprint.vertical_span_at(request.anchor).height;
        let ctx = self
            .resolve_anchor(world, request.anchor, height)
            .map_err(Halt::Fault)?;
        if let (Some(structure), false) = (ctx.structure, ctx.on_staircase) {
            if !options.has(RuleFlags::ALLOW_INSIDE_STRUCTURE) {
                return Err(reject("anchor structure", ValidationResult::InsideHouse));
            }
            if !world.structure_owned_by_member(structure, territory)? {
                return Err(reject(
                    "anchor structure",
                    ValidationResult::InsideNeutralHouse,
                ));
            }
        }

        if world.vessel_at(ctx.point)?.is_some() {
            return Err(reject("vessel", ValidationResult::Blocked));
        }

        if options.has(RuleFlags::NEEDS_GROUND_LEVEL)
            && world.terrain(ctx.point.x, ctx.point.y)?.avg != ctx.point.z
        {
            return Err(reject("ground level", ValidationResult::NoGround));
        }

        for cell in footprint.cells() {
            self.check_cell(world, request, &ctx, territory, cell)?;
        }

        if ctx.structure.is_some() {
            return Ok(());
        }

        self.check_proximity(world, request, &ctx, territory)
    }

    fn check_cell<W>(
        &self,
        world: &W,
        request: &PlacementRequest<'_>,
        ctx: &AnchorContext,
        territory: TerritoryId,
        cell: &Cell,
    ) -> Result<(), Halt>
    where
        W: WorldQuery + ?Sized,
    {
        let options = request.options;
        let at = ctx.point.offset(cell.offset);
        let span = cell.span_at(ctx.point);

        if world.territory_at(at)? != Some(territory) {
            return Err(reject("cell territory", ValidationResult::OutsideTownship));
        }

        match (ctx.structure, world.structure_at(at, i32::from(cell.height))?) {
            (None, Some(_)) => {
                return Err(reject("cell structure", ValidationResult::PartInsideHouse));
            }
            (Some(anchor), found) if found != Some(anchor) => {
                return Err(reject("cell structure", ValidationResult::PartOutsideHouse));
            }
            _ => {}
        }

        let terrain = world.terrain(at.x, at.y)?;
        let statics = world.statics_at(at.x, at.y)?;
        let items = world.items_at(at.x, at.y)?;

        let terrain_blocks = terrain.impassable && terrain.span().overlaps(&span);
        let static_blocks = statics.iter().any(|s| static_collides(s, &span));
        let item_blocks = items
            .iter()
            .filter(|i| !options.is_excluded(i.entity))
            .any(|i| item_collides(i, &span));
        if terrain_blocks || static_blocks || item_blocks {
            return Err(reject("collision", ValidationResult::Blocked));
        }

        if cell.is_flat() && options.has(RuleFlags::NEEDS_SURFACE) {
            let supported = terrain.is_walkable_at(at.z)
                || statics.iter().any(|s| s.surface && s.span().top() == at.z)
                || items.iter().any(|i| {
                    i.surface
                        && i.stationary
                        && !options.is_excluded(i.entity)
                        && i.span().top() == at.z
                });
            if !supported {
                return Err(reject("surface", ValidationResult::NoSurface));
            }
        }

        let ignore_requester = options.has(RuleFlags::IGNORE_REQUESTER);
        for mobile in world.mobiles_at(at.x, at.y)? {
            if ignore_requester && mobile.entity == request.requester {
                continue;
            }
            if options.is_excluded(mobile.entity) || !mobile.blocks_placement() {
                continue;
            }
            let body = VerticalSpan::new(mobile.z, self.config.mobile_height);
            if body.overlaps(&span) {
                return Err(reject("mobiles", ValidationResult::BlockedByMobile));
            }
        }

        Ok(())
    }

    fn check_proximity<W>(
        &self,
        world: &W,
        request: &PlacementRequest<'_>,
        ctx: &AnchorContext,
        territory: TerritoryId,
    ) -> Result<(), Halt>
    where
        W: WorldQuery + ?Sized,
    {
        let options = request.options;
        let config = &self.config;
        let structure_clearance = config.structure_clearance();
        let margin = structure_clearance
            .max(config.teleporter_clearance)
            .max(options.clearance);

        let footprint = request.footprint;
        let body = footprint.vertical_span_at(ctx.point);
        let floors: BTreeSet<(i32, i32, i32)> = footprint
            .cells()
            .filter(|c| c.is_flat())
            .map(|c| {
                let p = ctx.point.offset(c.offset);
                (p.x, p.y, p.z)
            })
            .collect();
        let check_floor = options.has(RuleFlags::CHECK_DUPLICATE_FLOOR);

        let grid = DistanceGrid::build(&self.pool, footprint, ctx.point, margin);
        if !grid.covers_footprint() {
            tracing::warn!(
                "footprint spans past the {}-tile distance grid, {} of {} cells unseeded",
                grid.side(),
                grid.unseeded(),
                footprint.len()
            );
            return Err(reject("proximity", ValidationResult::Invalid));
        }
        for (x, y, d) in grid.iter() {
            let probe = Point3D::new(x, y, ctx.point.z);

            if d <= structure_clearance {
                if let Some(s) = world.structure_at(probe, body.height)? {
                    if !world.structure_is_staircase(s, probe)? {
                        if d <= config.house_clearance {
                            return Err(reject("proximity", ValidationResult::AgainstHouse));
                        }
                        if d <= config.neutral_house_clearance
                            && !world.structure_owned_by_member(s, territory)?
                        {
                            return Err(reject(
                                "proximity",
                                ValidationResult::NearNeutralHouse,
                            ));
                        }
                    }
                }
            }

            let wants_clearance = d <= options.clearance;
            let wants_teleporter = d <= config.teleporter_clearance;
            let wants_floor = check_floor && d == 0;
            if !(wants_clearance || wants_teleporter || wants_floor) {
                continue;
            }

            let found = world.items_at(x, y)?;
            let items = || found.iter().filter(|i| !options.is_excluded(i.entity));

            if wants_clearance {
                let statics = world.statics_at(x, y)?;
                let crowded = statics.iter().any(|s| static_collides(s, &body))
                    || items().any(|i| {
                        !matches!(i.role, ItemRole::Wall | ItemRole::Door)
                            && item_collides(i, &body)
                    });
                if crowded {
                    return Err(reject("proximity", ValidationResult::NoClearance));
                }
            }

            if wants_teleporter && items().any(|i| i.role == ItemRole::Teleporter) {
                return Err(reject("proximity", ValidationResult::NearTeleporter));
            }

            if wants_floor
                && items().any(|i| {
                    i.stationary && i.height == 0 && floors.contains(&(x, y, i.z))
                })
            {
                return Err(reject("proximity", ValidationResult::DuplicateFloor));
            }
        }

        Ok(())
    }
}

// Zero-height geometry never obstructs; it is a surface.
fn static_collides(tile: &StaticTile, span: &VerticalSpan) -> bool {
    tile.height > 0 && (tile.impassable || tile.surface) && tile.span().overlaps(span)
}

fn item_collides(item: &ItemTile, span: &VerticalSpan) -> bool {
    item.height > 0 && (item.impassable || item.surface) && item.span().overlaps(span)
}
