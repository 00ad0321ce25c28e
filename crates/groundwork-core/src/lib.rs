//! Groundwork Core -- shared types for structure placement in a tile world.
//!
//! This crate holds everything the placement validator reads but does not
//! compute: the shape table, the canonical footprint, the caller's rule
//! selection, the outcome taxonomy, and the read-only world interface.
//!
//! # Placement Flow
//!
//! 1. The caller normalizes its request into a [`footprint::Footprint`]
//!    (from a single shape, a composite definition, or a cell list).
//! 2. It builds a fresh [`options::ValidationOptions`] for the call.
//! 3. The validator (in `groundwork-placement`) queries a
//!    [`world::WorldQuery`] implementation in a fixed order and returns a
//!    [`outcome::ValidationResult`].
//! 4. The caller maps the result to a message with
//!    [`outcome::ValidationResult::message`] and, only on `Valid`, builds.
//!
//! # Key Types
//!
//! - [`geometry::Point3D`] -- world positions and anchor-relative offsets.
//! - [`geometry::VerticalSpan`] -- vertical occupancy and overlap rules.
//! - [`shape::ShapeTable`] -- immutable per-shape height and flags.
//! - [`footprint::Footprint`] -- non-empty list of `(shape, cell)` pairs.
//! - [`options::RuleFlags`] -- optional rule categories.
//! - [`world::WorldQuery`] -- terrain, statics, items, mobiles, structures,
//!   vessels and territories.
//! - [`snapshot::WorldSnapshot`] -- in-memory `WorldQuery`.
//! - [`config::ValidatorConfig`] -- fixed thresholds.

pub mod config;
pub mod footprint;
pub mod geometry;
pub mod id;
pub mod options;
pub mod outcome;
pub mod shape;
pub mod snapshot;
pub mod world;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
