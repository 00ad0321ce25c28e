//! Placement validation for structures in a tile world.
//!
//! [`validator::PlacementValidator`] runs the ordered rule pipeline against
//! a [`groundwork_core::world::WorldQuery`]. Proximity rules use an exact
//! Chebyshev distance transform ([`distance`]) over buffers borrowed from
//! a size-keyed [`pool::DistanceBufferPool`].
//!
//! # Features
//!
//! - `parallel`: [`validator::PlacementValidator::validate_batch`] fans out
//!   over rayon.

pub mod distance;
pub mod pool;
pub mod validator;

pub use distance::{DistanceBuffer, DistanceGrid, chebyshev_transform};
pub use pool::{DistanceBufferPool, PooledBuffer};
pub use validator::{
    AnchorContext, PlacementFault, PlacementRequest, PlacementValidator, SourceRequest,
};
