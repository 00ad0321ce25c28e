//! Loading placement data from RON, TOML or JSON files.
//!
//! A data directory holds `shapes.*` (required), `composites.*` and
//! `validator.*` (both optional). See [`load_placement_data`].

pub mod loader;
pub mod schema;

pub use loader::{
    DataLoadError, PlacementData, load_composites, load_placement_data, load_shape_table,
    load_validator_config,
};
