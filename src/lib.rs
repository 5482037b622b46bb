//! Crosswalk - area-weighted correspondence tables between boundary layers
//!
//! Given one standardized collection of boundary polygons tagged by
//! geography type, this library computes which named regions of each type
//! spatially overlap regions of every other type and by how much, and
//! projects the result into a detailed longform table and a compact wide
//! table per primary type.

pub mod load;
pub mod models;
pub mod output;
pub mod overlay;

pub use models::{BoundaryCollection, Feature, GeographyRegistry};
pub use overlay::{BoundaryIndex, CrosswalkEngine, CrosswalkParams, OverlapRecord};
