//! Core data models for the crosswalk pipeline.

pub mod feature;
pub mod geography;

pub use feature::{BoundaryCollection, Feature};
pub use geography::{GeographyRegistry, GeographyType};
