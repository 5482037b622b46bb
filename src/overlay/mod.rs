//! Crosswalk overlay engine.
//!
//! Builds a bbox candidate index over the boundary collection, dissolves
//! same-named regions, and computes denoised, thresholded intersection
//! areas between every pair of geography types.

mod dissolve;
mod engine;
mod index;

pub use dissolve::{dissolve_by_name, union_by_name, DissolvedRegion};
pub use engine::{CrosswalkEngine, CrosswalkParams, OverlapRecord, RegionOverlaps};
pub use index::BoundaryIndex;
