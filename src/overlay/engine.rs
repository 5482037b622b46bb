//! Intersection and threshold engine.
//!
//! For each dissolved primary region: query the candidate index with the
//! unbuffered bounding box, union the candidates of each target type by
//! name, intersect them against the (optionally buffered) primary geometry,
//! and keep the pairs whose intersection area clears the threshold.
//! Percentages are always relative to the unbuffered primary area.

use geo::{Area, BooleanOps, BoundingRect, Buffer, MultiPolygon};
use rayon::prelude::*;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info};

use crate::models::{BoundaryCollection, Feature};
use crate::overlay::dissolve::{dissolve_by_name, union_by_name};
use crate::overlay::index::BoundaryIndex;

/// Tunable parameters of a crosswalk build.
#[derive(Debug, Clone)]
pub struct CrosswalkParams {
    /// Buffer distance in feet applied to the primary geometry before
    /// intersecting. Negative values shrink the region to suppress slivers
    /// along near-coincident boundaries; zero disables buffering. Never
    /// used for candidate selection or as the area denominator.
    pub buffer_feet: f64,
    /// Minimum intersection area (sq ft) for a pair to survive.
    pub min_area_final: f64,
    /// Numeric area floor below which a geometry counts as degenerate.
    pub epsilon: f64,
    /// Cap on dissolved primary regions per type, for constrained runs.
    /// Ignored when zero.
    pub max_primaries: Option<usize>,
}

impl Default for CrosswalkParams {
    fn default() -> Self {
        Self {
            buffer_feet: -50.0,
            min_area_final: 100.0,
            epsilon: 1e-6,
            max_primaries: None,
        }
    }
}

impl CrosswalkParams {
    /// The single threshold predicate shared by both output projections.
    pub fn passes_threshold(&self, intersection_area: f64) -> bool {
        intersection_area > self.min_area_final.max(self.epsilon)
    }
}

/// One surviving overlap pair.
#[derive(Debug, Clone, Serialize)]
pub struct OverlapRecord {
    #[serde(rename = "Primary Geography ID")]
    pub primary_id: String,

    #[serde(rename = "Primary Geography NameCol")]
    pub primary_name: String,

    #[serde(rename = "Other Geography ID")]
    pub other_id: String,

    #[serde(rename = "Other Geography NameCol")]
    pub other_name: String,

    #[serde(rename = "Primary Area (sq ft)")]
    pub primary_area: f64,

    #[serde(rename = "Intersection Area (sq ft)")]
    pub intersection_area: f64,

    #[serde(rename = "Percentage Overlap")]
    pub percentage: f64,
}

/// Surviving overlaps for one dissolved primary region.
///
/// Both output projections derive from this single computation, so their
/// membership can never diverge for the same parameters. A degenerate
/// region keeps its entry (it still owns a wide row) with no records.
#[derive(Debug, Clone)]
pub struct RegionOverlaps {
    pub name: String,
    pub records: Vec<OverlapRecord>,
}

/// Crosswalk computation over a shared collection and candidate index.
///
/// The collection and index are read-only after construction, so regions
/// fan out across threads without locking.
pub struct CrosswalkEngine<'a> {
    collection: &'a BoundaryCollection,
    index: &'a BoundaryIndex,
    params: CrosswalkParams,
}

impl<'a> CrosswalkEngine<'a> {
    pub fn new(
        collection: &'a BoundaryCollection,
        index: &'a BoundaryIndex,
        params: CrosswalkParams,
    ) -> Self {
        Self {
            collection,
            index,
            params,
        }
    }

    pub fn params(&self) -> &CrosswalkParams {
        &self.params
    }

    /// Compute overlaps for every dissolved region of one primary type
    /// against the given target types. Returns one entry per dissolved
    /// region with usable geometry, in name order.
    pub fn build_for_primary(
        &self,
        primary_id: &str,
        target_ids: &[String],
    ) -> Vec<RegionOverlaps> {
        let features = self.collection.of_type(primary_id);
        if features.is_empty() {
            return Vec::new();
        }

        let mut dissolved = dissolve_by_name(primary_id, features);
        if let Some(cap) = self.params.max_primaries {
            if cap > 0 {
                dissolved.truncate(cap);
            }
        }
        info!(
            "Dissolved {} features of {} into {} named regions",
            features.len(),
            primary_id,
            dissolved.len()
        );

        // Each region's result is independent of every other's; collect
        // preserves region order, so scheduling cannot change the output.
        dissolved
            .par_iter()
            .map(|region| {
                self.overlaps_for_region(primary_id, &region.name, &region.geometry, target_ids)
            })
            .collect()
    }

    fn overlaps_for_region(
        &self,
        primary_id: &str,
        name: &str,
        geometry: &MultiPolygon<f64>,
        target_ids: &[String],
    ) -> RegionOverlaps {
        let primary_area = geometry.unsigned_area();
        if primary_area <= self.params.epsilon {
            debug!("Skipping degenerate primary region {}/{}", primary_id, name);
            return RegionOverlaps {
                name: name.to_string(),
                records: Vec::new(),
            };
        }

        // De-noise only the intersection operand; candidate selection and
        // the area denominator stay unbuffered.
        let probe: MultiPolygon<f64> = if self.params.buffer_feet != 0.0 {
            geometry.buffer(self.params.buffer_feet)
        } else {
            geometry.clone()
        };

        let candidates = match geometry.bounding_rect() {
            Some(bbox) => self.index.query(bbox),
            None => Vec::new(),
        };

        let mut records = Vec::new();
        for other_id in target_ids {
            if other_id == primary_id {
                continue;
            }
            let subset: Vec<&Feature> = candidates
                .iter()
                .filter(|f| f.type_id == *other_id)
                .map(Arc::as_ref)
                .collect();
            if subset.is_empty() {
                continue;
            }

            for (other_name, other_union) in union_by_name(subset) {
                let intersection = probe.intersection(&other_union);
                let intersection_area = intersection.unsigned_area();
                if !self.params.passes_threshold(intersection_area) {
                    continue;
                }
                records.push(OverlapRecord {
                    primary_id: primary_id.to_string(),
                    primary_name: name.to_string(),
                    other_id: other_id.clone(),
                    other_name,
                    primary_area,
                    intersection_area,
                    percentage: intersection_area / primary_area * 100.0,
                });
            }
        }

        RegionOverlaps {
            name: name.to_string(),
            records,
        }
    }
}
