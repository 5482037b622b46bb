//! Spatial candidate index over the boundary collection.
//!
//! Pure bbox prefilter: a query never misses a feature whose geometry truly
//! intersects the query region, but it may return features whose geometry
//! does not. Exact filtering happens downstream in the intersection engine.

use geo::Rect;
use rstar::{RTree, RTreeObject, AABB};
use std::sync::Arc;
use tracing::info;

use crate::models::{BoundaryCollection, Feature};

/// Wrapper for R-tree indexing of boundary features
#[derive(Clone)]
struct IndexedFeature {
    feature: Arc<Feature>,
    envelope: AABB<[f64; 2]>,
}

impl RTreeObject for IndexedFeature {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

impl IndexedFeature {
    fn new(feature: Arc<Feature>) -> Option<Self> {
        let rect = feature.bbox()?;
        Some(Self {
            feature,
            envelope: AABB::from_corners(
                [rect.min().x, rect.min().y],
                [rect.max().x, rect.max().y],
            ),
        })
    }
}

/// Bounding-box index over the full boundary collection, built once and
/// shared read-only for the whole build.
pub struct BoundaryIndex {
    tree: RTree<IndexedFeature>,
}

impl BoundaryIndex {
    /// Build the index. Features without a bounding box (empty geometries)
    /// are left out; they can never intersect anything.
    pub fn build(collection: &BoundaryCollection) -> Self {
        let indexed: Vec<IndexedFeature> = collection
            .features()
            .iter()
            .map(Arc::clone)
            .filter_map(IndexedFeature::new)
            .collect();

        let tree = RTree::bulk_load(indexed);
        info!("Spatial index built with {} entries", tree.size());

        Self { tree }
    }

    /// All features whose bounding box intersects the query box.
    pub fn query(&self, bbox: Rect<f64>) -> Vec<Arc<Feature>> {
        let envelope = AABB::from_corners(
            [bbox.min().x, bbox.min().y],
            [bbox.max().x, bbox.max().y],
        );
        self.tree
            .locate_in_envelope_intersecting(&envelope)
            .map(|item| Arc::clone(&item.feature))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.size() == 0
    }
}
