//! Boundary feature types shared across the pipeline.

use std::sync::Arc;

use geo::{BoundingRect, MultiPolygon, Rect};
use hashbrown::HashMap;

/// One record of the standardized boundary collection: a geography-type id,
/// a group name (possibly empty), and a planar multipolygon in a foot-based
/// coordinate system.
#[derive(Debug, Clone)]
pub struct Feature {
    pub type_id: String,
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

impl Feature {
    pub fn new(
        type_id: impl Into<String>,
        name: impl Into<String>,
        geometry: MultiPolygon<f64>,
    ) -> Self {
        Self {
            type_id: type_id.into(),
            name: name.into(),
            geometry,
        }
    }

    /// Get the bounding box of this feature
    pub fn bbox(&self) -> Option<Rect<f64>> {
        self.geometry.bounding_rect()
    }
}

/// The full standardized boundary collection, read-only after construction.
///
/// Features are Arc-shared so the spatial index and the per-type views can
/// reference the same records without copies.
pub struct BoundaryCollection {
    features: Vec<Arc<Feature>>,
    by_type: HashMap<String, Vec<Arc<Feature>>>,
}

impl BoundaryCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        let features: Vec<Arc<Feature>> = features.into_iter().map(Arc::new).collect();

        let mut by_type: HashMap<String, Vec<Arc<Feature>>> = HashMap::new();
        for feature in &features {
            by_type
                .entry(feature.type_id.clone())
                .or_default()
                .push(Arc::clone(feature));
        }

        Self { features, by_type }
    }

    /// All distinct geography-type ids, sorted.
    pub fn type_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.by_type.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Features belonging to one geography type (empty for unknown ids).
    pub fn of_type(&self, type_id: &str) -> &[Arc<Feature>] {
        self.by_type.get(type_id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn features(&self) -> &[Arc<Feature>] {
        &self.features
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{LineString, Polygon};

    fn square(x0: f64, y0: f64, size: f64) -> MultiPolygon<f64> {
        MultiPolygon(vec![Polygon::new(
            LineString::from(vec![
                (x0, y0),
                (x0 + size, y0),
                (x0 + size, y0 + size),
                (x0, y0 + size),
                (x0, y0),
            ]),
            vec![],
        )])
    }

    #[test]
    fn test_type_ids_sorted() {
        let collection = BoundaryCollection::new(vec![
            Feature::new("pp", "1", square(0.0, 0.0, 1.0)),
            Feature::new("cc", "1", square(0.0, 0.0, 1.0)),
            Feature::new("pp", "2", square(2.0, 0.0, 1.0)),
        ]);

        assert_eq!(collection.type_ids(), vec!["cc", "pp"]);
        assert_eq!(collection.of_type("pp").len(), 2);
        assert_eq!(collection.of_type("cc").len(), 1);
    }

    #[test]
    fn test_unknown_type_is_empty() {
        let collection =
            BoundaryCollection::new(vec![Feature::new("cc", "1", square(0.0, 0.0, 1.0))]);
        assert!(collection.of_type("zz").is_empty());
    }

    #[test]
    fn test_feature_bbox() {
        let feature = Feature::new("cc", "1", square(2.0, 3.0, 4.0));
        let bbox = feature.bbox().unwrap();
        assert_eq!(bbox.min().x, 2.0);
        assert_eq!(bbox.max().y, 7.0);
    }

    #[test]
    fn test_empty_geometry_has_no_bbox() {
        let feature = Feature::new("cc", "1", MultiPolygon(vec![]));
        assert!(feature.bbox().is_none());
    }
}
