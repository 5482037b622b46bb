//! Name-based dissolving and unioning of boundary features.
//!
//! A region often arrives as several rows (multi-part districts, one row
//! per borough, re-surveyed fragments). Everything downstream wants exactly
//! one geometry per (type, name), so both helpers here group by name and
//! fold the parts into a boolean union. Only id and name survive a merge;
//! no other attribute reconciliation is attempted.

use geo::{BooleanOps, MultiPolygon};
use hashbrown::HashMap;
use std::sync::Arc;

use crate::models::Feature;

/// One dissolved region: the union of every feature sharing a name within
/// one geography type.
#[derive(Debug, Clone)]
pub struct DissolvedRegion {
    pub type_id: String,
    pub name: String,
    pub geometry: MultiPolygon<f64>,
}

/// Merge all same-named features of one geography type into one region per
/// name. Regions come out sorted by name, so downstream row order is
/// deterministic. Empty input produces empty output, not an error.
pub fn dissolve_by_name(type_id: &str, features: &[Arc<Feature>]) -> Vec<DissolvedRegion> {
    union_by_name(features.iter().map(|f| f.as_ref()))
        .into_iter()
        .map(|(name, geometry)| DissolvedRegion {
            type_id: type_id.to_string(),
            name,
            geometry,
        })
        .collect()
}

/// Union same-named features within an arbitrary subset, one entry per
/// distinct name, sorted by name.
///
/// A name surviving only as disjoint bbox-filtered fragments still gets
/// every fragment unioned in. Features with empty geometries are skipped;
/// a name left with no usable geometry is dropped entirely.
pub fn union_by_name<'a, I>(features: I) -> Vec<(String, MultiPolygon<f64>)>
where
    I: IntoIterator<Item = &'a Feature>,
{
    let mut by_name: HashMap<&'a str, Vec<&'a MultiPolygon<f64>>> = HashMap::new();
    for feature in features {
        if feature.geometry.0.is_empty() {
            continue;
        }
        by_name
            .entry(feature.name.as_str())
            .or_default()
            .push(&feature.geometry);
    }

    let mut names: Vec<&str> = by_name.keys().copied().collect();
    names.sort_unstable();

    names
        .into_iter()
        .map(|name| (name.to_string(), union_all(&by_name[name])))
        .collect()
}

/// Fold a set of multipolygons into their boolean union.
fn union_all(parts: &[&MultiPolygon<f64>]) -> MultiPolygon<f64> {
    parts
        .iter()
        .map(|part| (*part).clone())
        .reduce(|a, b| a.union(&b))
        .unwrap_or_else(|| MultiPolygon(vec![]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::{Area, LineString, Polygon};

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

    fn arcs(features: Vec<Feature>) -> Vec<Arc<Feature>> {
        features.into_iter().map(Arc::new).collect()
    }

    #[test]
    fn test_dissolve_disjoint_parts_sum_areas() {
        // Two disjoint 1x1 squares named "A" dissolve into one region of
        // area 2.
        let features = arcs(vec![
            Feature::new("cc", "A", square(0.0, 0.0, 1.0)),
            Feature::new("cc", "A", square(5.0, 5.0, 1.0)),
        ]);

        let dissolved = dissolve_by_name("cc", &features);
        assert_eq!(dissolved.len(), 1);
        assert_eq!(dissolved[0].name, "A");
        assert_eq!(dissolved[0].type_id, "cc");
        assert!((dissolved[0].geometry.unsigned_area() - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_dissolve_overlapping_parts_bounded() {
        // Overlapping parts: dissolved area is at least the largest part
        // and strictly less than the sum of parts.
        let features = arcs(vec![
            Feature::new("cc", "A", square(0.0, 0.0, 2.0)),
            Feature::new("cc", "A", square(1.0, 0.0, 2.0)),
        ]);

        let dissolved = dissolve_by_name("cc", &features);
        assert_eq!(dissolved.len(), 1);
        let area = dissolved[0].geometry.unsigned_area();
        assert!(area >= 4.0 - 1e-6);
        assert!(area < 8.0 - 1e-6);
        assert!((area - 6.0).abs() < 1e-6);
    }

    #[test]
    fn test_dissolve_sorted_by_name() {
        let features = arcs(vec![
            Feature::new("cc", "b", square(0.0, 0.0, 1.0)),
            Feature::new("cc", "a", square(2.0, 0.0, 1.0)),
            Feature::new("cc", "c", square(4.0, 0.0, 1.0)),
        ]);

        let names: Vec<String> = dissolve_by_name("cc", &features)
            .into_iter()
            .map(|r| r.name)
            .collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_dissolve_empty_input() {
        assert!(dissolve_by_name("cc", &[]).is_empty());
    }

    #[test]
    fn test_union_by_name_merges_all_fragments() {
        // A name appearing as several disjoint fragments must union them
        // all, not just the first.
        let features = vec![
            Feature::new("pp", "7", square(0.0, 0.0, 1.0)),
            Feature::new("pp", "7", square(3.0, 0.0, 1.0)),
            Feature::new("pp", "7", square(6.0, 0.0, 1.0)),
            Feature::new("pp", "9", square(9.0, 0.0, 1.0)),
        ];

        let unions = union_by_name(features.iter());
        assert_eq!(unions.len(), 2);
        assert_eq!(unions[0].0, "7");
        assert!((unions[0].1.unsigned_area() - 3.0).abs() < 1e-6);
        assert_eq!(unions[1].0, "9");
    }

    #[test]
    fn test_union_by_name_drops_empty_geometries() {
        let features = vec![
            Feature::new("pp", "7", MultiPolygon(vec![])),
            Feature::new("pp", "9", square(0.0, 0.0, 1.0)),
        ];

        let unions = union_by_name(features.iter());
        assert_eq!(unions.len(), 1);
        assert_eq!(unions[0].0, "9");
    }
}
