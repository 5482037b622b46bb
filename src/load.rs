//! Reader for the standardized boundary collection.
//!
//! The acquisition stage emits one GeoJSON FeatureCollection where every
//! feature carries an `id` (geography-type code), a `nameCol` (group name)
//! and a polygon or multipolygon geometry, already reprojected to a planar
//! foot-based coordinate system. This module only parses that contract; it
//! does not download, reproject or standardize anything.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use flate2::read::GzDecoder;
use geo::{Coord, LineString, MultiPolygon, Polygon};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{BoundaryCollection, Feature};

/// Collection-level load failures. These are the only fatal errors in the
/// pipeline; everything downstream degrades per feature or per type.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read boundaries file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("boundaries file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("boundaries file is not a GeoJSON FeatureCollection")]
    NotACollection,

    #[error("feature {index} is missing required property `{field}`")]
    MissingField { index: usize, field: &'static str },
}

/// Read a standardized boundary collection from a GeoJSON file, gzipped
/// (`.gz`) or plain.
pub fn load_boundaries(path: &Path) -> Result<BoundaryCollection, LoadError> {
    info!("Loading boundaries from {}", path.display());

    let open_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::open(path).map_err(open_err)?;
    let mut reader: Box<dyn Read> = if path.extension().map_or(false, |e| e == "gz") {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };

    let mut raw = String::new();
    reader.read_to_string(&mut raw).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let collection = parse_feature_collection(&raw)?;
    info!("Loaded {} boundary features", collection.len());
    Ok(collection)
}

/// Parse a GeoJSON FeatureCollection string into a boundary collection.
///
/// Features with a non-polygonal or empty geometry are skipped; a missing
/// `id` property is fatal since nothing downstream can classify the record.
pub fn parse_feature_collection(raw: &str) -> Result<BoundaryCollection, LoadError> {
    let value: Value = serde_json::from_str(raw)?;

    if value["type"].as_str() != Some("FeatureCollection") {
        return Err(LoadError::NotACollection);
    }
    let features_json = value["features"]
        .as_array()
        .ok_or(LoadError::NotACollection)?;

    let mut features = Vec::with_capacity(features_json.len());
    for (index, feature) in features_json.iter().enumerate() {
        let props = &feature["properties"];
        let type_id = props["id"]
            .as_str()
            .ok_or(LoadError::MissingField { index, field: "id" })?
            .to_string();
        // The acquisition stage fills missing names with ""; tolerate nulls
        // the same way.
        let name = props["nameCol"].as_str().unwrap_or("").to_string();

        match parse_geometry(&feature["geometry"]) {
            Some(geometry) => features.push(Feature::new(type_id, name, geometry)),
            None => debug!(
                "Skipping feature {} with non-polygonal or empty geometry",
                index
            ),
        }
    }

    Ok(BoundaryCollection::new(features))
}

/// Convert a GeoJSON geometry object to a MultiPolygon. Polygons are
/// promoted to single-member multipolygons; anything else yields None.
fn parse_geometry(geometry: &Value) -> Option<MultiPolygon<f64>> {
    let coords = geometry["coordinates"].as_array()?;
    match geometry["type"].as_str()? {
        "Polygon" => parse_polygon_coords(coords).map(|p| MultiPolygon(vec![p])),
        "MultiPolygon" => {
            let polygons: Vec<Polygon<f64>> = coords
                .iter()
                .filter_map(|p| p.as_array().and_then(|rings| parse_polygon_coords(rings)))
                .collect();
            if polygons.is_empty() {
                None
            } else {
                Some(MultiPolygon(polygons))
            }
        }
        _ => None,
    }
}

/// Parse one polygon: first ring is the exterior, the rest are holes.
fn parse_polygon_coords(rings: &[Value]) -> Option<Polygon<f64>> {
    let mut iter = rings.iter();
    let exterior = parse_ring_coords(iter.next()?.as_array()?)?;
    let interiors: Vec<LineString<f64>> = iter
        .filter_map(|r| r.as_array().and_then(|c| parse_ring_coords(c)))
        .collect();
    Some(Polygon::new(exterior, interiors))
}

/// Parse a ring from GeoJSON coordinates, closing it if needed.
fn parse_ring_coords(coords: &[Value]) -> Option<LineString<f64>> {
    let mut points = Vec::with_capacity(coords.len());
    for pair in coords {
        let pair = pair.as_array()?;
        if pair.len() < 2 {
            return None;
        }
        points.push(Coord {
            x: pair[0].as_f64()?,
            y: pair[1].as_f64()?,
        });
    }

    if !points.is_empty() && points.first() != points.last() {
        points.push(points[0]);
    }
    if points.len() < 4 {
        return None;
    }
    Some(LineString::new(points))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection_json() -> &'static str {
        r#"{
            "type": "FeatureCollection",
            "features": [
                {
                    "type": "Feature",
                    "properties": {"id": "cc", "nameCol": "1"},
                    "geometry": {
                        "type": "Polygon",
                        "coordinates": [[[0.0, 0.0], [10.0, 0.0], [10.0, 10.0], [0.0, 10.0], [0.0, 0.0]]]
                    }
                },
                {
                    "type": "Feature",
                    "properties": {"id": "pp", "nameCol": null},
                    "geometry": {
                        "type": "MultiPolygon",
                        "coordinates": [
                            [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]],
                            [[[5.0, 5.0], [6.0, 5.0], [6.0, 6.0], [5.0, 6.0], [5.0, 5.0]]]
                        ]
                    }
                },
                {
                    "type": "Feature",
                    "properties": {"id": "pp", "nameCol": "A"},
                    "geometry": {"type": "Point", "coordinates": [1.0, 2.0]}
                }
            ]
        }"#
    }

    #[test]
    fn test_parse_collection() {
        let collection = parse_feature_collection(collection_json()).unwrap();

        // The point feature is skipped, the rest survive
        assert_eq!(collection.len(), 2);
        assert_eq!(collection.type_ids(), vec!["cc", "pp"]);

        let cc = &collection.of_type("cc")[0];
        assert_eq!(cc.name, "1");
        assert_eq!(cc.geometry.0.len(), 1);

        // Null nameCol comes through as the empty string
        let pp = &collection.of_type("pp")[0];
        assert_eq!(pp.name, "");
        assert_eq!(pp.geometry.0.len(), 2);
    }

    #[test]
    fn test_unclosed_ring_is_closed() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"id": "cc", "nameCol": "1"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [4.0, 0.0], [4.0, 4.0], [0.0, 4.0]]]
                }
            }]
        }"#;
        let collection = parse_feature_collection(raw).unwrap();
        let ring = collection.of_type("cc")[0].geometry.0[0].exterior();
        assert_eq!(ring.0.first(), ring.0.last());
    }

    #[test]
    fn test_missing_id_is_fatal() {
        let raw = r#"{
            "type": "FeatureCollection",
            "features": [{
                "type": "Feature",
                "properties": {"nameCol": "1"},
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0], [0.0, 0.0]]]
                }
            }]
        }"#;
        match parse_feature_collection(raw) {
            Err(LoadError::MissingField { index: 0, field: "id" }) => {}
            other => panic!("expected MissingField, got {:?}", other.map(|c| c.len())),
        }
    }

    #[test]
    fn test_not_a_collection() {
        assert!(matches!(
            parse_feature_collection(r#"{"type": "Feature"}"#),
            Err(LoadError::NotACollection)
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            parse_feature_collection("not json"),
            Err(LoadError::Json(_))
        ));
    }
}
