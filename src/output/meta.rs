//! Run metadata record: every parameter a build resolved, so outputs can
//! be reproduced.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs;
use std::path::Path;

use crate::overlay::CrosswalkParams;

#[derive(Debug, Clone, Serialize)]
pub struct RunMeta {
    pub boundaries: String,
    pub buffer_feet: f64,
    pub min_intersection_area_final: f64,
    pub epsilon: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_primaries: Option<usize>,
    pub exclude_ids: Vec<String>,
    pub primary_ids: Vec<String>,
    pub target_ids: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl RunMeta {
    pub fn new(
        boundaries: &Path,
        params: &CrosswalkParams,
        exclude_ids: Vec<String>,
        primary_ids: Vec<String>,
        target_ids: Vec<String>,
    ) -> Self {
        Self {
            boundaries: boundaries.display().to_string(),
            buffer_feet: params.buffer_feet,
            min_intersection_area_final: params.min_area_final,
            epsilon: params.epsilon,
            max_primaries: params.max_primaries,
            exclude_ids,
            primary_ids,
            target_ids,
            generated_at: Utc::now(),
        }
    }

    /// Write the metadata record as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json =
            serde_json::to_string_pretty(self).context("Failed to serialize run metadata")?;
        fs::write(path, json)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_json_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crosswalks_meta.json");

        let meta = RunMeta::new(
            Path::new("outputs/run/all_boundaries.geojson"),
            &CrosswalkParams::default(),
            vec!["cc_upcoming".to_string()],
            vec!["cc".to_string(), "pp".to_string()],
            vec!["cc".to_string(), "pp".to_string()],
        );
        meta.write_json(&path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["buffer_feet"], -50.0);
        assert_eq!(value["min_intersection_area_final"], 100.0);
        assert_eq!(value["exclude_ids"][0], "cc_upcoming");
        assert_eq!(value["primary_ids"].as_array().unwrap().len(), 2);
        assert!(value.get("max_primaries").is_none());
    }
}
