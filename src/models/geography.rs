//! Geography type registry.
//!
//! The set of layers, their display names and the source column that
//! carried each group name are decided by the acquisition stage. The
//! registry here is an optional description of them, used for log lines
//! and run metadata; the ids driving a build always come from the data.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// One geography layer: stable id code, human-readable name, and the
/// source attribute the acquisition stage mapped to the group name.
#[derive(Debug, Deserialize, Clone)]
pub struct GeographyType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub name_col: Option<String>,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct GeographyRegistry {
    #[serde(default)]
    pub types: Vec<GeographyType>,
}

impl GeographyRegistry {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read geography registry")?;
        let registry: GeographyRegistry =
            toml::from_str(&content).context("Failed to parse geography registry")?;
        Ok(registry)
    }

    /// Display name for a type id; falls back to the id itself.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.types
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.name.as_str())
            .unwrap_or(id)
    }
}
