//! Wide crosswalk table: one row per dissolved primary region, one column
//! per target geography type holding the set of overlapping names.
//!
//! Deliberately lossy (no areas, no percentages) in exchange for a compact
//! spreadsheet-friendly membership view.

use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs::File;
use std::path::Path;

use crate::overlay::RegionOverlaps;

const NAME_DELIMITER: &str = ";";

pub struct WideTable {
    columns: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl WideTable {
    /// Assemble the table. Columns are the primary id followed by the
    /// remaining target ids in lexicographic order; every target id gets a
    /// column even when nothing of that type survives anywhere. Cells are
    /// sorted, deduplicated, `;`-joined name sets, empty when no overlap
    /// cleared the threshold. Returns None when the primary type dissolved
    /// to nothing.
    pub fn assemble(
        primary_id: &str,
        target_ids: &[String],
        regions: &[RegionOverlaps],
    ) -> Option<Self> {
        if regions.is_empty() {
            return None;
        }

        let mut other_ids: Vec<String> = target_ids
            .iter()
            .filter(|id| id.as_str() != primary_id)
            .cloned()
            .collect();
        other_ids.sort();
        other_ids.dedup();

        let mut columns = Vec::with_capacity(other_ids.len() + 1);
        columns.push(primary_id.to_string());
        columns.extend(other_ids.iter().cloned());

        let rows = regions
            .iter()
            .map(|region| {
                let mut row = Vec::with_capacity(columns.len());
                row.push(region.name.clone());
                for other_id in &other_ids {
                    let names: BTreeSet<&str> = region
                        .records
                        .iter()
                        .filter(|r| r.other_id == *other_id)
                        .map(|r| r.other_name.as_str())
                        .collect();
                    row.push(names.into_iter().collect::<Vec<_>>().join(NAME_DELIMITER));
                }
                row
            })
            .collect();

        Some(Self { columns, rows })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Write the table as CSV.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = csv::Writer::from_writer(file);
        writer.write_record(&self.columns)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }
}
