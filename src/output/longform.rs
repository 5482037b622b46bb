//! Longform crosswalk table: one row per surviving overlap pair, with full
//! area and percentage detail.

use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::fs::File;
use std::path::Path;

use crate::overlay::{OverlapRecord, RegionOverlaps};

/// Ordered longform table for one primary geography type.
pub struct LongformTable {
    records: Vec<OverlapRecord>,
}

impl LongformTable {
    /// Assemble the table from per-region overlaps.
    ///
    /// Returns None when no pair survived the threshold, so callers can
    /// skip the artifact entirely instead of writing an empty file.
    pub fn assemble(regions: &[RegionOverlaps]) -> Option<Self> {
        let mut records: Vec<OverlapRecord> = regions
            .iter()
            .flat_map(|region| region.records.iter().cloned())
            .collect();
        if records.is_empty() {
            return None;
        }

        records.sort_by(|a, b| {
            a.primary_name
                .cmp(&b.primary_name)
                .then_with(|| a.other_id.cmp(&b.other_id))
                .then_with(|| {
                    b.percentage
                        .partial_cmp(&a.percentage)
                        .unwrap_or(Ordering::Equal)
                })
        });

        Some(Self { records })
    }

    pub fn records(&self) -> &[OverlapRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Write the table as CSV; headers come from the record field names.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        let mut writer = csv::Writer::from_writer(file);
        for record in &self.records {
            writer.serialize(record)?;
        }
        writer.flush()?;
        Ok(())
    }
}
