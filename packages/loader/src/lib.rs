#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Region loading from tabular sources.
//!
//! Reads CSV rows carrying a region identifier and a serialized boundary
//! polygon, parses them into typed [`Region`] values, and skips (with a
//! logged warning) any row whose boundary cannot be parsed. Emission
//! order equals input row order; downstream batching relies on that for
//! reproducibility.

pub mod boundary;

use std::io::Read;
use std::path::Path;

use coord_grid_models::{Region, SuppliedBounds};
use serde::Deserialize;
use thiserror::Error;

pub use boundary::{BoundaryParseError, parse_boundary};

/// Errors that abort a region load.
///
/// Row-level problems (malformed boundaries, undeserializable rows) are
/// recovered per-record and never surface here.
#[derive(Debug, Error)]
pub enum LoaderError {
    /// CSV reading failed at the file level.
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// Path to the source file.
        path: String,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Source file unreadable.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// Path to the source file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// One raw row of the region source table.
///
/// `region_id` and `boundary` are required; the rest are optional
/// columns some sources carry.
#[derive(Debug, Deserialize)]
struct RegionRow {
    region_id: String,
    boundary: String,
    #[serde(default)]
    row_id: Option<u64>,
    #[serde(default)]
    min_lat: Option<f64>,
    #[serde(default)]
    max_lat: Option<f64>,
    #[serde(default)]
    min_lon: Option<f64>,
    #[serde(default)]
    max_lon: Option<f64>,
}

impl RegionRow {
    /// The supplied bounds, present only when all four columns are.
    fn supplied_bounds(&self) -> Option<SuppliedBounds> {
        match (self.min_lat, self.max_lat, self.min_lon, self.max_lon) {
            (Some(min_lat), Some(max_lat), Some(min_lon), Some(max_lon)) => Some(SuppliedBounds {
                min_lat,
                max_lat,
                min_lon,
                max_lon,
            }),
            _ => None,
        }
    }
}

/// Regions parsed from a source, plus the count of rows skipped along
/// the way.
#[derive(Debug)]
pub struct LoadOutcome {
    /// Parsed regions, in input row order.
    pub regions: Vec<Region>,
    /// Rows skipped because of malformed boundaries or undeserializable
    /// cells.
    pub skipped: usize,
}

/// Loads regions from a CSV file.
///
/// # Errors
///
/// Returns [`LoaderError`] if the file cannot be opened or read. Rows
/// that fail to parse are skipped, logged, and counted - they do not
/// fail the load.
pub fn load_regions(path: &Path) -> Result<LoadOutcome, LoaderError> {
    let reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(|e| LoaderError::Csv {
            path: path.display().to_string(),
            source: e,
        })?;

    let outcome = load_from_reader(reader);
    log::info!(
        "{}: loaded {} regions ({} rows skipped)",
        path.display(),
        outcome.regions.len(),
        outcome.skipped
    );
    Ok(outcome)
}

/// Loads regions from any CSV reader. Used directly by tests.
fn load_from_reader<R: Read>(mut reader: csv::Reader<R>) -> LoadOutcome {
    let mut regions = Vec::new();
    let mut skipped = 0;

    for (index, result) in reader.deserialize::<RegionRow>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                log::warn!("skipping row {index}: {e}");
                skipped += 1;
                continue;
            }
        };

        match boundary::parse_boundary(&row.boundary) {
            Ok(polygon) => regions.push(Region {
                supplied_bounds: row.supplied_bounds(),
                id: row.region_id,
                row_id: row.row_id,
                boundary: polygon,
            }),
            Err(e) => {
                log::warn!("skipping region {}: {e}", row.region_id);
                skipped += 1;
            }
        }
    }

    LoadOutcome { regions, skipped }
}

/// Loads regions from an in-memory CSV string.
///
/// Convenience for callers that already hold the table contents.
#[must_use]
pub fn load_regions_from_str(contents: &str) -> LoadOutcome {
    load_from_reader(csv::ReaderBuilder::new().flexible(true).from_reader(contents.as_bytes()))
}
