#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Size-bounded batch output for accepted coordinate points.
//!
//! Partitions the merged point sequence into contiguous slices of at
//! most `max_rows` rows and writes each slice to
//! `file_coordinates_<n>.csv` (1-indexed) with longitude and latitude
//! formatted to 3 decimal places. Batch membership is order-dependent,
//! so the input sequence must already be in its final, deterministic
//! order.

use std::path::{Path, PathBuf};

use coord_grid_models::AcceptedPoint;
use thiserror::Error;

/// Output columns of every batch file.
const HEADER: [&str; 4] = ["row_id", "region_id", "lon", "lat"];

/// Errors writing batch files. Always fatal: a partially written batch
/// set must not pass silently.
#[derive(Debug, Error)]
pub enum BatchError {
    /// CSV serialization failed.
    #[error("CSV error writing {path}: {source}")]
    Csv {
        /// Path of the batch file.
        path: String,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// Destination unwritable.
    #[error("I/O error writing {path}: {source}")]
    Io {
        /// Path of the batch file.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
}

/// Handle to one written batch file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFile {
    /// 1-indexed batch number.
    pub index: usize,
    /// Where the batch landed.
    pub path: PathBuf,
    /// Rows written (excluding the header).
    pub rows: usize,
}

/// Splits points into contiguous slices of at most `max_rows` each,
/// preserving input order.
///
/// Produces exactly `ceil(N / max_rows)` slices for N > 0 and zero
/// slices for empty input - never a trailing empty slice. `max_rows` is
/// clamped to at least 1.
#[must_use]
pub fn partition(points: &[AcceptedPoint], max_rows: usize) -> Vec<&[AcceptedPoint]> {
    if points.is_empty() {
        return Vec::new();
    }
    points.chunks(max_rows.max(1)).collect()
}

/// Writes the point sequence as numbered batch files in `dest_dir`.
///
/// Each batch is `file_coordinates_<n>.csv` for batch number `n`
/// starting at 1, with columns `row_id`, `region_id`, `lon`, `lat`;
/// `lon`/`lat` are formatted to exactly 3 decimal places. Empty input
/// writes nothing.
///
/// # Errors
///
/// Returns [`BatchError`] on the first unwritable file; earlier batches
/// may already be on disk when that happens.
pub fn write_batches(
    points: &[AcceptedPoint],
    dest_dir: &Path,
    max_rows: usize,
) -> Result<Vec<BatchFile>, BatchError> {
    let chunks = partition(points, max_rows);
    let mut files = Vec::with_capacity(chunks.len());

    for (i, chunk) in chunks.iter().enumerate() {
        let index = i + 1;
        let path = dest_dir.join(format!("file_coordinates_{index}.csv"));
        write_batch(chunk, &path)?;
        log::info!("Saved {} with {} rows", path.display(), chunk.len());
        files.push(BatchFile {
            index,
            path,
            rows: chunk.len(),
        });
    }

    Ok(files)
}

fn write_batch(points: &[AcceptedPoint], path: &Path) -> Result<(), BatchError> {
    let csv_err = |source| BatchError::Csv {
        path: path.display().to_string(),
        source,
    };

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer.write_record(HEADER).map_err(csv_err)?;

    for point in points {
        let row_id = point.row_id.map_or_else(String::new, |id| id.to_string());
        writer
            .write_record([
                row_id,
                point.region_id.clone(),
                format!("{:.3}", point.lon),
                format!("{:.3}", point.lat),
            ])
            .map_err(csv_err)?;
    }

    writer.flush().map_err(|source| BatchError::Io {
        path: path.display().to_string(),
        source,
    })
}
