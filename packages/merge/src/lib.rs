#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Utilities over coordinate CSV files.
//!
//! The sampling pipeline's output (and the feature tables extracted from
//! it) get combined and audited with a handful of table operations: an
//! inner join on coordinates, distinct and duplicate row counts, a
//! two-file overlap comparison, and a first-N subset. All of them treat
//! coordinate equality as f64 equality of the parsed cell values, the
//! same rule the join keys in the extraction pipeline use.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use thiserror::Error;

/// Errors from coordinate-table operations. Always fatal.
#[derive(Debug, Error)]
pub enum MergeError {
    /// CSV reading or writing failed.
    #[error("CSV error in {path}: {source}")]
    Csv {
        /// File the error occurred in.
        path: String,
        /// Underlying CSV error.
        source: csv::Error,
    },

    /// File unreadable or unwritable.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// File the error occurred at.
        path: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// A required column is missing from the header row.
    #[error("{path} has no '{column}' column")]
    MissingColumn {
        /// File whose header was inspected.
        path: String,
        /// The column that was looked for.
        column: String,
    },
}

/// Counts from comparing the coordinate pairs of two files.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlapReport {
    /// Pairs present in both files.
    pub shared: u64,
    /// Pairs only in the left file.
    pub left_only: u64,
    /// Pairs only in the right file.
    pub right_only: u64,
}

fn csv_err(path: &Path) -> impl Fn(csv::Error) -> MergeError + '_ {
    move |source| MergeError::Csv {
        path: path.display().to_string(),
        source,
    }
}

fn open_reader(path: &Path) -> Result<csv::Reader<std::fs::File>, MergeError> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .map_err(csv_err(path))
}

/// Finds a column by name, case-insensitively, so that `Lat`/`lat` style
/// differences between producers do not matter.
fn column_index(
    headers: &csv::StringRecord,
    name: &str,
    path: &Path,
) -> Result<usize, MergeError> {
    headers
        .iter()
        .position(|h| h.eq_ignore_ascii_case(name))
        .ok_or_else(|| MergeError::MissingColumn {
            path: path.display().to_string(),
            column: name.to_string(),
        })
}

/// Join key: the parsed f64 bit patterns of a (lat, lon) cell pair.
/// `None` when either cell is not numeric.
fn coordinate_key(lat: &str, lon: &str) -> Option<(u64, u64)> {
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    Some((lat.to_bits(), lon.to_bits()))
}

/// Inner-joins a feature table with a coordinate table on (lat, lon) and
/// writes the result with `region_id`, `lat`, `lon` leading the columns.
///
/// Every feature row is matched against every coordinate row sharing its
/// (lat, lon) pair; non-matching rows on either side are dropped. The
/// remaining feature columns follow the three lead columns, then the
/// remaining coordinate columns (e.g. `row_id`).
///
/// Returns the number of joined rows written.
///
/// # Errors
///
/// Returns [`MergeError`] if either input is unreadable, the output is
/// unwritable, or a required column is missing.
pub fn merge_on_coordinates(
    features_path: &Path,
    coords_path: &Path,
    output_path: &Path,
) -> Result<u64, MergeError> {
    // Index the coordinate table: key -> (region_id, other cells).
    let mut coords_reader = open_reader(coords_path)?;
    let coords_headers = coords_reader
        .headers()
        .map_err(csv_err(coords_path))?
        .clone();
    let coords_lat = column_index(&coords_headers, "lat", coords_path)?;
    let coords_lon = column_index(&coords_headers, "lon", coords_path)?;
    let coords_region = column_index(&coords_headers, "region_id", coords_path)?;
    let coords_rest: Vec<usize> = (0..coords_headers.len())
        .filter(|&i| i != coords_lat && i != coords_lon && i != coords_region)
        .collect();

    let mut index: HashMap<(u64, u64), Vec<(String, Vec<String>)>> = HashMap::new();
    for record in coords_reader.records() {
        let record = record.map_err(csv_err(coords_path))?;
        let Some(key) = coordinate_key(&record[coords_lat], &record[coords_lon]) else {
            log::trace!("skipping coordinate row with non-numeric lat/lon");
            continue;
        };
        let rest = coords_rest
            .iter()
            .map(|&i| record.get(i).unwrap_or_default().to_string())
            .collect();
        index
            .entry(key)
            .or_default()
            .push((record[coords_region].to_string(), rest));
    }

    // Stream the feature table against the index.
    let mut features_reader = open_reader(features_path)?;
    let features_headers = features_reader
        .headers()
        .map_err(csv_err(features_path))?
        .clone();
    let features_lat = column_index(&features_headers, "lat", features_path)?;
    let features_lon = column_index(&features_headers, "lon", features_path)?;
    let features_rest: Vec<usize> = (0..features_headers.len())
        .filter(|&i| i != features_lat && i != features_lon)
        .collect();

    let mut writer = csv::Writer::from_path(output_path).map_err(csv_err(output_path))?;
    let mut header: Vec<&str> = vec!["region_id", "lat", "lon"];
    header.extend(features_rest.iter().map(|&i| &features_headers[i]));
    header.extend(coords_rest.iter().map(|&i| &coords_headers[i]));
    writer.write_record(&header).map_err(csv_err(output_path))?;

    let mut written = 0u64;
    for record in features_reader.records() {
        let record = record.map_err(csv_err(features_path))?;
        let Some(key) = coordinate_key(&record[features_lat], &record[features_lon]) else {
            continue;
        };
        let Some(matches) = index.get(&key) else {
            continue;
        };
        for (region_id, coord_rest) in matches {
            // Coordinate cells are emitted as the feature table spells
            // them, so the output round-trips against its left input.
            let mut row: Vec<&str> = vec![region_id, &record[features_lat], &record[features_lon]];
            row.extend(features_rest.iter().map(|&i| record.get(i).unwrap_or_default()));
            row.extend(coord_rest.iter().map(String::as_str));
            writer.write_record(&row).map_err(csv_err(output_path))?;
            written += 1;
        }
    }

    writer.flush().map_err(|source| MergeError::Io {
        path: output_path.display().to_string(),
        source,
    })?;
    log::info!("merged {written} rows into {}", output_path.display());
    Ok(written)
}

/// Counts rows with a distinct combination of the named key columns.
///
/// # Errors
///
/// Returns [`MergeError`] if the file is unreadable or a key column is
/// missing.
pub fn count_distinct(path: &Path, key_columns: &[&str]) -> Result<u64, MergeError> {
    let groups = key_group_sizes(path, key_columns)?;
    Ok(groups.len() as u64)
}

/// Counts every row that belongs to a duplicated key group.
///
/// A group of k identical keys contributes k to the count (not k - 1),
/// matching a keep-none duplicate audit: the result is "how many rows
/// are involved in any duplication".
///
/// # Errors
///
/// Returns [`MergeError`] if the file is unreadable or a key column is
/// missing.
pub fn count_duplicates(path: &Path, key_columns: &[&str]) -> Result<u64, MergeError> {
    let groups = key_group_sizes(path, key_columns)?;
    Ok(groups.values().filter(|&&count| count > 1).sum())
}

fn key_group_sizes(
    path: &Path,
    key_columns: &[&str],
) -> Result<HashMap<Vec<String>, u64>, MergeError> {
    let mut reader = open_reader(path)?;
    let headers = reader.headers().map_err(csv_err(path))?.clone();
    let indices: Vec<usize> = key_columns
        .iter()
        .map(|name| column_index(&headers, name, path))
        .collect::<Result<_, _>>()?;

    let mut groups: HashMap<Vec<String>, u64> = HashMap::new();
    for record in reader.records() {
        let record = record.map_err(csv_err(path))?;
        let key: Vec<String> = indices
            .iter()
            .map(|&i| record.get(i).unwrap_or_default().to_string())
            .collect();
        *groups.entry(key).or_insert(0) += 1;
    }
    Ok(groups)
}

/// Compares the (lat, lon) pair sets of two files.
///
/// # Errors
///
/// Returns [`MergeError`] if either file is unreadable or lacks lat/lon
/// columns.
pub fn compare_overlap(left_path: &Path, right_path: &Path) -> Result<OverlapReport, MergeError> {
    let left = coordinate_set(left_path)?;
    let right = coordinate_set(right_path)?;

    let shared = left.intersection(&right).count() as u64;
    let left_only = left.difference(&right).count() as u64;
    let right_only = right.difference(&left).count() as u64;

    log::info!(
        "{} vs {}: {shared} shared pairs, {left_only} left-only, {right_only} right-only",
        left_path.display(),
        right_path.display()
    );
    Ok(OverlapReport {
        shared,
        left_only,
        right_only,
    })
}

fn coordinate_set(path: &Path) -> Result<HashSet<(u64, u64)>, MergeError> {
    let mut reader = open_reader(path)?;
    let headers = reader.headers().map_err(csv_err(path))?.clone();
    let lat = column_index(&headers, "lat", path)?;
    let lon = column_index(&headers, "lon", path)?;

    let mut pairs = HashSet::new();
    for record in reader.records() {
        let record = record.map_err(csv_err(path))?;
        if let Some(key) = coordinate_key(&record[lat], &record[lon]) {
            pairs.insert(key);
        }
    }
    Ok(pairs)
}

/// Copies the header and first `n` data rows of a file.
///
/// Returns the number of data rows written (less than `n` when the input
/// is shorter).
///
/// # Errors
///
/// Returns [`MergeError`] if the input is unreadable or the output
/// unwritable.
pub fn subset_head(input_path: &Path, output_path: &Path, n: u64) -> Result<u64, MergeError> {
    let mut reader = open_reader(input_path)?;
    let headers = reader.headers().map_err(csv_err(input_path))?.clone();

    let mut writer = csv::Writer::from_path(output_path).map_err(csv_err(output_path))?;
    writer.write_record(&headers).map_err(csv_err(output_path))?;

    let mut written = 0u64;
    for record in reader.records().take(usize::try_from(n).unwrap_or(usize::MAX)) {
        let record = record.map_err(csv_err(input_path))?;
        writer.write_record(&record).map_err(csv_err(output_path))?;
        written += 1;
    }

    writer.flush().map_err(|source| MergeError::Io {
        path: output_path.display().to_string(),
        source,
    })?;
    log::info!("wrote first {written} rows to {}", output_path.display());
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn temp_file(dir_name: &str, file_name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("coord_grid_merge_tests").join(dir_name);
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(file_name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    fn out_path(dir_name: &str, file_name: &str) -> PathBuf {
        std::env::temp_dir()
            .join("coord_grid_merge_tests")
            .join(dir_name)
            .join(file_name)
    }

    #[test]
    fn joins_on_coordinates_and_reorders_columns() {
        let features = temp_file(
            "join",
            "features.csv",
            "Lat,Lon,f0,f1\n10.005,30.005,0.1,0.2\n99.0,99.0,0.3,0.4\n",
        );
        let coords = temp_file(
            "join",
            "coords.csv",
            "row_id,region_id,lon,lat\n1,r1,30.005,10.005\n2,r2,50.0,20.0\n",
        );
        let output = out_path("join", "merged.csv");

        let written = merge_on_coordinates(&features, &coords, &output).unwrap();
        assert_eq!(written, 1);

        let contents = std::fs::read_to_string(&output).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next().unwrap(), "region_id,lat,lon,f0,f1,row_id");
        assert_eq!(lines.next().unwrap(), "r1,10.005,30.005,0.1,0.2,1");
        assert!(lines.next().is_none());
    }

    #[test]
    fn join_emits_one_row_per_matching_coordinate_row() {
        let features = temp_file(
            "join_multi",
            "features.csv",
            "lat,lon,f0\n10.0,30.0,0.5\n",
        );
        // The same pair appears under two regions (legitimate overlap).
        let coords = temp_file(
            "join_multi",
            "coords.csv",
            "row_id,region_id,lon,lat\n1,r1,30.0,10.0\n2,r2,30.0,10.0\n",
        );
        let output = out_path("join_multi", "merged.csv");

        let written = merge_on_coordinates(&features, &coords, &output).unwrap();
        assert_eq!(written, 2);
    }

    #[test]
    fn join_requires_coordinate_columns() {
        let features = temp_file("join_missing", "features.csv", "x,y\n1,2\n");
        let coords = temp_file(
            "join_missing",
            "coords.csv",
            "row_id,region_id,lon,lat\n1,r1,30.0,10.0\n",
        );
        let output = out_path("join_missing", "merged.csv");

        assert!(matches!(
            merge_on_coordinates(&features, &coords, &output),
            Err(MergeError::MissingColumn { .. })
        ));
    }

    #[test]
    fn counts_distinct_and_duplicate_rows() {
        let path = temp_file(
            "counts",
            "points.csv",
            "lat,lon,region_id\n\
             10.0,30.0,a\n\
             10.0,30.0,b\n\
             10.1,30.0,c\n\
             10.2,30.0,d\n\
             10.2,30.0,e\n\
             10.2,30.0,f\n",
        );

        assert_eq!(count_distinct(&path, &["lat", "lon"]).unwrap(), 3);
        // Both members of the 10.0 pair plus all three of the 10.2 pair.
        assert_eq!(count_duplicates(&path, &["lat", "lon"]).unwrap(), 5);
    }

    #[test]
    fn overlap_counts_shared_and_disjoint_pairs() {
        let left = temp_file(
            "overlap",
            "left.csv",
            "lat,lon\n10.0,30.0\n10.1,30.1\n10.2,30.2\n",
        );
        let right = temp_file(
            "overlap",
            "right.csv",
            "Lat,Lon\n10.1,30.1\n10.2,30.2\n10.3,30.3\n10.4,30.4\n",
        );

        let report = compare_overlap(&left, &right).unwrap();
        assert_eq!(
            report,
            OverlapReport {
                shared: 2,
                left_only: 1,
                right_only: 2,
            }
        );
    }

    #[test]
    fn subset_copies_header_and_first_rows() {
        let input = temp_file(
            "subset",
            "input.csv",
            "lat,lon\n1.0,2.0\n3.0,4.0\n5.0,6.0\n",
        );
        let output = out_path("subset", "head.csv");

        assert_eq!(subset_head(&input, &output, 2).unwrap(), 2);
        let contents = std::fs::read_to_string(&output).unwrap();
        assert_eq!(contents, "lat,lon\n1.0,2.0\n3.0,4.0\n");
    }

    #[test]
    fn subset_larger_than_input_copies_everything() {
        let input = temp_file("subset_all", "input.csv", "lat,lon\n1.0,2.0\n");
        let output = out_path("subset_all", "head.csv");
        assert_eq!(subset_head(&input, &output, 100).unwrap(), 1);
    }

    #[test]
    fn missing_file_is_fatal() {
        assert!(count_distinct(Path::new("/nonexistent.csv"), &["lat"]).is_err());
    }
}
