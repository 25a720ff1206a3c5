#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Core types shared across the coordinate grid sampling pipeline.
//!
//! A [`Region`] is loaded from a tabular source, its [`BoundingBox`] is
//! derived (or carried through from the source as [`SuppliedBounds`]), a
//! candidate lattice is generated inside the rounded-inset bounds, and the
//! candidates that survive the containment filter become [`AcceptedPoint`]s
//! tagged with the region identifier.

use geo::Polygon;
use serde::{Deserialize, Serialize};

/// A named geographic area defined by a boundary polygon.
///
/// Vertices are `(longitude, latitude)` pairs; the closing vertex may
/// repeat the first. The loader guarantees at least 3 distinct vertices,
/// but the boundary may still be degenerate (collinear, zero area) - such
/// regions are valid input and simply contribute zero accepted points.
#[derive(Debug, Clone)]
pub struct Region {
    /// Opaque unique region key (e.g., a census or survey region code).
    pub id: String,
    /// Original row index from the source table, carried through to the
    /// output for traceability.
    pub row_id: Option<u64>,
    /// Boundary polygon in `(lon, lat)` coordinates.
    pub boundary: Polygon<f64>,
    /// Pre-computed min/max extent columns from the source row, if present.
    pub supplied_bounds: Option<SuppliedBounds>,
}

/// Min/max extent columns carried through from the input table.
///
/// Some source tables already ship per-region bounds; the deriver reuses
/// them verbatim instead of recomputing from the boundary vertices.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SuppliedBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Inclusive bounding box of a region boundary, plus the polygon's area
/// centroid.
///
/// Derived once per region and immutable afterward. `min <= max` holds on
/// both axes. The centroid is the area-weighted polygon centroid, falling
/// back to the vertex average for zero-area boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
    /// Area centroid longitude.
    pub centroid_lon: f64,
    /// Area centroid latitude.
    pub centroid_lat: f64,
}

/// Bounding box edges snapped to a fixed decimal precision and inset
/// inward by a fixed margin.
///
/// `min <= max` is NOT guaranteed here: a box narrower than twice the
/// margin collapses to an inverted range, which yields an empty lattice
/// rather than an error.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RoundedBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// An ephemeral lattice point, produced by the grid generator and consumed
/// by the containment filter. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    pub lon: f64,
    pub lat: f64,
}

/// A candidate that passed containment, stamped with its source region.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceptedPoint {
    /// Identifier of the region the point fell inside.
    pub region_id: String,
    /// Original row index of the region's source row, if present.
    pub row_id: Option<u64>,
    pub lon: f64,
    pub lat: f64,
}

/// How candidate points are tested for region membership.
///
/// The mode is explicit per invocation - nothing infers it. A point lying
/// in two overlapping regions is legitimately emitted twice, once per
/// region, under either mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContainmentMode {
    /// Boundary-inclusive point-in-polygon test against the exact
    /// boundary. Points exactly on an edge or vertex count as inside.
    #[default]
    Polygon,
    /// Membership in the original (unrounded) bounding box, inclusive on
    /// all four sides. Used when only a box, not the full boundary, is
    /// available downstream.
    BoundingBox,
}

/// Tunable parameters for a sampling run, deserializable from TOML.
///
/// All fields have defaults, so a config file only needs to name the
/// values it overrides.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SampleConfig {
    /// Grid spacing in degrees.
    pub resolution: f64,
    /// Decimal digits the box edges are rounded to before insetting.
    pub rounding_precision: i32,
    /// Inward inset applied after rounding, in degrees.
    pub inset_margin: f64,
    /// Maximum rows per output batch file.
    pub max_rows_per_batch: usize,
    /// Containment test applied to lattice candidates.
    pub containment_mode: ContainmentMode,
}

impl Default for SampleConfig {
    fn default() -> Self {
        Self {
            resolution: 0.01,
            rounding_precision: 2,
            inset_margin: 0.005,
            max_rows_per_batch: 100_000,
            containment_mode: ContainmentMode::Polygon,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_config_defaults() {
        let config = SampleConfig::default();
        assert!((config.resolution - 0.01).abs() < f64::EPSILON);
        assert_eq!(config.rounding_precision, 2);
        assert!((config.inset_margin - 0.005).abs() < f64::EPSILON);
        assert_eq!(config.max_rows_per_batch, 100_000);
        assert_eq!(config.containment_mode, ContainmentMode::Polygon);
    }

    #[test]
    fn containment_mode_defaults_to_polygon() {
        assert_eq!(ContainmentMode::default(), ContainmentMode::Polygon);
    }
}
