#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Planar geometry for region sampling.
//!
//! Derives per-region bounding boxes (min/max extent plus the polygon's
//! area centroid) and filters lattice candidates down to the points that
//! lie inside a region, under either the exact-boundary test or the
//! bounding-box test.

use coord_grid_models::{AcceptedPoint, BoundingBox, Candidate, ContainmentMode, Region};
use geo::{Area, BoundingRect, Centroid, Intersects, Point, Polygon, Rect, coord};

/// Derives the bounding box and centroid for a region.
///
/// Min/max are computed over all boundary vertices on each axis, unless
/// the source row already supplied them, in which case the supplied values
/// are reused verbatim. The centroid is always computed from the boundary:
/// the area-weighted polygon centroid, or the vertex average when the
/// boundary has zero area (collinear or duplicate vertices). Never fails.
///
/// The resulting box closed-contains every boundary vertex.
#[must_use]
pub fn derive_bounding_box(region: &Region) -> BoundingBox {
    let (centroid_lon, centroid_lat) = boundary_centroid(&region.boundary);

    if let Some(supplied) = region.supplied_bounds {
        return BoundingBox {
            min_lat: supplied.min_lat,
            max_lat: supplied.max_lat,
            min_lon: supplied.min_lon,
            max_lon: supplied.max_lon,
            centroid_lon,
            centroid_lat,
        };
    }

    let rect = region.boundary.bounding_rect().unwrap_or_else(|| {
        Rect::new(coord! { x: 0.0, y: 0.0 }, coord! { x: 0.0, y: 0.0 })
    });

    BoundingBox {
        min_lat: rect.min().y,
        max_lat: rect.max().y,
        min_lon: rect.min().x,
        max_lon: rect.max().x,
        centroid_lon,
        centroid_lat,
    }
}

/// Area centroid of a boundary, with vertex-average fallback for
/// zero-area rings.
///
/// The area centroid and the vertex average differ for non-convex
/// polygons, and downstream consumers rely on the area-weighted value.
fn boundary_centroid(boundary: &Polygon<f64>) -> (f64, f64) {
    if boundary.unsigned_area() > 0.0
        && let Some(point) = boundary.centroid()
    {
        return (point.x(), point.y());
    }
    vertex_average(boundary)
}

/// Plain average of the exterior vertices, excluding the closing repeat.
fn vertex_average(boundary: &Polygon<f64>) -> (f64, f64) {
    let exterior = boundary.exterior();
    let count = exterior.0.len().saturating_sub(1);
    if count == 0 {
        return (0.0, 0.0);
    }
    let (sum_x, sum_y) = exterior.0[..count]
        .iter()
        .fold((0.0, 0.0), |(sx, sy), c| (sx + c.x, sy + c.y));
    #[allow(clippy::cast_precision_loss)]
    let n = count as f64;
    (sum_x / n, sum_y / n)
}

/// Boundary-inclusive point-in-polygon test.
///
/// Points exactly on an edge or vertex count as inside. A zero-area
/// boundary contains nothing, including its own vertices.
#[must_use]
pub fn polygon_contains(boundary: &Polygon<f64>, lon: f64, lat: f64) -> bool {
    if boundary.unsigned_area() == 0.0 {
        return false;
    }
    boundary.intersects(&Point::new(lon, lat))
}

/// Membership in the original (unrounded) box, inclusive on all four
/// sides.
#[must_use]
pub fn box_contains(bounds: &BoundingBox, lon: f64, lat: f64) -> bool {
    lon >= bounds.min_lon
        && lon <= bounds.max_lon
        && lat >= bounds.min_lat
        && lat <= bounds.max_lat
}

/// Filters lattice candidates down to the points inside the region,
/// stamping survivors with the region identifier and row index.
///
/// The mode is explicit: `Polygon` tests against the exact boundary,
/// `BoundingBox` tests against the original box. Either test also
/// discards the lattice generator's intentional one-step overshoot past
/// the rounded upper bounds. No deduplication happens here; overlapping
/// regions legitimately emit shared points once each.
#[must_use]
pub fn filter_candidates(
    candidates: &[Candidate],
    region: &Region,
    bounds: &BoundingBox,
    mode: ContainmentMode,
) -> Vec<AcceptedPoint> {
    let stamp = |candidate: &Candidate| AcceptedPoint {
        region_id: region.id.clone(),
        row_id: region.row_id,
        lon: candidate.lon,
        lat: candidate.lat,
    };

    match mode {
        ContainmentMode::Polygon => {
            if region.boundary.unsigned_area() == 0.0 {
                log::debug!("region {}: degenerate boundary, no points", region.id);
                return Vec::new();
            }
            candidates
                .iter()
                .filter(|c| region.boundary.intersects(&Point::new(c.lon, c.lat)))
                .map(stamp)
                .collect()
        }
        ContainmentMode::BoundingBox => candidates
            .iter()
            .filter(|c| box_contains(bounds, c.lon, c.lat))
            .map(stamp)
            .collect(),
    }
}
