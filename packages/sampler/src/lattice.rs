//! Rounded-inset bounds and candidate lattice generation.
//!
//! The box edges are snapped to a fixed decimal precision and inset
//! inward by a fixed margin before the lattice is built, so no candidate
//! lands exactly on the true box edge. The lattice intentionally
//! overshoots the rounded upper bound by one step on each axis; the
//! containment filter (or the original-box re-check in bounding-box mode)
//! is responsible for discarding out-of-range points.

use coord_grid_models::{BoundingBox, Candidate, RoundedBounds};

/// Rounds `value` to `precision` decimal digits, half away from zero.
fn round_to(value: f64, precision: i32) -> f64 {
    let scale = 10f64.powi(precision);
    (value * scale).round() / scale
}

/// Applies the round-and-inset policy to a bounding box.
///
/// Each minimum is rounded then pushed up by `margin`; each maximum is
/// rounded then pushed down by `margin`. The result may be inverted
/// (min > max) for boxes narrower than twice the margin; that is not an
/// error and yields an empty lattice.
#[must_use]
pub fn rounded_bounds(bounds: &BoundingBox, precision: i32, margin: f64) -> RoundedBounds {
    RoundedBounds {
        min_lat: round_to(bounds.min_lat, precision) + margin,
        max_lat: round_to(bounds.max_lat, precision) - margin,
        min_lon: round_to(bounds.min_lon, precision) + margin,
        max_lon: round_to(bounds.max_lon, precision) - margin,
    }
}

/// Evenly spaced values `min, min + resolution, ...` up to and including
/// `max + resolution` (one step past the upper bound). Empty when
/// `min > max`.
fn axis_values(min: f64, max: f64, resolution: f64) -> Vec<f64> {
    if min > max || resolution <= 0.0 {
        return Vec::new();
    }
    let stop = max + resolution;
    // Tolerance absorbs accumulated float drift at the last step.
    let tolerance = resolution * 1e-6;
    (0u32..)
        .map(|step| resolution.mul_add(f64::from(step), min))
        .take_while(|value| *value <= stop + tolerance)
        .collect()
}

/// Builds the full cartesian lattice of candidates over the rounded
/// bounds.
///
/// Latitude-major order: for each latitude value, every longitude value
/// in ascending order. The sequence is identical in content and order for
/// identical inputs. An inverted range on either axis produces zero
/// candidates.
#[must_use]
pub fn generate_lattice(rounded: &RoundedBounds, resolution: f64) -> Vec<Candidate> {
    let lons = axis_values(rounded.min_lon, rounded.max_lon, resolution);
    let lats = axis_values(rounded.min_lat, rounded.max_lat, resolution);

    let mut candidates = Vec::with_capacity(lons.len() * lats.len());
    for &lat in &lats {
        for &lon in &lons {
            candidates.push(Candidate { lon, lat });
        }
    }
    candidates
}
