//! Per-region sampling and the fan-out/fan-in across all regions.

use coord_grid_models::{AcceptedPoint, Region, SampleConfig};
use rayon::prelude::*;

use crate::lattice;
use crate::progress::ProgressCallback;

/// Result of sampling a full region set.
#[derive(Debug)]
pub struct SampleRun {
    /// All accepted points, region-major: regions in input order, lattice
    /// order within each region.
    pub points: Vec<AcceptedPoint>,
    /// Regions sampled (including ones that contributed zero points).
    pub regions_sampled: usize,
    /// Regions that contributed zero points (degenerate boundary,
    /// collapsed rounded bounds, or nothing inside).
    pub regions_empty: usize,
}

/// Samples a single region: derive bounds, round and inset, generate the
/// lattice, filter by containment.
///
/// Pure with respect to shared state; geometric anomalies (zero-area
/// boundary, inverted rounded bounds) yield an empty result rather than
/// an error. The region's candidate set exists only for the duration of
/// this call.
#[must_use]
pub fn sample_region(region: &Region, config: &SampleConfig) -> Vec<AcceptedPoint> {
    let bounds = coord_grid_geometry::derive_bounding_box(region);
    let rounded = lattice::rounded_bounds(&bounds, config.rounding_precision, config.inset_margin);
    let candidates = lattice::generate_lattice(&rounded, config.resolution);
    coord_grid_geometry::filter_candidates(&candidates, region, &bounds, config.containment_mode)
}

/// Samples every region and merges the results region-major.
///
/// Regions share no mutable state, so they are fanned out across rayon
/// workers; the ordered collect puts per-region results back in input
/// order, making batch membership reproducible regardless of worker
/// scheduling. A region that contributes nothing never affects its
/// siblings.
#[must_use]
pub fn sample_regions(
    regions: &[Region],
    config: &SampleConfig,
    progress: &dyn ProgressCallback,
) -> SampleRun {
    progress.set_total(regions.len() as u64);

    let per_region: Vec<Vec<AcceptedPoint>> = regions
        .par_iter()
        .map(|region| {
            let accepted = sample_region(region, config);
            log::trace!("region {}: {} accepted points", region.id, accepted.len());
            progress.inc(1);
            accepted
        })
        .collect();

    let total: usize = per_region.iter().map(Vec::len).sum();
    let mut points = Vec::with_capacity(total);
    let mut regions_empty = 0;
    for accepted in per_region {
        if accepted.is_empty() {
            regions_empty += 1;
        }
        points.extend(accepted);
    }

    SampleRun {
        points,
        regions_sampled: regions.len(),
        regions_empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NullProgress;
    use coord_grid_models::{ContainmentMode, SuppliedBounds};
    use geo::{LineString, Polygon};

    fn region(id: &str, row_id: u64, vertices: Vec<(f64, f64)>) -> Region {
        Region {
            id: id.to_string(),
            row_id: Some(row_id),
            boundary: Polygon::new(LineString::from(vertices), vec![]),
            supplied_bounds: None,
        }
    }

    fn square(id: &str, row_id: u64, origin_lon: f64, origin_lat: f64, side: f64) -> Region {
        region(
            id,
            row_id,
            vec![
                (origin_lon, origin_lat),
                (origin_lon + side, origin_lat),
                (origin_lon + side, origin_lat + side),
                (origin_lon, origin_lat + side),
            ],
        )
    }

    #[test]
    fn samples_points_inside_a_square_region() {
        let config = SampleConfig::default();
        let accepted = sample_region(&square("sq", 1, 30.0, 10.0, 0.2), &config);
        assert!(!accepted.is_empty());
        for point in &accepted {
            assert!(point.lon >= 30.0 && point.lon <= 30.2);
            assert!(point.lat >= 10.0 && point.lat <= 10.2);
            assert_eq!(point.region_id, "sq");
        }
    }

    #[test]
    fn degenerate_region_contributes_zero_points() {
        let config = SampleConfig::default();
        let accepted = sample_region(
            &region("line", 1, vec![(0.0, 0.0), (0.1, 0.1), (0.2, 0.2)]),
            &config,
        );
        assert!(accepted.is_empty());
    }

    #[test]
    fn collapsed_rounded_bounds_contribute_zero_candidates() {
        // A box narrower than twice the margin inverts after insetting.
        let config = SampleConfig::default();
        let mut narrow = square("narrow", 1, 30.0, 10.0, 0.004);
        narrow.supplied_bounds = Some(SuppliedBounds {
            min_lat: 10.0,
            max_lat: 10.004,
            min_lon: 30.0,
            max_lon: 30.004,
        });
        assert!(sample_region(&narrow, &config).is_empty());
    }

    #[test]
    fn box_mode_discards_overshoot_outside_original_box() {
        let config = SampleConfig {
            containment_mode: ContainmentMode::BoundingBox,
            ..SampleConfig::default()
        };
        let accepted = sample_region(&square("sq", 1, 30.0, 10.0, 0.2), &config);
        assert!(!accepted.is_empty());
        // The lattice overshoots to ~30.215, but nothing outside the
        // original box may survive.
        for point in &accepted {
            assert!(point.lon >= 30.0 && point.lon <= 30.2);
            assert!(point.lat >= 10.0 && point.lat <= 10.2);
        }
    }

    #[test]
    fn box_mode_accepts_more_than_polygon_mode_for_a_triangle() {
        let triangle = region("tri", 1, vec![(0.0, 0.0), (0.4, 0.0), (0.0, 0.4)]);
        let polygon_config = SampleConfig::default();
        let box_config = SampleConfig {
            containment_mode: ContainmentMode::BoundingBox,
            ..SampleConfig::default()
        };
        let inside_polygon = sample_region(&triangle, &polygon_config).len();
        let inside_box = sample_region(&triangle, &box_config).len();
        assert!(inside_polygon > 0);
        assert!(inside_box > inside_polygon);
    }

    #[test]
    fn merge_is_region_major_in_input_order() {
        let regions = vec![
            square("b", 2, 40.0, 20.0, 0.1),
            square("a", 1, 30.0, 10.0, 0.1),
            square("c", 3, 50.0, 30.0, 0.1),
        ];
        let config = SampleConfig::default();
        let run = sample_regions(&regions, &config, &NullProgress);

        assert_eq!(run.regions_sampled, 3);
        assert_eq!(run.regions_empty, 0);
        let ids: Vec<&str> = run.points.iter().map(|p| p.region_id.as_str()).collect();
        let first_a = ids.iter().position(|id| *id == "a").unwrap();
        let first_c = ids.iter().position(|id| *id == "c").unwrap();
        let last_b = ids.iter().rposition(|id| *id == "b").unwrap();
        // "b" came first in input order, so all of its points precede the
        // first "a" point, and "c" comes last.
        assert!(last_b < first_a);
        assert!(first_a < first_c);
    }

    #[test]
    fn parallel_run_matches_sequential_per_region_results() {
        let regions = vec![
            square("a", 1, 30.0, 10.0, 0.15),
            region("line", 2, vec![(0.0, 0.0), (1.0, 1.0), (2.0, 2.0)]),
            square("b", 3, 31.0, 11.0, 0.15),
        ];
        let config = SampleConfig::default();

        let sequential: Vec<AcceptedPoint> = regions
            .iter()
            .flat_map(|r| sample_region(r, &config))
            .collect();
        let run = sample_regions(&regions, &config, &NullProgress);

        assert_eq!(run.points, sequential);
        assert_eq!(run.regions_empty, 1);
    }

    #[test]
    fn overlapping_regions_emit_shared_points_twice() {
        let regions = vec![
            square("left", 1, 30.0, 10.0, 0.2),
            square("right", 2, 30.1, 10.0, 0.2),
        ];
        let config = SampleConfig::default();
        let run = sample_regions(&regions, &config, &NullProgress);

        let shared: Vec<&AcceptedPoint> = run
            .points
            .iter()
            .filter(|p| (p.lon - 30.155).abs() < 1e-9 && (p.lat - 10.105).abs() < 1e-9)
            .collect();
        assert_eq!(shared.len(), 2);
        assert_ne!(shared[0].region_id, shared[1].region_id);
    }
}
