//! Sample command implementation and config resolution.

use std::path::Path;

use coord_grid_cli_utils::{IndicatifProgress, MultiProgress};
use coord_grid_models::{ContainmentMode, SampleConfig};

/// Explicit flag values that take precedence over the config file.
#[derive(Default)]
pub struct Overrides {
    pub resolution: Option<f64>,
    pub precision: Option<i32>,
    pub margin: Option<f64>,
    pub max_rows: Option<usize>,
    pub mode: Option<ContainmentMode>,
}

/// Builds the effective [`SampleConfig`]: built-in defaults, overlaid by
/// the TOML config file (if any), overlaid by explicit flags.
pub fn resolve_config(
    config_path: Option<&Path>,
    overrides: Overrides,
) -> Result<SampleConfig, Box<dyn std::error::Error>> {
    let mut config = match config_path {
        Some(path) => toml::from_str(&std::fs::read_to_string(path)?)?,
        None => SampleConfig::default(),
    };

    if let Some(resolution) = overrides.resolution {
        config.resolution = resolution;
    }
    if let Some(precision) = overrides.precision {
        config.rounding_precision = precision;
    }
    if let Some(margin) = overrides.margin {
        config.inset_margin = margin;
    }
    if let Some(max_rows) = overrides.max_rows {
        config.max_rows_per_batch = max_rows;
    }
    if let Some(mode) = overrides.mode {
        config.containment_mode = mode;
    }

    Ok(config)
}

/// Runs the full sampling pipeline: load regions, sample each one on
/// rayon workers, merge region-major, write batch files, report a
/// summary.
pub fn sample(
    input: &Path,
    output_dir: &Path,
    config: &SampleConfig,
    multi: &MultiProgress,
) -> Result<(), Box<dyn std::error::Error>> {
    log::info!(
        "Sampling {} at resolution {} ({:?} containment)",
        input.display(),
        config.resolution,
        config.containment_mode
    );

    let outcome = coord_grid_loader::load_regions(input)?;

    let bar = IndicatifProgress::regions_bar(multi, "Sampling regions");
    let run = coord_grid_sampler::sample_regions(&outcome.regions, config, bar.as_ref());
    bar.finish(format!(
        "Sampled {} regions, {} points",
        run.regions_sampled,
        run.points.len()
    ));

    std::fs::create_dir_all(output_dir)?;
    let files = coord_grid_batch::write_batches(&run.points, output_dir, config.max_rows_per_batch)?;

    log::info!(
        "Run complete: {} regions processed, {} skipped, {} empty, {} points accepted, {} batch file(s)",
        run.regions_sampled,
        outcome.skipped,
        run.regions_empty,
        run.points.len(),
        files.len()
    );

    Ok(())
}
