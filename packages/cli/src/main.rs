#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! CLI entry point for the coord-grid toolchain.
//!
//! Samples dense coordinate grids inside region boundary polygons and
//! writes them as size-bounded CSV batches, plus a set of
//! coordinate-table utilities (join, duplicate audit, overlap
//! comparison, subset). Invoked with no subcommand it falls back to an
//! interactive tool picker.
//!
//! Uses `indicatif-log-bridge` (via [`coord_grid_cli_utils::init_logger`])
//! to route `log` output through `indicatif::MultiProgress` so that log
//! lines and progress bars never fight for the terminal.

mod commands;
mod interactive;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use coord_grid_models::ContainmentMode;

#[derive(Parser)]
#[command(name = "coord_grid", about = "Coordinate grid sampling toolchain")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample a coordinate grid inside each region boundary and write
    /// batched output files
    Sample {
        /// Region source CSV (`region_id` + `boundary` columns, optional
        /// `row_id` and pre-computed bounds columns)
        #[arg(long)]
        input: PathBuf,
        /// Directory batch files are written to
        #[arg(long, default_value = ".")]
        output_dir: PathBuf,
        /// TOML file with sampling parameters; explicit flags override it
        #[arg(long)]
        config: Option<PathBuf>,
        /// Grid spacing in degrees
        #[arg(long)]
        resolution: Option<f64>,
        /// Decimal digits the box edges are rounded to
        #[arg(long)]
        precision: Option<i32>,
        /// Inward inset after rounding, in degrees
        #[arg(long)]
        margin: Option<f64>,
        /// Maximum rows per batch file
        #[arg(long)]
        max_rows: Option<usize>,
        /// Containment test applied to lattice candidates
        #[arg(long, value_enum)]
        mode: Option<ModeArg>,
    },
    /// Inner-join a feature table with a coordinate table on (lat, lon)
    Merge {
        /// Feature table CSV (lat/lon plus feature columns)
        #[arg(long)]
        features: PathBuf,
        /// Coordinate table CSV (the sampler's batch output)
        #[arg(long)]
        coordinates: PathBuf,
        /// Where the joined table is written
        #[arg(long)]
        output: PathBuf,
    },
    /// Count distinct (lat, lon) rows in a file
    Unique {
        /// File to audit
        file: PathBuf,
    },
    /// Count rows involved in duplicated (lat, lon) pairs
    Duplicates {
        /// File to audit
        file: PathBuf,
    },
    /// Compare the coordinate pair sets of two files
    Overlap {
        /// Left file
        left: PathBuf,
        /// Right file
        right: PathBuf,
    },
    /// Copy the header and first N rows of a file
    Subset {
        /// Source file
        #[arg(long)]
        input: PathBuf,
        /// Destination file
        #[arg(long)]
        output: PathBuf,
        /// Rows to copy
        #[arg(long, default_value = "100")]
        rows: u64,
    },
}

/// `--mode` values for the sample subcommand.
#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Boundary-inclusive point-in-polygon test
    Polygon,
    /// Inclusive membership in the original bounding box
    BoundingBox,
}

impl From<ModeArg> for ContainmentMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Polygon => Self::Polygon,
            ModeArg::BoundingBox => Self::BoundingBox,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let multi = coord_grid_cli_utils::init_logger();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        return interactive::run(&multi);
    };

    match command {
        Commands::Sample {
            input,
            output_dir,
            config,
            resolution,
            precision,
            margin,
            max_rows,
            mode,
        } => {
            let config = commands::resolve_config(
                config.as_deref(),
                commands::Overrides {
                    resolution,
                    precision,
                    margin,
                    max_rows,
                    mode: mode.map(Into::into),
                },
            )?;
            commands::sample(&input, &output_dir, &config, &multi)?;
        }
        Commands::Merge {
            features,
            coordinates,
            output,
        } => {
            let written = coord_grid_merge::merge_on_coordinates(&features, &coordinates, &output)?;
            println!("Successfully merged {written} rows into {}", output.display());
        }
        Commands::Unique { file } => {
            let distinct = coord_grid_merge::count_distinct(&file, &["lat", "lon"])?;
            println!("Total number of distinct rows based on lat/lon: {distinct}");
        }
        Commands::Duplicates { file } => {
            let duplicates = coord_grid_merge::count_duplicates(&file, &["lat", "lon"])?;
            println!("Total number of duplicate rows based on lat/lon: {duplicates}");
        }
        Commands::Overlap { left, right } => {
            let report = coord_grid_merge::compare_overlap(&left, &right)?;
            println!("Shared lat/lon pairs: {}", report.shared);
            println!("Pairs only in {}: {}", left.display(), report.left_only);
            println!("Pairs only in {}: {}", right.display(), report.right_only);
        }
        Commands::Subset {
            input,
            output,
            rows,
        } => {
            let written = coord_grid_merge::subset_head(&input, &output, rows)?;
            println!("First {written} rows saved to {}", output.display());
        }
    }

    Ok(())
}
