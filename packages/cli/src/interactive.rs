//! Interactive tool picker, used when the binary is invoked without a
//! subcommand.

use std::path::Path;

use coord_grid_cli_utils::MultiProgress;
use coord_grid_models::{ContainmentMode, SampleConfig};
use dialoguer::{Input, Select};

use crate::commands;

/// Top-level tool selection for the coord-grid toolchain.
enum Tool {
    Sample,
    Merge,
    Unique,
    Duplicates,
    Overlap,
    Subset,
}

impl Tool {
    const ALL: &[Self] = &[
        Self::Sample,
        Self::Merge,
        Self::Unique,
        Self::Duplicates,
        Self::Overlap,
        Self::Subset,
    ];

    #[must_use]
    const fn label(&self) -> &'static str {
        match self {
            Self::Sample => "Sample coordinate grids from region boundaries",
            Self::Merge => "Merge a feature table with a coordinate table",
            Self::Unique => "Count distinct coordinate rows",
            Self::Duplicates => "Count duplicated coordinate rows",
            Self::Overlap => "Compare coordinate pairs of two files",
            Self::Subset => "Extract the first N rows of a file",
        }
    }
}

pub fn run(multi: &MultiProgress) -> Result<(), Box<dyn std::error::Error>> {
    println!("coord-grid Toolchain");
    println!();

    let labels: Vec<&str> = Tool::ALL.iter().map(Tool::label).collect();

    let idx = Select::new()
        .with_prompt("What would you like to do?")
        .items(&labels)
        .default(0)
        .interact()?;

    match Tool::ALL[idx] {
        Tool::Sample => {
            let input: String = Input::new().with_prompt("Region source CSV").interact_text()?;
            let output_dir: String = Input::new()
                .with_prompt("Output directory")
                .default(".".to_string())
                .interact_text()?;
            let mode_idx = Select::new()
                .with_prompt("Containment mode")
                .items(&["polygon (exact boundary)", "bounding box"])
                .default(0)
                .interact()?;

            let config = SampleConfig {
                containment_mode: if mode_idx == 0 {
                    ContainmentMode::Polygon
                } else {
                    ContainmentMode::BoundingBox
                },
                ..SampleConfig::default()
            };
            commands::sample(Path::new(&input), Path::new(&output_dir), &config, multi)
        }
        Tool::Merge => {
            let features: String = Input::new().with_prompt("Feature table CSV").interact_text()?;
            let coordinates: String = Input::new()
                .with_prompt("Coordinate table CSV")
                .interact_text()?;
            let output: String = Input::new().with_prompt("Output CSV").interact_text()?;
            let written = coord_grid_merge::merge_on_coordinates(
                Path::new(&features),
                Path::new(&coordinates),
                Path::new(&output),
            )?;
            println!("Successfully merged {written} rows into {output}");
            Ok(())
        }
        Tool::Unique => {
            let file: String = Input::new().with_prompt("File to audit").interact_text()?;
            let distinct = coord_grid_merge::count_distinct(Path::new(&file), &["lat", "lon"])?;
            println!("Total number of distinct rows based on lat/lon: {distinct}");
            Ok(())
        }
        Tool::Duplicates => {
            let file: String = Input::new().with_prompt("File to audit").interact_text()?;
            let duplicates =
                coord_grid_merge::count_duplicates(Path::new(&file), &["lat", "lon"])?;
            println!("Total number of duplicate rows based on lat/lon: {duplicates}");
            Ok(())
        }
        Tool::Overlap => {
            let left: String = Input::new().with_prompt("Left file").interact_text()?;
            let right: String = Input::new().with_prompt("Right file").interact_text()?;
            let report =
                coord_grid_merge::compare_overlap(Path::new(&left), Path::new(&right))?;
            println!("Shared lat/lon pairs: {}", report.shared);
            println!("Pairs only in {left}: {}", report.left_only);
            println!("Pairs only in {right}: {}", report.right_only);
            Ok(())
        }
        Tool::Subset => {
            let input: String = Input::new().with_prompt("Source file").interact_text()?;
            let output: String = Input::new().with_prompt("Destination file").interact_text()?;
            let rows: u64 = Input::new()
                .with_prompt("Rows to copy")
                .default(100u64)
                .interact_text()?;
            let written =
                coord_grid_merge::subset_head(Path::new(&input), Path::new(&output), rows)?;
            println!("First {written} rows saved to {output}");
            Ok(())
        }
    }
}
