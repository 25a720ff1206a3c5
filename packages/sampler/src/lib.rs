#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Polygon-constrained grid sampling pipeline.
//!
//! For each region: derive the bounding box, round and inset its edges,
//! generate the candidate lattice at the configured resolution, and keep
//! the candidates that pass the containment filter. Regions are
//! independent, so they are sampled on rayon workers and merged back in
//! input order, keeping batch membership reproducible across
//! single-threaded and parallel runs.

pub mod lattice;
pub mod pipeline;
pub mod progress;

pub use lattice::{generate_lattice, rounded_bounds};
pub use pipeline::{SampleRun, sample_region, sample_regions};
pub use progress::{NullProgress, ProgressCallback};
