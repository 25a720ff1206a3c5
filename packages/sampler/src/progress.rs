//! Progress reporting for sampling runs.
//!
//! The pipeline reports per-region progress through a small trait so that
//! callers can plug in a rendering backend (an `indicatif` bar, log-only
//! output, or nothing at all) without this crate depending on one.

/// Receives progress updates from a sampling run.
///
/// Implementations must be `Send + Sync`: regions are sampled on rayon
/// workers, each of which reports completion independently.
pub trait ProgressCallback: Send + Sync {
    /// Total number of regions about to be sampled.
    fn set_total(&self, total: u64);

    /// One more region finished sampling.
    fn inc(&self, delta: u64);

    /// The run completed; `msg` summarizes it.
    fn finish(&self, msg: String);
}

/// A [`ProgressCallback`] that ignores every update.
///
/// Used by tests and non-interactive callers.
pub struct NullProgress;

impl ProgressCallback for NullProgress {
    fn set_total(&self, _total: u64) {}
    fn inc(&self, _delta: u64) {}
    fn finish(&self, _msg: String) {}
}
