#![doc = include_str!("../README.md")]

// Public modules (stable-ish surface)
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod estimator;
pub mod io;
pub mod matrix;
pub mod observer;

// Stage building blocks – public for custom pipelines and tests.
pub mod categorizer;
pub mod constraints;
pub mod fit;
pub mod parallel;
pub mod permutation;
pub mod quality;
pub mod shifts;

// --- High-level re-exports -------------------------------------------------

// Main entry points: estimator + configuration.
pub use crate::estimator::{CoordinateEstimator, EstimatorParams, FailurePolicy, RunOptions};
pub use crate::matrix::{CorrelationMatrix, MatrixView, PermutedMatrix};

// Errors and diagnostics returned by the estimator.
pub use crate::diagnostics::{EstimationReport, EstimationTrace};
pub use crate::error::{EstimationError, EstimationResult, FitError, Stage};

// Observation hooks.
pub use crate::observer::{IterationObservation, IterationObserver, SnapshotCollector};

// --- Prelude ---------------------------------------------------------------

/// Small prelude for quick experiments.
///
/// ```no_run
/// use z_spacing::prelude::*;
///
/// # fn main() {
/// let n = 20;
/// let matrix = CorrelationMatrix::banded(n, 4, |i, j| 1.0 - 0.1 * i.abs_diff(j) as f64);
/// let start: Vec<f64> = (0..n).map(|i| i as f64).collect();
///
/// let estimator = CoordinateEstimator::new(EstimatorParams::with_options(RunOptions {
///     comparison_range: 4,
///     ..Default::default()
/// }));
/// let z = estimator.estimate(&matrix, &start).unwrap();
/// println!("first={:.3} last={:.3}", z[0], z[n - 1]);
/// # }
/// ```
pub mod prelude {
    pub use crate::categorizer::CategorizerKind;
    pub use crate::fit::FitModelKind;
    pub use crate::shifts::MediatorKind;
    pub use crate::{
        CoordinateEstimator, CorrelationMatrix, EstimationError, EstimatorParams, RunOptions,
    };
}
