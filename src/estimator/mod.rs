//! Iterative refinement of slice z-coordinates.
//!
//! Overview
//! - Sorts the current coordinates and views the correlation matrix in rank
//!   order through a zero-copy permutation.
//! - Fits the expected correlation-vs-distance curve per categorizer bin.
//! - Estimates a quality multiplier and a confidence weight for each slice.
//! - Lets every in-range neighbour propose a shift for each slice, mediates
//!   the proposals and applies a smoothed, damped update.
//! - Optionally keeps slices from swapping order and anchors the rank
//!   extremes to `0` and `n − 1`.
//!
//! Modules
//! - [`options`] – the loop knobs ([`RunOptions`]).
//! - [`params`] – capability selections and failure policy.
//! - `pipeline` – the [`CoordinateEstimator`] itself.
//! - `state` – the working state carried between iterations.

pub mod options;
pub mod params;
mod pipeline;
mod state;

pub use options::RunOptions;
pub use params::{EstimatorParams, FailurePolicy};
pub use pipeline::CoordinateEstimator;
