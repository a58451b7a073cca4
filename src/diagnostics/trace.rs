use super::timing::TimingBreakdown;
use crate::observer::IterationObservation;
use serde::Serialize;

/// Result produced by
/// [`CoordinateEstimator::estimate_with_diagnostics`](crate::CoordinateEstimator).
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationReport {
    pub coordinates: Vec<f64>,
    pub trace: EstimationTrace,
}

/// End-to-end trace of one estimator run.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationTrace {
    pub slices: usize,
    pub iterations: Vec<IterationSummary>,
    pub timings: TimingBreakdown,
}

/// Aggregate statistics of one iteration.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationSummary {
    pub iteration: usize,
    pub bins: usize,
    pub opinions: usize,
    pub mean_multiplier: f64,
    pub min_multiplier: f64,
    pub min_weight: f64,
    pub mean_abs_shift: f64,
    pub max_abs_shift: f64,
    pub monotonic_corrections: usize,
    /// False when regularization is disabled or was skipped after a failure.
    pub regularized: bool,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        0.0
    } else {
        values.iter().sum::<f64>() / values.len() as f64
    }
}

fn min(values: &[f64]) -> f64 {
    values.iter().copied().fold(f64::INFINITY, f64::min)
}

impl IterationSummary {
    pub fn from_observation(
        observation: &IterationObservation<'_>,
        bins: usize,
        opinions: usize,
        monotonic_corrections: usize,
        regularized: bool,
    ) -> Self {
        let abs_shifts: Vec<f64> = observation.shifts.iter().map(|s| s.abs()).collect();
        Self {
            iteration: observation.iteration,
            bins,
            opinions,
            mean_multiplier: mean(observation.multipliers),
            min_multiplier: min(observation.multipliers),
            min_weight: min(observation.weights),
            mean_abs_shift: mean(&abs_shifts),
            max_abs_shift: abs_shifts.iter().copied().fold(0.0, f64::max),
            monotonic_corrections,
            regularized,
        }
    }
}
