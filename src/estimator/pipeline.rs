//! Estimator loop driving the refinement end-to-end.
//!
//! Each iteration runs the stages in a fixed order:
//! permute → fit → quality → collect → mediate → smooth/apply →
//! [monotonic] → [regularize] → observe.
//! Every stage finishes before the next starts and iteration `k + 1` only
//! sees the fully updated state of iteration `k`.
//!
//! Typical usage:
//! ```no_run
//! use z_spacing::{CoordinateEstimator, CorrelationMatrix, EstimatorParams};
//!
//! # fn example(matrix: CorrelationMatrix, start: Vec<f64>) {
//! let estimator = CoordinateEstimator::new(EstimatorParams::default());
//! match estimator.estimate(&matrix, &start) {
//!     Ok(coordinates) => println!("last slice at z={:.3}", coordinates[coordinates.len() - 1]),
//!     Err(err) => eprintln!("estimation failed: {err}"),
//! }
//! # }
//! ```
use super::params::{EstimatorParams, FailurePolicy};
use super::state::IterationState;
use crate::categorizer::Categorizer;
use crate::constraints::{GlobalRegularizer, MonotonicityEnforcer};
use crate::diagnostics::timing::elapsed_ms;
use crate::diagnostics::{EstimationReport, EstimationTrace, IterationSummary, TimingBreakdown};
use crate::error::{EstimationError, EstimationResult, Stage};
use crate::fit::{CorrelationFit, LocalCorrelationFitter};
use crate::matrix::{CorrelationMatrix, MatrixView};
use crate::observer::{IterationObservation, IterationObserver, NoopObserver};
use crate::quality::SliceQualityEstimator;
use crate::shifts::{collect_shifts, mediate_all, ShiftMediator, ShiftSmoother};
use log::{debug, warn};
use std::time::Instant;

/// Iterative z-coordinate estimator for a stack of serial sections.
pub struct CoordinateEstimator {
    params: EstimatorParams,
    fit_model: Box<dyn CorrelationFit>,
    mediator: Box<dyn ShiftMediator>,
    categorizer: Option<Box<dyn Categorizer>>,
}

impl CoordinateEstimator {
    /// Create an estimator using the capabilities selected in `params`.
    pub fn new(params: EstimatorParams) -> Self {
        let fit_model = params.fit_model.build();
        let mediator = params.mediator.build();
        Self {
            params,
            fit_model,
            mediator,
            categorizer: None,
        }
    }

    pub fn params(&self) -> &EstimatorParams {
        &self.params
    }

    /// Replace the fit model selected in the params.
    pub fn with_fit_model(mut self, fit_model: Box<dyn CorrelationFit>) -> Self {
        self.fit_model = fit_model;
        self
    }

    /// Replace the mediator selected in the params.
    pub fn with_mediator(mut self, mediator: Box<dyn ShiftMediator>) -> Self {
        self.mediator = mediator;
        self
    }

    /// Use a fixed categorizer instead of building one per stack size.
    pub fn with_categorizer(mut self, categorizer: Box<dyn Categorizer>) -> Self {
        self.categorizer = Some(categorizer);
        self
    }

    /// Refine `start` against `matrix`, returning slice-indexed coordinates.
    pub fn estimate(&self, matrix: &CorrelationMatrix, start: &[f64]) -> EstimationResult<Vec<f64>> {
        self.estimate_with_observer(matrix, start, &mut NoopObserver)
    }

    /// Like [`estimate`](Self::estimate), handing every completed iteration
    /// to `observer`.
    pub fn estimate_with_observer(
        &self,
        matrix: &CorrelationMatrix,
        start: &[f64],
        observer: &mut dyn IterationObserver,
    ) -> EstimationResult<Vec<f64>> {
        self.run(matrix, start, observer)
            .map(|report| report.coordinates)
    }

    /// Run and return both the coordinates and a per-iteration trace.
    pub fn estimate_with_diagnostics(
        &self,
        matrix: &CorrelationMatrix,
        start: &[f64],
    ) -> EstimationResult<EstimationReport> {
        self.run(matrix, start, &mut NoopObserver)
    }

    fn validate(&self, matrix: &CorrelationMatrix, start: &[f64]) -> EstimationResult<()> {
        let n = matrix.size();
        if start.len() != n {
            return Err(EstimationError::LengthMismatch {
                matrix: n,
                coordinates: start.len(),
            });
        }
        self.params.options.validate(n)?;
        if let Some((index, &value)) = start.iter().enumerate().find(|(_, v)| !v.is_finite()) {
            return Err(EstimationError::NonFiniteCoordinate { index, value });
        }
        Ok(())
    }

    /// Full entry point: trace every iteration and hand it to `observer`.
    pub fn run(
        &self,
        matrix: &CorrelationMatrix,
        start: &[f64],
        observer: &mut dyn IterationObserver,
    ) -> EstimationResult<EstimationReport> {
        let total_start = Instant::now();
        let mut timings = TimingBreakdown::default();
        timings.time(Stage::Validate, || self.validate(matrix, start))?;

        let opts = &self.params.options;
        let parallel = self.params.parallel;
        let n = matrix.size();
        debug!(
            "CoordinateEstimator::estimate start n={} iterations={} range={} reorder={} regularize={}",
            n, opts.n_iterations, opts.comparison_range, opts.with_reorder, opts.with_regularization
        );

        let built_categorizer;
        let categorizer: &dyn Categorizer = match &self.categorizer {
            Some(categorizer) => categorizer.as_ref(),
            None => {
                built_categorizer = self.params.categorizer.build(n);
                built_categorizer.as_ref()
            }
        };
        let fitter =
            LocalCorrelationFitter::new(self.fit_model.as_ref(), categorizer, opts.comparison_range);
        let quality = SliceQualityEstimator {
            regularizer_weight: opts.multiplier_generation_regularizer_weight,
            iterations: opts.multiplier_estimation_iterations,
            range: opts.comparison_range,
            weights_sigma: opts.multiplier_weights_sigma,
        };
        let smoother = ShiftSmoother {
            range: opts.shifts_smoothing_range,
            sigma: opts.shifts_smoothing_sigma,
            shift_proportion: opts.shift_proportion,
            update_regularizer_weight: opts.coordinate_update_regularizer_weight,
        };
        let enforcer = MonotonicityEnforcer::new(opts.minimum_section_thickness);

        let mut state = IterationState::new(start);
        let mut summaries = Vec::with_capacity(opts.n_iterations);

        for iteration in 1..=opts.n_iterations {
            timings.time(Stage::Permute, || state.reindex());
            let IterationState {
                coordinates,
                weights,
                multipliers,
                index,
            } = &mut state;
            let view = index.permute(matrix);
            let sorted = index.sorted_coordinates();

            let fits = timings.time(Stage::Fit, || {
                fitter.fit(&view, sorted, weights, multipliers, parallel)
            })?;
            timings.time(Stage::Quality, || {
                quality.estimate(&view, sorted, &fits, weights, multipliers, parallel)
            });
            let opinions = timings.time(Stage::Collect, || {
                collect_shifts(
                    &view,
                    sorted,
                    weights,
                    multipliers,
                    &fits,
                    opts.comparison_range,
                    parallel,
                )
            });
            let shifts = timings.time(Stage::Mediate, || {
                mediate_all(self.mediator.as_ref(), &opinions, parallel)
            })?;
            timings.time(Stage::Smooth, || {
                let smoothed = smoother.smooth(&shifts, weights);
                smoother.apply(coordinates, index.permutation(), &smoothed);
            });

            let corrections = if opts.with_reorder {
                0
            } else {
                timings.time(Stage::Monotonic, || {
                    enforcer.enforce(coordinates, index.permutation())
                })
            };
            let regularized = if opts.with_regularization {
                timings.time(Stage::Regularize, || {
                    self.regularize(coordinates, index.permutation(), iteration)
                })?
            } else {
                false
            };

            let observation = IterationObservation {
                iteration,
                matrix: view,
                coordinates: coordinates.as_slice(),
                permutation: index.permutation(),
                inverse: index.inverse(),
                multipliers: multipliers.as_slice(),
                weights: weights.as_slice(),
                shifts: &shifts,
            };
            let summary = IterationSummary::from_observation(
                &observation,
                fits.fits().len(),
                opinions.total(),
                corrections,
                regularized,
            );
            debug!(
                "CoordinateEstimator: iteration {} opinions={} mean|shift|={:.4} max|shift|={:.4} min weight={:.4}",
                iteration,
                summary.opinions,
                summary.mean_abs_shift,
                summary.max_abs_shift,
                summary.min_weight
            );
            observer.observe(&observation);
            summaries.push(summary);
        }

        timings.total_ms = elapsed_ms(total_start);
        debug!(
            "CoordinateEstimator::estimate done in {:.3} ms",
            timings.total_ms
        );
        Ok(EstimationReport {
            coordinates: state.coordinates,
            trace: EstimationTrace {
                slices: n,
                iterations: summaries,
                timings,
            },
        })
    }

    /// Apply the global regularizer under the configured failure policy.
    /// Returns whether the coordinates were changed.
    fn regularize(
        &self,
        coordinates: &mut [f64],
        permutation: &[usize],
        iteration: usize,
    ) -> EstimationResult<bool> {
        match GlobalRegularizer.regularize(coordinates, permutation) {
            Ok(_) => Ok(true),
            Err(err)
                if err.is_recoverable()
                    && self.params.on_regularization_failure == FailurePolicy::Skip =>
            {
                warn!("CoordinateEstimator: iteration {iteration}: {err}; skipping regularization");
                Ok(false)
            }
            Err(err) => Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::estimator::RunOptions;

    fn linear_stack(n: usize, range: usize) -> CorrelationMatrix {
        CorrelationMatrix::banded(n, range, |i, j| 1.0 - 0.08 * i.abs_diff(j) as f64)
    }

    fn options(range: usize) -> RunOptions {
        RunOptions {
            comparison_range: range,
            shifts_smoothing_range: 2,
            shifts_smoothing_sigma: 1.0,
            ..RunOptions::default()
        }
    }

    #[test]
    fn uniform_stack_is_a_fixed_point() {
        let n = 12;
        let start: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let params = EstimatorParams {
            options: RunOptions {
                n_iterations: 3,
                ..options(4)
            },
            ..EstimatorParams::default()
        };
        let out = CoordinateEstimator::new(params)
            .estimate(&linear_stack(n, 4), &start)
            .unwrap();
        for (a, b) in out.iter().zip(&start) {
            assert!((a - b).abs() < 1e-6, "{a} vs {b}");
        }
    }

    #[test]
    fn mismatched_start_is_rejected() {
        let estimator = CoordinateEstimator::new(EstimatorParams::with_options(options(2)));
        let err = estimator
            .estimate(&linear_stack(5, 2), &[0.0, 1.0, 2.0])
            .unwrap_err();
        assert_eq!(
            err,
            EstimationError::LengthMismatch {
                matrix: 5,
                coordinates: 3
            }
        );
        assert_eq!(err.stage(), Stage::Validate);
    }

    #[test]
    fn non_finite_start_is_rejected() {
        let estimator = CoordinateEstimator::new(EstimatorParams::with_options(options(2)));
        let err = estimator
            .estimate(&linear_stack(4, 2), &[0.0, f64::NAN, 2.0, 3.0])
            .unwrap_err();
        assert!(matches!(
            err,
            EstimationError::NonFiniteCoordinate { index: 1, .. }
        ));
    }

    /// Curve that ignores its samples, so a collapsed stack still fits.
    struct FixedDecay;

    impl CorrelationFit for FixedDecay {
        fn min_samples(&self) -> usize {
            0
        }

        fn fit(
            &self,
            _samples: &[crate::fit::FitSample],
        ) -> Result<crate::fit::Polynomial, crate::error::FitError> {
            Ok(crate::fit::Polynomial::new(vec![1.0, -0.08]))
        }
    }

    #[test]
    fn regularization_failure_follows_policy() {
        // every slice at the same depth: the rank extremes coincide
        let n = 6;
        let start = vec![1.0; n];
        let opts = RunOptions {
            shift_proportion: 0.0,
            ..options(2)
        };

        let skip = CoordinateEstimator::new(EstimatorParams::with_options(opts.clone()))
            .with_fit_model(Box::new(FixedDecay));
        let report = skip
            .estimate_with_diagnostics(&linear_stack(n, 2), &start)
            .unwrap();
        assert!(!report.trace.iterations[0].regularized);
        assert_eq!(report.coordinates, start);

        let abort = CoordinateEstimator::new(EstimatorParams {
            options: opts,
            on_regularization_failure: FailurePolicy::Abort,
            ..EstimatorParams::default()
        })
        .with_fit_model(Box::new(FixedDecay));
        let err = abort.estimate(&linear_stack(n, 2), &start).unwrap_err();
        assert!(matches!(
            err,
            EstimationError::DegenerateRegularization { .. }
        ));
    }
}
