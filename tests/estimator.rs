mod common;

use common::init_logger;
use common::synthetic_stack::{
    index_coordinates, linear_decay_matrix, normalized_max_deviation, oscillating_depths,
};
use z_spacing::categorizer::RangedCategorizer;
use z_spacing::parallel::ParallelOptions;
use z_spacing::shifts::MediatorKind;
use z_spacing::{
    CoordinateEstimator, CorrelationMatrix, EstimationError, EstimatorParams,
    IterationObservation, RunOptions, SnapshotCollector, Stage,
};

fn options(n_iterations: usize, range: usize) -> RunOptions {
    RunOptions {
        n_iterations,
        comparison_range: range,
        shifts_smoothing_range: 4,
        shifts_smoothing_sigma: 2.0,
        ..RunOptions::default()
    }
}

#[test]
fn refinement_recovers_oscillating_thickness() {
    init_logger();
    let n = 60;
    let truth = oscillating_depths(n, 0.3);
    let matrix = linear_decay_matrix(&truth, 6, 0.08);
    let start = index_coordinates(n);

    let estimator = CoordinateEstimator::new(EstimatorParams::with_options(RunOptions {
        with_regularization: false,
        ..options(30, 6)
    }));
    let out = estimator.estimate(&matrix, &start).unwrap();

    let before = normalized_max_deviation(&start, &truth);
    let after = normalized_max_deviation(&out, &truth);
    assert!(after < before, "deviation grew: {before:.4} -> {after:.4}");
    assert!(out.iter().all(|z| z.is_finite()));
}

#[test]
fn observer_sees_every_iteration_in_order() {
    let n = 20;
    let matrix = linear_decay_matrix(&index_coordinates(n), 4, 0.1);
    let start = index_coordinates(n);
    let estimator = CoordinateEstimator::new(EstimatorParams::with_options(options(5, 4)));

    let mut seen = Vec::new();
    let out = estimator
        .estimate_with_observer(&matrix, &start, &mut |obs: &IterationObservation<'_>| {
            seen.push(obs.iteration);
        })
        .unwrap();
    assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    assert_eq!(out.len(), n);
}

#[test]
fn snapshots_hold_consistent_permutations() {
    let n = 15;
    let truth = oscillating_depths(n, 0.2);
    let matrix = linear_decay_matrix(&truth, 3, 0.1);
    let estimator = CoordinateEstimator::new(EstimatorParams::with_options(options(3, 3)));

    let mut collector = SnapshotCollector::new();
    let report = estimator
        .run(&matrix, &index_coordinates(n), &mut collector)
        .unwrap();
    let snapshots = collector.into_snapshots();
    assert_eq!(snapshots.len(), 3);
    assert_eq!(report.trace.iterations.len(), 3);
    assert_eq!(snapshots[2].coordinates, report.coordinates);
    for snap in &snapshots {
        for (rank, &slice) in snap.permutation.iter().enumerate() {
            assert_eq!(snap.inverse[slice], rank);
        }
        assert_eq!(snap.weights.len(), n);
        assert_eq!(snap.shifts.len(), n);
    }
}

#[test]
fn parallel_and_sequential_runs_agree() {
    let n = 300;
    let truth = oscillating_depths(n, 0.25);
    let matrix = linear_decay_matrix(&truth, 8, 0.05);
    let start = index_coordinates(n);
    let run = |parallel: ParallelOptions| {
        let params = EstimatorParams {
            options: options(4, 8),
            parallel,
            ..EstimatorParams::default()
        };
        CoordinateEstimator::new(params)
            .estimate(&matrix, &start)
            .unwrap()
    };
    assert_eq!(
        run(ParallelOptions::disabled()),
        run(ParallelOptions::new(true, 1))
    );
}

#[test]
fn diagnostics_report_bins_and_stage_timings() {
    let n = 40;
    let matrix = linear_decay_matrix(&index_coordinates(n), 4, 0.1);
    let estimator = CoordinateEstimator::new(EstimatorParams::with_options(options(2, 4)))
        .with_categorizer(Box::new(RangedCategorizer::new(10)));
    let report = estimator
        .estimate_with_diagnostics(&matrix, &index_coordinates(n))
        .unwrap();
    assert_eq!(report.trace.slices, n);
    assert!(report.trace.iterations.iter().all(|it| it.bins == 4));
    assert!(report.trace.iterations.iter().all(|it| it.regularized));
    for stage in [Stage::Fit, Stage::Quality, Stage::Collect, Stage::Mediate, Stage::Smooth] {
        assert!(report.trace.timings.stage_ms(stage).is_some(), "{stage}");
    }
    assert!(report.trace.timings.stage_ms(Stage::Monotonic).is_none());
    let json = serde_json::to_string(&report).unwrap();
    assert!(json.contains("\"monotonicCorrections\""));
}

#[test]
fn weighted_median_mediator_runs() {
    let n = 30;
    let truth = oscillating_depths(n, 0.2);
    let matrix = linear_decay_matrix(&truth, 5, 0.08);
    let params = EstimatorParams {
        options: options(5, 5),
        mediator: MediatorKind::WeightedMedian,
        ..EstimatorParams::default()
    };
    let out = CoordinateEstimator::new(params)
        .estimate(&matrix, &index_coordinates(n))
        .unwrap();
    assert!(out.iter().all(|z| z.is_finite()));
}

#[test]
fn invalid_inputs_fail_before_iterating() {
    let estimator = CoordinateEstimator::new(EstimatorParams::default());

    let empty = CorrelationMatrix::new(0, Vec::new()).unwrap();
    let err = estimator.estimate(&empty, &[]).unwrap_err();
    assert_eq!(
        err,
        EstimationError::ComparisonRange {
            range: 10,
            slices: 0
        }
    );

    let small = linear_decay_matrix(&index_coordinates(8), 3, 0.1);
    let err = estimator.estimate(&small, &index_coordinates(8)).unwrap_err();
    assert!(matches!(err, EstimationError::ComparisonRange { .. }));
    assert_eq!(err.stage(), Stage::Validate);

    assert!(CorrelationMatrix::new(3, vec![1.0; 8]).is_err());
}

#[test]
fn unfittable_matrix_aborts_the_run() {
    init_logger();
    let n = 6;
    // only the diagonal is defined: every sample sits at offset zero
    let matrix = CorrelationMatrix::from_fn(n, |i, j| if i == j { 1.0 } else { f64::NAN });
    let estimator = CoordinateEstimator::new(EstimatorParams::with_options(options(3, 2)));
    let err = estimator
        .estimate(&matrix, &index_coordinates(n))
        .unwrap_err();
    assert!(matches!(err, EstimationError::LocalFit { bin: 0, .. }));
    assert_eq!(err.stage(), Stage::Fit);
}
