use z_spacing::{CoordinateEstimator, CorrelationMatrix, EstimatorParams, RunOptions};

fn main() {
    // Demo: a stack whose true section thickness oscillates around 1.0.
    let n = 60usize;
    let range = 8usize;
    let mut truth = Vec::with_capacity(n);
    let mut z = 0.0;
    for k in 0..n {
        truth.push(z);
        z += 1.0 + 0.3 * (k as f64 / 5.0).sin();
    }
    let matrix = CorrelationMatrix::banded(n, range, |i, j| {
        (1.0 - 0.08 * (truth[i] - truth[j]).abs()).max(0.0)
    });
    let start: Vec<f64> = (0..n).map(|i| i as f64).collect();

    let estimator = CoordinateEstimator::new(EstimatorParams::with_options(RunOptions {
        n_iterations: 20,
        comparison_range: range,
        with_regularization: false,
        ..RunOptions::default()
    }));
    let report = match estimator.estimate_with_diagnostics(&matrix, &start) {
        Ok(report) => report,
        Err(err) => {
            eprintln!("Error: {err}");
            std::process::exit(1);
        }
    };

    // compare shapes after removing the free offset
    let error = |coords: &[f64]| {
        let offset = coords[0] - truth[0];
        coords
            .iter()
            .zip(&truth)
            .map(|(c, t)| (c - offset - t).abs())
            .fold(0.0, f64::max)
    };
    println!(
        "slices={} iterations={} total_ms={:.3}",
        n,
        report.trace.iterations.len(),
        report.trace.timings.total_ms
    );
    println!(
        "max deviation from truth: start={:.4} refined={:.4}",
        error(&start),
        error(&report.coordinates)
    );
}
