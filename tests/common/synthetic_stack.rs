use z_spacing::CorrelationMatrix;

/// True z-positions of a stack whose thickness oscillates around 1.0 with
/// relative amplitude `amplitude`.
pub fn oscillating_depths(n: usize, amplitude: f64) -> Vec<f64> {
    assert!(amplitude.abs() < 1.0, "thickness must stay positive");
    let mut depths = Vec::with_capacity(n);
    let mut z = 0.0;
    for k in 0..n {
        depths.push(z);
        z += 1.0 + amplitude * (k as f64 / 5.0).sin();
    }
    depths
}

/// Banded matrix whose correlation decays linearly with true distance,
/// NaN outside `range` index steps.
pub fn linear_decay_matrix(depths: &[f64], range: usize, slope: f64) -> CorrelationMatrix {
    CorrelationMatrix::banded(depths.len(), range, |i, j| {
        (1.0 - slope * (depths[i] - depths[j]).abs()).max(0.0)
    })
}

/// Indices `0..n` as coordinates.
pub fn index_coordinates(n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64).collect()
}

/// Largest deviation between two depth profiles after mapping both onto
/// `[0, 1]` by their first and last entries.
pub fn normalized_max_deviation(estimate: &[f64], truth: &[f64]) -> f64 {
    let norm = |v: &[f64]| -> Vec<f64> {
        let (lo, hi) = (v[0], v[v.len() - 1]);
        v.iter().map(|x| (x - lo) / (hi - lo)).collect()
    };
    norm(estimate)
        .iter()
        .zip(norm(truth))
        .map(|(a, b)| (a - b).abs())
        .fold(0.0, f64::max)
}
