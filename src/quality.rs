//! Per-slice quality multipliers.
//!
//! A slice whose correlations are uniformly too low or too high compared with
//! its local fit curve gets a multiplier that rescales them. For rank `i` the
//! update minimises
//!
//! ```text
//! Σ_j w[j] · (m[i] · c(i, j) · m[j] − f_i(|x[j] − x[i]|))²
//! ```
//!
//! over `m[i]`, a quadratic with the closed-form minimiser
//! `Σ w·a·f / Σ w·a²` (`a = c(i, j)·m[j]`). The minimiser is blended with the
//! ideal value `1.0` by the regularizer weight. All ranks are updated from the
//! previous pass (Jacobi sweep), repeated for the configured number of passes.
//! Weights are then rebuilt from the multipliers.

use crate::fit::LocalFitTable;
use crate::matrix::MatrixView;
use crate::parallel::{map_ranks, ParallelOptions};
use log::debug;

const EPS: f64 = 1e-12;

/// `exp(-0.5 · (1 − m)² / σ)`: `1` for an ideal slice, decaying as the
/// multiplier departs from it.
#[inline]
pub fn weight_from_multiplier(multiplier: f64, sigma: f64) -> f64 {
    let diff = 1.0 - multiplier;
    (-0.5 * diff * diff / sigma).exp()
}

#[derive(Clone, Copy, Debug)]
pub struct SliceQualityEstimator {
    /// Blend towards `1.0` in `[0, 1]`.
    pub regularizer_weight: f64,
    /// Number of Jacobi passes.
    pub iterations: usize,
    pub range: usize,
    /// Width of the weight-from-multiplier kernel.
    pub weights_sigma: f64,
}

impl SliceQualityEstimator {
    /// Refine `multipliers` in place, then overwrite `weights` from them.
    ///
    /// All slices are rank-indexed; `matrix` is the rank-ordered view.
    pub fn estimate<M>(
        &self,
        matrix: &M,
        coordinates: &[f64],
        fits: &LocalFitTable,
        weights: &mut [f64],
        multipliers: &mut [f64],
        parallel: ParallelOptions,
    ) where
        M: MatrixView + Sync,
    {
        let n = matrix.size();
        for _ in 0..self.iterations {
            let current: &[f64] = multipliers;
            let weights_ro: &[f64] = weights;
            let updated = map_ranks(n, parallel, |i| {
                self.update_rank(matrix, i, coordinates, fits, weights_ro, current)
            });
            multipliers.copy_from_slice(&updated);
        }

        for (w, &m) in weights.iter_mut().zip(multipliers.iter()) {
            *w = weight_from_multiplier(m, self.weights_sigma);
        }

        if n > 0 {
            let mean = multipliers.iter().sum::<f64>() / n as f64;
            let min_w = weights.iter().copied().fold(f64::INFINITY, f64::min);
            debug!(
                "SliceQualityEstimator: mean multiplier={:.4} min weight={:.4}",
                mean, min_w
            );
        }
    }

    fn update_rank<M: MatrixView>(
        &self,
        matrix: &M,
        i: usize,
        coordinates: &[f64],
        fits: &LocalFitTable,
        weights: &[f64],
        multipliers: &[f64],
    ) -> f64 {
        let n = matrix.size();
        let curve = fits.curve(i);
        let lo = i.saturating_sub(self.range);
        let hi = (i + self.range).min(n - 1);
        let mut num = 0.0;
        let mut den = 0.0;
        for j in (lo..=hi).filter(|&j| j != i) {
            let Some(c) = matrix.get_finite(i, j) else {
                continue;
            };
            let a = c * multipliers[j];
            let target = curve.expected(coordinates[j] - coordinates[i]);
            num += weights[j] * a * target;
            den += weights[j] * a * a;
        }
        if !(den > EPS) || !num.is_finite() {
            return multipliers[i];
        }
        let fitted = num / den;
        let lambda = self.regularizer_weight;
        ((1.0 - lambda) * fitted + lambda).max(0.0)
    }
}
