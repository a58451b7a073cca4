//! Gaussian smoothing of mediated shifts along the rank axis.
//!
//! Ranks beyond either end are reflected about the boundary rank (the
//! boundary itself is not repeated). The smoothed shift is a
//! weight-and-kernel normalised average, so slices with low quality weights
//! barely contribute to their neighbours.

const EPS: f64 = 1e-12;

/// Half of a symmetric truncated Gaussian: `g[0] = 1`,
/// `g[k] = exp(-0.5·k²/σ²)` for `k` in `1..=range`, scaled so the full kernel
/// `g[range], …, g[1], g[0], g[1], …, g[range]` sums to one.
pub fn gaussian_half_kernel(range: usize, sigma: f64) -> Vec<f64> {
    let mut kernel: Vec<f64> = (0..=range)
        .map(|k| {
            let k = k as f64;
            (-0.5 * k * k / (sigma * sigma)).exp()
        })
        .collect();
    let norm = kernel[0] + 2.0 * kernel[1..].iter().sum::<f64>();
    for g in &mut kernel {
        *g /= norm;
    }
    kernel
}

/// Reflect `index` into `0..n` with period `2(n − 1)`.
pub fn mirror_index(index: isize, n: usize) -> usize {
    if n <= 1 {
        return 0;
    }
    let period = 2 * (n as isize - 1);
    let m = index.rem_euclid(period);
    if m >= n as isize {
        (period - m) as usize
    } else {
        m as usize
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ShiftSmoother {
    pub range: usize,
    pub sigma: f64,
    /// Fraction of the smoothed shift applied per iteration.
    pub shift_proportion: f64,
    /// Inertia towards the previous coordinate in `[0, 1]`.
    pub update_regularizer_weight: f64,
}

impl ShiftSmoother {
    /// Smooth rank-indexed `shifts`, weighting each by its slice `weights`.
    ///
    /// A neighbourhood whose total weight vanishes smooths to `0`.
    pub fn smooth(&self, shifts: &[f64], weights: &[f64]) -> Vec<f64> {
        let n = shifts.len();
        let kernel = gaussian_half_kernel(self.range, self.sigma);
        let r = self.range as isize;
        (0..n)
            .map(|i| {
                let mut num = 0.0;
                let mut den = 0.0;
                for k in -r..=r {
                    let g = kernel[k.unsigned_abs()];
                    let j = mirror_index(i as isize + k, n);
                    num += g * weights[j] * shifts[j];
                    den += g * weights[j];
                }
                if den > EPS && num.is_finite() {
                    num / den
                } else {
                    0.0
                }
            })
            .collect()
    }

    /// Move each slice by its damped smoothed shift.
    ///
    /// `coordinates` is slice-indexed; `smoothed[r]` belongs to the slice at
    /// `permutation[r]`.
    pub fn apply(&self, coordinates: &mut [f64], permutation: &[usize], smoothed: &[f64]) {
        let beta = self.update_regularizer_weight;
        for (&slice, &shift) in permutation.iter().zip(smoothed) {
            let prev = coordinates[slice];
            let moved = prev + self.shift_proportion * shift;
            coordinates[slice] = beta * prev + (1.0 - beta) * moved;
        }
    }
}
