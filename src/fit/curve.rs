use super::models::Polynomial;

/// Expected correlation tabulated at integer offsets `0..=comparison_range`.
///
/// The table is read as a piecewise-linear curve. Beyond its last entry the
/// final segment is extrapolated. The inverse lookup assumes correlation
/// decays with offset, which is the only regime in which a correlation pins
/// down a distance.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalFit {
    values: Vec<f64>,
}

impl LocalFit {
    /// Tabulate `curve` at offsets `0..=range`.
    pub fn tabulate(curve: &Polynomial, range: usize) -> Self {
        Self {
            values: (0..=range).map(|d| curve.evaluate(d as f64)).collect(),
        }
    }

    /// Wrap an explicit table; at least two entries are required to define a
    /// slope.
    pub fn from_values(values: Vec<f64>) -> Option<Self> {
        (values.len() >= 2).then_some(Self { values })
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Largest tabulated offset.
    pub fn range(&self) -> usize {
        self.values.len() - 1
    }

    /// Expected correlation at a real-valued offset (negative offsets are
    /// mirrored).
    pub fn expected(&self, offset: f64) -> f64 {
        let x = offset.abs();
        let last = self.range();
        let lower = (x.floor() as usize).min(last - 1);
        let t = x - lower as f64;
        let v0 = self.values[lower];
        let v1 = self.values[lower + 1];
        v0 + t * (v1 - v0)
    }

    /// Offset at which the curve reaches `correlation`.
    ///
    /// Returns `0` at or above the zero-offset value, interpolates inside the
    /// table, and extrapolates the last segment below it. If the last segment
    /// does not decrease the result is clamped to the table extent.
    pub fn offset_for(&self, correlation: f64) -> f64 {
        let values = &self.values;
        if correlation >= values[0] {
            return 0.0;
        }
        for d in 1..values.len() {
            let (hi, lo) = (values[d - 1], values[d]);
            if lo <= correlation && hi > correlation {
                return (d - 1) as f64 + (hi - correlation) / (hi - lo);
            }
        }
        let last = self.range();
        let slope = values[last] - values[last - 1];
        if slope < 0.0 && correlation < values[last] {
            last as f64 + (correlation - values[last]) / slope
        } else {
            last as f64
        }
    }
}

/// One [`LocalFit`] per categorizer bin plus the rank → bin lookup.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalFitTable {
    fits: Vec<LocalFit>,
    fit_of_rank: Vec<usize>,
}

impl LocalFitTable {
    /// `fit_of_rank[r]` indexes into `fits`.
    pub fn new(fits: Vec<LocalFit>, fit_of_rank: Vec<usize>) -> Self {
        debug_assert!(fit_of_rank.iter().all(|&f| f < fits.len()));
        Self { fits, fit_of_rank }
    }

    /// Number of ranks covered.
    pub fn len(&self) -> usize {
        self.fit_of_rank.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fit_of_rank.is_empty()
    }

    /// Curve used by the slice at `rank`.
    #[inline]
    pub fn curve(&self, rank: usize) -> &LocalFit {
        &self.fits[self.fit_of_rank[rank]]
    }

    /// Distinct fitted curves.
    pub fn fits(&self) -> &[LocalFit] {
        &self.fits
    }
}
