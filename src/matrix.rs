//! Correlation matrix storage and zero-copy views.
//!
//! Entry `(i, j)` holds the similarity between slices `i` and `j`. Only the
//! band `|rank(i) - rank(j)| <= comparison_range` is ever read by the
//! estimator; entries outside the band are conventionally NaN.
//!
//! Stages address the matrix through [`MatrixView`]. The per-iteration
//! [`PermutedMatrix`] reorders rows and columns by coordinate rank without
//! touching the underlying storage.

use crate::error::{EstimationError, EstimationResult};

/// Read-only square table addressed by `(row, column)`.
pub trait MatrixView {
    fn size(&self) -> usize;

    /// Entry at `(i, j)`; NaN marks an undefined similarity.
    fn get(&self, i: usize, j: usize) -> f64;

    /// Entry at `(i, j)` if both indices are inside the table and the value
    /// is finite.
    fn get_finite(&self, i: usize, j: usize) -> Option<f64> {
        if i >= self.size() || j >= self.size() {
            return None;
        }
        let v = self.get(i, j);
        v.is_finite().then_some(v)
    }
}

/// Owned, row-major `n × n` correlation table.
#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationMatrix {
    n: usize,
    data: Vec<f64>,
}

impl CorrelationMatrix {
    /// Wrap row-major storage of length `n * n`.
    pub fn new(n: usize, data: Vec<f64>) -> EstimationResult<Self> {
        let expected = n * n;
        if data.len() != expected {
            return Err(EstimationError::MatrixShape {
                expected,
                found: data.len(),
            });
        }
        Ok(Self { n, data })
    }

    /// Build a full matrix by evaluating `f(i, j)` for every entry.
    pub fn from_fn(n: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        let mut data = Vec::with_capacity(n * n);
        for i in 0..n {
            for j in 0..n {
                data.push(f(i, j));
            }
        }
        Self { n, data }
    }

    /// Build a banded matrix: `f(i, j)` for `|i - j| <= range`, NaN elsewhere.
    pub fn banded(n: usize, range: usize, mut f: impl FnMut(usize, usize) -> f64) -> Self {
        Self::from_fn(n, |i, j| {
            if i.abs_diff(j) <= range {
                f(i, j)
            } else {
                f64::NAN
            }
        })
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    pub fn row(&self, i: usize) -> &[f64] {
        &self.data[i * self.n..(i + 1) * self.n]
    }

    /// Rank-ordered view of the matrix for the given permutation.
    pub fn permuted<'a>(&'a self, permutation: &'a [usize]) -> PermutedMatrix<'a> {
        PermutedMatrix::new(self, permutation)
    }
}

impl MatrixView for CorrelationMatrix {
    fn size(&self) -> usize {
        self.n
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> f64 {
        self.data[i * self.n + j]
    }
}

/// View that addresses a matrix by coordinate rank: `view.get(a, b)` reads
/// `matrix.get(permutation[a], permutation[b])`.
#[derive(Clone, Copy)]
pub struct PermutedMatrix<'a> {
    matrix: &'a CorrelationMatrix,
    permutation: &'a [usize],
}

impl<'a> PermutedMatrix<'a> {
    pub fn new(matrix: &'a CorrelationMatrix, permutation: &'a [usize]) -> Self {
        debug_assert_eq!(matrix.size(), permutation.len());
        Self {
            matrix,
            permutation,
        }
    }

    pub fn permutation(&self) -> &'a [usize] {
        self.permutation
    }

    pub fn source(&self) -> &'a CorrelationMatrix {
        self.matrix
    }
}

impl MatrixView for PermutedMatrix<'_> {
    fn size(&self) -> usize {
        self.permutation.len()
    }

    #[inline]
    fn get(&self, i: usize, j: usize) -> f64 {
        self.matrix.get(self.permutation[i], self.permutation[j])
    }
}

impl std::fmt::Debug for PermutedMatrix<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PermutedMatrix")
            .field("size", &self.size())
            .field("permutation", &self.permutation)
            .finish()
    }
}
