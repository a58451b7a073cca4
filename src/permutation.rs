//! Rank permutation of the current coordinate vector.
//!
//! `permutation[k]` is the original index of the slice with the `k`-th
//! smallest coordinate and `inverse[i]` is the rank of slice `i`. Ties keep
//! their original index order (stable sort). A fresh index is built every
//! iteration.

use crate::matrix::{CorrelationMatrix, PermutedMatrix};
use std::cmp::Ordering;

#[derive(Clone, Debug, PartialEq)]
pub struct PermutationIndex {
    permutation: Vec<usize>,
    inverse: Vec<usize>,
    sorted: Vec<f64>,
}

impl PermutationIndex {
    /// Sort `coordinates` and record the rank permutation and its inverse.
    pub fn from_coordinates(coordinates: &[f64]) -> Self {
        let n = coordinates.len();
        let mut permutation: Vec<usize> = (0..n).collect();
        permutation.sort_by(|&a, &b| {
            coordinates[a]
                .partial_cmp(&coordinates[b])
                .unwrap_or(Ordering::Equal)
        });
        let mut inverse = vec![0usize; n];
        for (rank, &index) in permutation.iter().enumerate() {
            inverse[index] = rank;
        }
        let sorted = permutation.iter().map(|&i| coordinates[i]).collect();
        Self {
            permutation,
            inverse,
            sorted,
        }
    }

    pub fn len(&self) -> usize {
        self.permutation.len()
    }

    pub fn is_empty(&self) -> bool {
        self.permutation.is_empty()
    }

    /// Rank → original index.
    pub fn permutation(&self) -> &[usize] {
        &self.permutation
    }

    /// Original index → rank.
    pub fn inverse(&self) -> &[usize] {
        &self.inverse
    }

    /// Coordinates reordered by rank (non-decreasing).
    pub fn sorted_coordinates(&self) -> &[f64] {
        &self.sorted
    }

    /// Original index of the slice at `rank`.
    #[inline]
    pub fn apply(&self, rank: usize) -> usize {
        self.permutation[rank]
    }

    /// Rank of the slice with original index `index`.
    #[inline]
    pub fn apply_inverse(&self, index: usize) -> usize {
        self.inverse[index]
    }

    pub fn apply_checked(&self, rank: usize) -> Option<usize> {
        self.permutation.get(rank).copied()
    }

    pub fn apply_inverse_checked(&self, index: usize) -> Option<usize> {
        self.inverse.get(index).copied()
    }

    /// Rank-ordered view of `matrix` sharing its storage.
    pub fn permute<'a>(&'a self, matrix: &'a CorrelationMatrix) -> PermutedMatrix<'a> {
        PermutedMatrix::new(matrix, &self.permutation)
    }
}
