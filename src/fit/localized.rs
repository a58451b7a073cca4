//! Localized fitting of the correlation decay curve.
//!
//! For every rank `i` the fitter gathers one sample per in-range neighbour
//! `j` (including `j == i`):
//!
//! - offset: `|x[j] - x[i]|` in current coordinate units,
//! - value: `c(i, j) · m[i] · m[j]` (quality-corrected correlation),
//! - weight: `w[i] · w[j]`.
//!
//! Samples are pooled by categorizer bin and the fit model is run once per
//! bin. The resulting curve, tabulated at offsets `0..=range`, is shared by
//! every rank of the bin. A failing bin aborts the run.

use super::curve::{LocalFit, LocalFitTable};
use super::models::{CorrelationFit, FitSample};
use crate::categorizer::Categorizer;
use crate::error::{EstimationError, EstimationResult};
use crate::matrix::MatrixView;
use crate::parallel::{map_ranks, ParallelOptions};
use log::debug;
use std::collections::BTreeMap;

pub struct LocalCorrelationFitter<'a> {
    model: &'a dyn CorrelationFit,
    categorizer: &'a dyn Categorizer,
    range: usize,
}

impl<'a> LocalCorrelationFitter<'a> {
    pub fn new(
        model: &'a dyn CorrelationFit,
        categorizer: &'a dyn Categorizer,
        range: usize,
    ) -> Self {
        Self {
            model,
            categorizer,
            range,
        }
    }

    /// Fit one curve per bin over the rank-ordered `matrix`.
    ///
    /// `coordinates`, `weights` and `multipliers` are indexed by rank.
    pub fn fit<M>(
        &self,
        matrix: &M,
        coordinates: &[f64],
        weights: &[f64],
        multipliers: &[f64],
        parallel: ParallelOptions,
    ) -> EstimationResult<LocalFitTable>
    where
        M: MatrixView + Sync,
    {
        let n = matrix.size();
        debug_assert_eq!(coordinates.len(), n);

        let per_rank = map_ranks(n, parallel, |i| {
            self.samples_for_rank(matrix, i, coordinates, weights, multipliers)
        });

        let mut bins: BTreeMap<usize, Vec<FitSample>> = BTreeMap::new();
        for (rank, samples) in per_rank.into_iter().enumerate() {
            bins.entry(self.categorizer.bin(rank))
                .or_default()
                .extend(samples);
        }

        let mut fits = Vec::with_capacity(bins.len());
        let mut slot_of_bin = BTreeMap::new();
        for (bin, samples) in &bins {
            let curve = self
                .model
                .fit(samples)
                .map_err(|source| EstimationError::LocalFit { bin: *bin, source })?;
            debug!(
                "LocalCorrelationFitter: bin {} samples={} coefficients={:?}",
                bin,
                samples.len(),
                curve.coefficients()
            );
            slot_of_bin.insert(*bin, fits.len());
            fits.push(LocalFit::tabulate(&curve, self.range));
        }

        let fit_of_rank = (0..n)
            .map(|rank| slot_of_bin[&self.categorizer.bin(rank)])
            .collect();
        Ok(LocalFitTable::new(fits, fit_of_rank))
    }

    fn samples_for_rank<M: MatrixView>(
        &self,
        matrix: &M,
        i: usize,
        coordinates: &[f64],
        weights: &[f64],
        multipliers: &[f64],
    ) -> Vec<FitSample> {
        let n = matrix.size();
        let lo = i.saturating_sub(self.range);
        let hi = (i + self.range).min(n - 1);
        let mut samples = Vec::with_capacity(hi - lo + 1);
        for j in lo..=hi {
            let Some(c) = matrix.get_finite(i, j) else {
                continue;
            };
            samples.push(FitSample::new(
                (coordinates[j] - coordinates[i]).abs(),
                c * multipliers[i] * multipliers[j],
                weights[i] * weights[j],
            ));
        }
        samples
    }
}
