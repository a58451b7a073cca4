//! Per-iteration observation hooks.
//!
//! The estimator hands every completed iteration to an [`IterationObserver`]
//! as a bundle of shared borrows. Observers cannot reach the working state,
//! so nothing they do feeds back into later iterations.

use crate::matrix::PermutedMatrix;
use serde::Serialize;

/// Read-only view of the state right after one iteration.
#[derive(Clone, Copy, Debug)]
pub struct IterationObservation<'a> {
    /// One-based count of completed iterations.
    pub iteration: usize,
    /// Matrix in the rank order the iteration worked with.
    pub matrix: PermutedMatrix<'a>,
    /// Updated coordinates, slice-indexed.
    pub coordinates: &'a [f64],
    pub permutation: &'a [usize],
    pub inverse: &'a [usize],
    /// Rank-indexed quality multipliers.
    pub multipliers: &'a [f64],
    /// Rank-indexed quality weights.
    pub weights: &'a [f64],
    /// Rank-indexed mediated shifts, before smoothing.
    pub shifts: &'a [f64],
}

impl IterationObservation<'_> {
    /// Copy the observation into an owned, serializable snapshot.
    pub fn to_snapshot(&self) -> IterationSnapshot {
        IterationSnapshot {
            iteration: self.iteration,
            coordinates: self.coordinates.to_vec(),
            permutation: self.permutation.to_vec(),
            inverse: self.inverse.to_vec(),
            multipliers: self.multipliers.to_vec(),
            weights: self.weights.to_vec(),
            shifts: self.shifts.to_vec(),
        }
    }
}

pub trait IterationObserver {
    fn observe(&mut self, observation: &IterationObservation<'_>);
}

impl<F> IterationObserver for F
where
    F: FnMut(&IterationObservation<'_>),
{
    fn observe(&mut self, observation: &IterationObservation<'_>) {
        self(observation)
    }
}

/// Observer that ignores everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopObserver;

impl IterationObserver for NoopObserver {
    fn observe(&mut self, _observation: &IterationObservation<'_>) {}
}

/// Owned copy of one [`IterationObservation`] (the matrix is not copied).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IterationSnapshot {
    pub iteration: usize,
    pub coordinates: Vec<f64>,
    pub permutation: Vec<usize>,
    pub inverse: Vec<usize>,
    pub multipliers: Vec<f64>,
    pub weights: Vec<f64>,
    pub shifts: Vec<f64>,
}

/// Collects a snapshot of every iteration.
#[derive(Clone, Debug, Default)]
pub struct SnapshotCollector {
    snapshots: Vec<IterationSnapshot>,
}

impl SnapshotCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshots(&self) -> &[IterationSnapshot] {
        &self.snapshots
    }

    pub fn into_snapshots(self) -> Vec<IterationSnapshot> {
        self.snapshots
    }
}

impl IterationObserver for SnapshotCollector {
    fn observe(&mut self, observation: &IterationObservation<'_>) {
        self.snapshots.push(observation.to_snapshot());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::CorrelationMatrix;

    fn observe_once(observer: &mut dyn IterationObserver) {
        let matrix = CorrelationMatrix::from_fn(2, |i, j| if i == j { 1.0 } else { 0.5 });
        let perm = [1usize, 0];
        let observation = IterationObservation {
            iteration: 1,
            matrix: matrix.permuted(&perm),
            coordinates: &[1.0, 0.0],
            permutation: &perm,
            inverse: &perm,
            multipliers: &[1.0, 1.0],
            weights: &[1.0, 1.0],
            shifts: &[0.0, 0.0],
        };
        observer.observe(&observation);
    }

    #[test]
    fn closures_are_observers() {
        let mut seen = Vec::new();
        observe_once(&mut |obs: &IterationObservation<'_>| seen.push(obs.iteration));
        assert_eq!(seen, vec![1]);
    }

    #[test]
    fn collector_keeps_owned_snapshots() {
        let mut collector = SnapshotCollector::new();
        observe_once(&mut collector);
        let snapshots = collector.into_snapshots();
        assert_eq!(snapshots.len(), 1);
        assert_eq!(snapshots[0].permutation, vec![1, 0]);
        let json = serde_json::to_string(&snapshots[0]).unwrap();
        assert!(json.contains("\"multipliers\""));
    }
}
