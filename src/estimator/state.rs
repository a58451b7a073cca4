use crate::permutation::PermutationIndex;

/// Working state carried from one iteration to the next.
///
/// `coordinates` is indexed by slice; `weights` and `multipliers` are indexed
/// by rank and keep their rank positions across iterations even when the
/// order of slices changes.
#[derive(Clone, Debug)]
pub(crate) struct IterationState {
    pub coordinates: Vec<f64>,
    pub weights: Vec<f64>,
    pub multipliers: Vec<f64>,
    pub index: PermutationIndex,
}

impl IterationState {
    pub fn new(start: &[f64]) -> Self {
        let n = start.len();
        Self {
            coordinates: start.to_vec(),
            weights: vec![1.0; n],
            multipliers: vec![1.0; n],
            index: PermutationIndex::from_coordinates(start),
        }
    }

    /// Rebuild the rank permutation from the current coordinates.
    pub fn reindex(&mut self) {
        self.index = PermutationIndex::from_coordinates(&self.coordinates);
    }
}
