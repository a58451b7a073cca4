use crate::fit::LocalFitTable;
use crate::matrix::MatrixView;
use crate::parallel::{map_ranks, ParallelOptions};

/// Candidate shift for one rank, proposed by a neighbour.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ShiftOpinion {
    pub shift: f64,
    pub weight: f64,
    /// Rank distance to the neighbour that proposed it.
    pub distance: usize,
}

/// Opinion sets indexed by rank. Built and consumed within one iteration.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ShiftOpinions {
    per_rank: Vec<Vec<ShiftOpinion>>,
}

impl ShiftOpinions {
    pub fn new(per_rank: Vec<Vec<ShiftOpinion>>) -> Self {
        Self { per_rank }
    }

    pub fn len(&self) -> usize {
        self.per_rank.len()
    }

    pub fn is_empty(&self) -> bool {
        self.per_rank.is_empty()
    }

    pub fn opinions(&self, rank: usize) -> &[ShiftOpinion] {
        &self.per_rank[rank]
    }

    pub fn total(&self) -> usize {
        self.per_rank.iter().map(Vec::len).sum()
    }
}

/// `min/max` of two multipliers: `1` when the slices agree on quality.
#[inline]
fn multiplier_consistency(a: f64, b: f64) -> f64 {
    let hi = a.max(b);
    if hi <= 0.0 {
        0.0
    } else {
        a.min(b) / hi
    }
}

/// Gather shift opinions for every rank.
///
/// For ranks `a` and `b` with `0 < |a - b| <= range`, the corrected
/// correlation `c(a, b)·m[a]·m[b]` is converted into a distance with `b`'s
/// fit curve. Placing `a` at that distance from `b`, on `a`'s side, gives the
/// proposed shift. The opinion weight is `w[a]·w[b]` times the multiplier
/// consistency of the pair.
pub fn collect_shifts<M>(
    matrix: &M,
    coordinates: &[f64],
    weights: &[f64],
    multipliers: &[f64],
    fits: &LocalFitTable,
    range: usize,
    parallel: ParallelOptions,
) -> ShiftOpinions
where
    M: MatrixView + Sync,
{
    let n = matrix.size();
    let per_rank = map_ranks(n, parallel, |a| {
        let lo = a.saturating_sub(range);
        let hi = (a + range).min(n - 1);
        let mut opinions = Vec::with_capacity(hi - lo);
        for b in (lo..=hi).filter(|&b| b != a) {
            let Some(c) = matrix.get_finite(a, b) else {
                continue;
            };
            let corrected = c * multipliers[a] * multipliers[b];
            let distance = fits.curve(b).offset_for(corrected);
            let implied = if a > b {
                coordinates[b] + distance
            } else {
                coordinates[b] - distance
            };
            let weight =
                weights[a] * weights[b] * multiplier_consistency(multipliers[a], multipliers[b]);
            if !(weight > 0.0) || !implied.is_finite() {
                continue;
            }
            opinions.push(ShiftOpinion {
                shift: implied - coordinates[a],
                weight,
                distance: a.abs_diff(b),
            });
        }
        opinions
    });
    ShiftOpinions::new(per_rank)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::LocalFit;
    use crate::matrix::CorrelationMatrix;

    fn table(n: usize) -> LocalFitTable {
        LocalFitTable::new(
            vec![LocalFit::from_values(vec![1.0, 0.9, 0.8, 0.7]).unwrap()],
            vec![0; n],
        )
    }

    #[test]
    fn consistent_stack_proposes_zero_shifts() {
        let n = 8;
        let m = CorrelationMatrix::banded(n, 3, |i, j| 1.0 - 0.1 * i.abs_diff(j) as f64);
        let coords: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let ones = vec![1.0; n];
        let opinions =
            collect_shifts(&m, &coords, &ones, &ones, &table(n), 3, ParallelOptions::disabled());
        assert_eq!(opinions.len(), n);
        // interior rank sees 3 neighbours on each side, edge rank only one side
        assert_eq!(opinions.opinions(4).len(), 6);
        assert_eq!(opinions.opinions(0).len(), 3);
        for r in 0..n {
            for o in opinions.opinions(r) {
                assert!(o.shift.abs() < 1e-9, "rank {r}: {o:?}");
                assert!((o.weight - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn misplaced_slice_is_pulled_back() {
        let n = 8;
        let m = CorrelationMatrix::banded(n, 3, |i, j| 1.0 - 0.1 * i.abs_diff(j) as f64);
        let mut coords: Vec<f64> = (0..n).map(|i| i as f64).collect();
        coords[4] = 4.3;
        let ones = vec![1.0; n];
        let opinions =
            collect_shifts(&m, &coords, &ones, &ones, &table(n), 3, ParallelOptions::disabled());
        for o in opinions.opinions(4) {
            assert!((o.shift + 0.3).abs() < 1e-9, "{o:?}");
        }
    }

    #[test]
    fn undefined_entries_produce_no_opinions() {
        let n = 4;
        let m = CorrelationMatrix::from_fn(n, |i, j| if i == j { 1.0 } else { f64::NAN });
        let coords: Vec<f64> = (0..n).map(|i| i as f64).collect();
        let ones = vec![1.0; n];
        let opinions =
            collect_shifts(&m, &coords, &ones, &ones, &table(n), 2, ParallelOptions::disabled());
        assert_eq!(opinions.total(), 0);
    }

    #[test]
    fn inconsistent_multipliers_lower_opinion_weight() {
        assert_eq!(multiplier_consistency(1.0, 1.0), 1.0);
        assert!((multiplier_consistency(0.5, 1.0) - 0.5).abs() < 1e-12);
        assert_eq!(multiplier_consistency(0.0, 0.0), 0.0);
    }
}
