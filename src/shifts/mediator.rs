use super::collector::{ShiftOpinion, ShiftOpinions};
use crate::error::{EstimationError, EstimationResult};
use crate::parallel::{map_ranks, ParallelOptions};
use serde::Deserialize;

/// Reduces the opinion set of one slice to a single shift.
///
/// An empty set, or one whose weights sum to zero, must yield `0.0`. Returning
/// `Err` aborts the run with [`EstimationError::Mediation`].
pub trait ShiftMediator: Send + Sync {
    fn mediate(&self, opinions: &[ShiftOpinion]) -> Result<f64, String>;
}

fn total_weight(opinions: &[ShiftOpinion]) -> f64 {
    opinions.iter().map(|o| o.weight).sum()
}

/// `Σ w·s / Σ w`.
#[derive(Clone, Copy, Debug, Default)]
pub struct WeightedMeanMediator;

impl ShiftMediator for WeightedMeanMediator {
    fn mediate(&self, opinions: &[ShiftOpinion]) -> Result<f64, String> {
        let total = total_weight(opinions);
        if !(total > 0.0) {
            return Ok(0.0);
        }
        let sum: f64 = opinions.iter().map(|o| o.weight * o.shift).sum();
        Ok(sum / total)
    }
}

/// Smallest shift whose cumulative weight reaches half of the total.
#[derive(Clone, Copy, Debug, Default)]
pub struct WeightedMedianMediator;

impl ShiftMediator for WeightedMedianMediator {
    fn mediate(&self, opinions: &[ShiftOpinion]) -> Result<f64, String> {
        let total = total_weight(opinions);
        if !(total > 0.0) {
            return Ok(0.0);
        }
        let mut sorted: Vec<(f64, f64)> = opinions.iter().map(|o| (o.shift, o.weight)).collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
        let half = 0.5 * total;
        let mut acc = 0.0;
        for &(shift, weight) in &sorted {
            acc += weight;
            if acc >= half {
                return Ok(shift);
            }
        }
        // rounding left the accumulator a hair below half
        Ok(sorted.last().map_or(0.0, |&(shift, _)| shift))
    }
}

/// Serializable selection of the built-in mediators.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediatorKind {
    #[default]
    WeightedMean,
    WeightedMedian,
}

impl MediatorKind {
    pub fn build(&self) -> Box<dyn ShiftMediator> {
        match self {
            MediatorKind::WeightedMean => Box::new(WeightedMeanMediator),
            MediatorKind::WeightedMedian => Box::new(WeightedMedianMediator),
        }
    }
}

/// Mediate every rank. A non-finite result is fatal.
pub fn mediate_all(
    mediator: &dyn ShiftMediator,
    opinions: &ShiftOpinions,
    parallel: ParallelOptions,
) -> EstimationResult<Vec<f64>> {
    let results = map_ranks(opinions.len(), parallel, |rank| {
        mediator.mediate(opinions.opinions(rank))
    });
    results
        .into_iter()
        .enumerate()
        .map(|(rank, result)| match result {
            Ok(value) if value.is_finite() => Ok(value),
            Ok(value) => Err(EstimationError::NonFiniteShift { rank, value }),
            Err(reason) => Err(EstimationError::Mediation { rank, reason }),
        })
        .collect()
}
