//! Parameter types configuring the estimator.
//!
//! [`EstimatorParams`] bundles the loop options with the selections for each
//! pluggable capability. Everything deserializes from JSON with defaults for
//! missing fields, so a config may name only what it changes.

use super::options::RunOptions;
use crate::categorizer::CategorizerKind;
use crate::fit::FitModelKind;
use crate::parallel::ParallelOptions;
use crate::shifts::MediatorKind;
use serde::Deserialize;

/// What to do when the global regularizer cannot fit its affine map.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Log a warning and leave the coordinates unchanged for this iteration.
    #[default]
    Skip,
    /// Abort the run with the error.
    Abort,
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct EstimatorParams {
    pub options: RunOptions,
    pub fit_model: FitModelKind,
    pub mediator: MediatorKind,
    pub categorizer: CategorizerKind,
    pub on_regularization_failure: FailurePolicy,
    pub parallel: ParallelOptions,
}

impl EstimatorParams {
    pub fn with_options(options: RunOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_json_overrides_selected_fields() {
        let json = r#"{
            "options": { "n_iterations": 3 },
            "fit_model": "quadratic",
            "mediator": "weighted_median",
            "categorizer": { "kind": "ranged", "bin_width": 50 },
            "on_regularization_failure": "abort"
        }"#;
        let params: EstimatorParams = serde_json::from_str(json).unwrap();
        assert_eq!(params.options.n_iterations, 3);
        assert_eq!(params.fit_model, FitModelKind::Quadratic);
        assert_eq!(params.mediator, MediatorKind::WeightedMedian);
        assert_eq!(params.on_regularization_failure, FailurePolicy::Abort);
        assert_eq!(params.categorizer.build(200).bin(120), 2);
    }

    #[test]
    fn empty_json_is_default() {
        let params: EstimatorParams = serde_json::from_str("{}").unwrap();
        assert_eq!(params.on_regularization_failure, FailurePolicy::Skip);
        assert_eq!(params.mediator, MediatorKind::WeightedMean);
        assert!(params.options.with_regularization);
    }
}
