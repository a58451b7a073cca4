use crate::error::{EstimationError, EstimationResult};
use serde::Deserialize;

/// Knobs of the refinement loop.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RunOptions {
    /// Refinement passes (> 0).
    pub n_iterations: usize,
    /// Half-bandwidth of valid matrix entries and neighbour window.
    pub comparison_range: usize,
    /// When false, slices may not swap order and the minimum thickness is
    /// enforced after every update.
    pub with_reorder: bool,
    /// Anchor the rank extremes to `0` and `n − 1` after every update.
    pub with_regularization: bool,
    /// Blend of fitted quality multipliers towards `1.0`, in `[0, 1]`.
    pub multiplier_generation_regularizer_weight: f64,
    pub multiplier_estimation_iterations: usize,
    pub multiplier_weights_sigma: f64,
    pub shifts_smoothing_range: usize,
    pub shifts_smoothing_sigma: f64,
    /// Fraction of the smoothed shift applied per iteration.
    pub shift_proportion: f64,
    /// Inertia towards the previous coordinate, in `[0, 1]`.
    pub coordinate_update_regularizer_weight: f64,
    pub minimum_section_thickness: f64,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            n_iterations: 1,
            comparison_range: 10,
            with_reorder: true,
            with_regularization: true,
            multiplier_generation_regularizer_weight: 0.1,
            multiplier_estimation_iterations: 10,
            multiplier_weights_sigma: 0.04,
            shifts_smoothing_range: 10,
            shifts_smoothing_sigma: 4.0,
            shift_proportion: 0.6,
            coordinate_update_regularizer_weight: 0.0,
            minimum_section_thickness: 0.1,
        }
    }
}

fn invalid(field: &'static str, value: f64, reason: &'static str) -> EstimationError {
    EstimationError::InvalidOption {
        field,
        value,
        reason,
    }
}

fn check_unit_interval(field: &'static str, value: f64) -> EstimationResult<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(field, value, "must be in [0, 1]"))
    }
}

fn check_positive(field: &'static str, value: f64) -> EstimationResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, value, "must be positive and finite"))
    }
}

impl RunOptions {
    /// Check every option against a stack of `slices` slices.
    pub fn validate(&self, slices: usize) -> EstimationResult<()> {
        if self.comparison_range == 0 || self.comparison_range >= slices {
            return Err(EstimationError::ComparisonRange {
                range: self.comparison_range,
                slices,
            });
        }
        if self.n_iterations == 0 {
            return Err(invalid("n_iterations", 0.0, "must be at least 1"));
        }
        check_positive("multiplier_weights_sigma", self.multiplier_weights_sigma)?;
        check_positive("shifts_smoothing_sigma", self.shifts_smoothing_sigma)?;
        check_unit_interval(
            "multiplier_generation_regularizer_weight",
            self.multiplier_generation_regularizer_weight,
        )?;
        check_unit_interval(
            "coordinate_update_regularizer_weight",
            self.coordinate_update_regularizer_weight,
        )?;
        if !self.shift_proportion.is_finite() {
            return Err(invalid(
                "shift_proportion",
                self.shift_proportion,
                "must be finite",
            ));
        }
        if !(self.minimum_section_thickness >= 0.0 && self.minimum_section_thickness.is_finite()) {
            return Err(invalid(
                "minimum_section_thickness",
                self.minimum_section_thickness,
                "must be non-negative and finite",
            ));
        }
        Ok(())
    }
}
