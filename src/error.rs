//! Error types shared by every estimation stage.
//!
//! Fit failures and precondition violations abort the whole run. A degenerate
//! global regularization is the only failure the estimator may recover from,
//! depending on [`FailurePolicy`](crate::estimator::FailurePolicy).

/// Stage of the per-iteration loop, used for error attribution and timings.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    Validate,
    Permute,
    Fit,
    Quality,
    Collect,
    Mediate,
    Smooth,
    Monotonic,
    Regularize,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Validate => "validate",
            Stage::Permute => "permute",
            Stage::Fit => "fit",
            Stage::Quality => "quality",
            Stage::Collect => "collect",
            Stage::Mediate => "mediate",
            Stage::Smooth => "smooth",
            Stage::Monotonic => "monotonic",
            Stage::Regularize => "regularize",
        };
        f.write_str(name)
    }
}

/// Reasons why a correlation fit model cannot produce a curve.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum FitError {
    NotEnoughDataPoints { found: usize, required: usize },
    IllDefinedDataPoints { determinant: f64 },
}

impl std::fmt::Display for FitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FitError::NotEnoughDataPoints { found, required } => {
                write!(f, "not enough data points ({found} < {required})")
            }
            FitError::IllDefinedDataPoints { determinant } => write!(
                f,
                "ill-defined data points (normal equations determinant {determinant:.3e})"
            ),
        }
    }
}

impl std::error::Error for FitError {}

/// Crate-wide result alias.
pub type EstimationResult<T> = Result<T, EstimationError>;

#[derive(Clone, Debug, PartialEq)]
pub enum EstimationError {
    /// Matrix storage does not describe an `n × n` table.
    MatrixShape { expected: usize, found: usize },
    /// Starting coordinates do not match the matrix size.
    LengthMismatch { matrix: usize, coordinates: usize },
    /// Stack too small for the configured neighbourhood.
    ComparisonRange { range: usize, slices: usize },
    /// A run option is outside its admissible domain.
    InvalidOption { field: &'static str, value: f64, reason: &'static str },
    /// A starting coordinate is NaN or infinite.
    NonFiniteCoordinate { index: usize, value: f64 },
    /// The fit model failed on the samples of one categorizer bin.
    LocalFit { bin: usize, source: FitError },
    /// A mediator produced a value that cannot be applied.
    NonFiniteShift { rank: usize, value: f64 },
    /// A custom mediator rejected an opinion set.
    Mediation { rank: usize, reason: String },
    /// Rank-extreme anchors coincide; no affine map can separate them.
    DegenerateRegularization { low: f64, high: f64 },
}

impl EstimationError {
    /// Stage the error originates from.
    pub fn stage(&self) -> Stage {
        match self {
            EstimationError::MatrixShape { .. }
            | EstimationError::LengthMismatch { .. }
            | EstimationError::ComparisonRange { .. }
            | EstimationError::InvalidOption { .. }
            | EstimationError::NonFiniteCoordinate { .. } => Stage::Validate,
            EstimationError::LocalFit { .. } => Stage::Fit,
            EstimationError::NonFiniteShift { .. } | EstimationError::Mediation { .. } => {
                Stage::Mediate
            }
            EstimationError::DegenerateRegularization { .. } => Stage::Regularize,
        }
    }

    /// True for failures a caller may skip for one iteration and continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EstimationError::DegenerateRegularization { .. })
    }
}

impl std::fmt::Display for EstimationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EstimationError::MatrixShape { expected, found } => write!(
                f,
                "correlation matrix storage has {found} entries, expected {expected}"
            ),
            EstimationError::LengthMismatch {
                matrix,
                coordinates,
            } => write!(
                f,
                "starting coordinates have length {coordinates}, matrix describes {matrix} slices"
            ),
            EstimationError::ComparisonRange { range, slices } => write!(
                f,
                "comparison range {range} must be in 1..{slices} for a stack of {slices} slices"
            ),
            EstimationError::InvalidOption {
                field,
                value,
                reason,
            } => write!(f, "invalid option {field}={value}: {reason}"),
            EstimationError::NonFiniteCoordinate { index, value } => {
                write!(f, "starting coordinate {index} is not finite ({value})")
            }
            EstimationError::LocalFit { bin, source } => {
                write!(f, "local correlation fit failed for bin {bin}: {source}")
            }
            EstimationError::NonFiniteShift { rank, value } => {
                write!(f, "mediated shift at rank {rank} is not finite ({value})")
            }
            EstimationError::Mediation { rank, reason } => {
                write!(f, "shift mediation failed at rank {rank}: {reason}")
            }
            EstimationError::DegenerateRegularization { low, high } => write!(
                f,
                "degenerate regularization anchors (low={low}, high={high})"
            ),
        }
    }
}

impl std::error::Error for EstimationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            EstimationError::LocalFit { source, .. } => Some(source),
            _ => None,
        }
    }
}
