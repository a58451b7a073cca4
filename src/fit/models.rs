use crate::error::FitError;
use nalgebra::{Matrix2, Matrix3, Vector2, Vector3};
use serde::Deserialize;

const EPS: f64 = 1e-12;

/// One weighted observation of correlation at a coordinate offset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FitSample {
    pub offset: f64,
    pub value: f64,
    pub weight: f64,
}

impl FitSample {
    pub fn new(offset: f64, value: f64, weight: f64) -> Self {
        Self {
            offset,
            value,
            weight,
        }
    }

    fn is_usable(&self) -> bool {
        self.offset.is_finite() && self.value.is_finite() && self.weight.is_finite() && self.weight > 0.0
    }
}

/// Polynomial with ascending coefficients: `c[0] + c[1]·x + c[2]·x² + …`.
#[derive(Clone, Debug, PartialEq)]
pub struct Polynomial {
    coefficients: Vec<f64>,
}

impl Polynomial {
    pub fn new(coefficients: Vec<f64>) -> Self {
        Self { coefficients }
    }

    pub fn coefficients(&self) -> &[f64] {
        &self.coefficients
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, &c| acc * x + c)
    }
}

/// Fits expected correlation as a function of offset.
///
/// Implementations are pure functions of their samples and may be shared
/// across worker threads.
pub trait CorrelationFit: Send + Sync {
    /// Minimum number of usable samples the model needs.
    fn min_samples(&self) -> usize;

    /// Weighted fit over `samples`. Samples with non-positive or non-finite
    /// weight, offset or value are ignored.
    fn fit(&self, samples: &[FitSample]) -> Result<Polynomial, FitError>;
}

/// Weighted least-squares line `y = a·x + b`.
#[derive(Clone, Copy, Debug, Default)]
pub struct AffineFit;

impl CorrelationFit for AffineFit {
    fn min_samples(&self) -> usize {
        2
    }

    fn fit(&self, samples: &[FitSample]) -> Result<Polynomial, FitError> {
        let mut count = 0usize;
        let (mut s_w, mut s_x, mut s_xx, mut s_y, mut s_xy) = (0.0, 0.0, 0.0, 0.0, 0.0);
        for s in samples.iter().filter(|s| s.is_usable()) {
            count += 1;
            s_w += s.weight;
            s_x += s.weight * s.offset;
            s_xx += s.weight * s.offset * s.offset;
            s_y += s.weight * s.value;
            s_xy += s.weight * s.offset * s.value;
        }
        if count < self.min_samples() {
            return Err(FitError::NotEnoughDataPoints {
                found: count,
                required: self.min_samples(),
            });
        }

        let normal = Matrix2::new(s_xx, s_x, s_x, s_w);
        let det = normal.determinant();
        if !(det.abs() > EPS * (s_xx * s_w).max(EPS)) {
            return Err(FitError::IllDefinedDataPoints { determinant: det });
        }
        let solution = normal
            .lu()
            .solve(&Vector2::new(s_xy, s_y))
            .ok_or(FitError::IllDefinedDataPoints { determinant: det })?;
        Ok(Polynomial::new(vec![solution[1], solution[0]]))
    }
}

/// Weighted least-squares parabola `y = c0 + c1·x + c2·x²`.
#[derive(Clone, Copy, Debug, Default)]
pub struct QuadraticFit;

impl CorrelationFit for QuadraticFit {
    fn min_samples(&self) -> usize {
        3
    }

    fn fit(&self, samples: &[FitSample]) -> Result<Polynomial, FitError> {
        let mut count = 0usize;
        // moments[p] = Σ w·x^p for p in 0..=4
        let mut moments = [0.0f64; 5];
        let mut rhs = Vector3::zeros();
        for s in samples.iter().filter(|s| s.is_usable()) {
            count += 1;
            let mut xp = 1.0;
            for (p, m) in moments.iter_mut().enumerate() {
                *m += s.weight * xp;
                if p < 3 {
                    rhs[p] += s.weight * xp * s.value;
                }
                xp *= s.offset;
            }
        }
        if count < self.min_samples() {
            return Err(FitError::NotEnoughDataPoints {
                found: count,
                required: self.min_samples(),
            });
        }

        let normal = Matrix3::from_fn(|r, c| moments[r + c]);
        let det = normal.determinant();
        let scale = (moments[0] * moments[2] * moments[4]).max(EPS);
        if !(det.abs() > EPS * scale) {
            return Err(FitError::IllDefinedDataPoints { determinant: det });
        }
        let solution = normal
            .lu()
            .solve(&rhs)
            .ok_or(FitError::IllDefinedDataPoints { determinant: det })?;
        Ok(Polynomial::new(solution.iter().copied().collect()))
    }
}

/// Configuration-level fit model selection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FitModelKind {
    #[default]
    Affine,
    Quadratic,
}

impl FitModelKind {
    pub fn build(&self) -> Box<dyn CorrelationFit> {
        match self {
            FitModelKind::Affine => Box::new(AffineFit),
            FitModelKind::Quadratic => Box::new(QuadraticFit),
        }
    }
}
