//! Correlation-vs-offset models and their localized, per-bin fitting.
//!
//! - [`models`]: the [`CorrelationFit`] capability with weighted affine and
//!   quadratic least-squares variants.
//! - [`curve`]: tabulated fit curves ([`LocalFit`]) with forward evaluation
//!   and inverse lookup, grouped per bin in a [`LocalFitTable`].
//! - [`localized`]: collects `(offset, correlation)` samples from the
//!   rank-ordered matrix and fits one curve per categorizer bin.

pub mod curve;
pub mod localized;
pub mod models;

pub use curve::{LocalFit, LocalFitTable};
pub use localized::LocalCorrelationFitter;
pub use models::{AffineFit, CorrelationFit, FitModelKind, FitSample, Polynomial, QuadraticFit};
