//! Shift opinions: collection, mediation and smoothed application.
//!
//! - [`collector`]: every in-range neighbour `b` of rank `a` proposes where
//!   `a` should sit, by inverting `b`'s fit curve at their corrected
//!   correlation.
//! - [`mediator`]: reduces the opinion set of one rank to a single shift.
//! - [`smoothing`]: truncated-Gaussian smoothing of the mediated shifts and
//!   the damped coordinate update.

pub mod collector;
pub mod mediator;
pub mod smoothing;

pub use collector::{collect_shifts, ShiftOpinion, ShiftOpinions};
pub use mediator::{
    mediate_all, MediatorKind, ShiftMediator, WeightedMeanMediator, WeightedMedianMediator,
};
pub use smoothing::{gaussian_half_kernel, mirror_index, ShiftSmoother};
