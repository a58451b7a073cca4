//! Post-update constraints on the coordinate vector.
//!
//! - [`monotonic`]: keeps rank-adjacent slices at least a minimum thickness
//!   apart.
//! - [`regularize`]: rescales the whole stack so the rank extremes land on
//!   `0` and `n − 1`.

pub mod monotonic;
pub mod regularize;

pub use monotonic::MonotonicityEnforcer;
pub use regularize::{AffineMap, GlobalRegularizer};
