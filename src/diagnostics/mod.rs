//! Diagnostics data model returned alongside the refined coordinates.
//!
//! `EstimationReport` is the entry point: the final coordinates plus an
//! `EstimationTrace` with one summary per iteration and per-stage timings.
//! Full per-iteration state is available through
//! [`SnapshotCollector`](crate::observer::SnapshotCollector).

pub mod timing;
pub mod trace;

pub use crate::observer::IterationSnapshot;
pub use timing::{StageTiming, TimingBreakdown};
pub use trace::{EstimationReport, EstimationTrace, IterationSummary};
