//! Optional data-parallel execution of per-rank work.
//!
//! Every stage maps a pure function over `0..n` ranks and collects into a
//! fresh vector, so no stage ever observes partial results of another. With
//! the `parallel` feature the map runs on the Rayon pool once the stack is
//! large enough; the output order is the same either way.

use serde::Deserialize;

/// Controls whether per-rank stages run sequentially or with Rayon.
#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(default)]
pub struct ParallelOptions {
    enabled: bool,
    min_slices_for_parallel: usize,
}

impl ParallelOptions {
    /// Construct explicit options.
    pub fn new(enabled: bool, min_slices_for_parallel: usize) -> Self {
        Self {
            enabled,
            min_slices_for_parallel: min_slices_for_parallel.max(1),
        }
    }

    /// Disable parallel execution regardless of stack size.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            min_slices_for_parallel: usize::MAX,
        }
    }

    /// Returns true when a stage over `slices` ranks should use Rayon.
    pub fn should_parallelize(&self, slices: usize) -> bool {
        self.enabled && slices >= self.min_slices_for_parallel
    }
}

impl Default for ParallelOptions {
    fn default() -> Self {
        Self {
            enabled: cfg!(feature = "parallel"),
            min_slices_for_parallel: 256,
        }
    }
}

/// Evaluate `f(rank)` for every rank in `0..n`, in rank order.
pub(crate) fn map_ranks<T, F>(n: usize, parallel: ParallelOptions, f: F) -> Vec<T>
where
    T: Send,
    F: Fn(usize) -> T + Sync + Send,
{
    if parallel.should_parallelize(n) {
        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            return (0..n).into_par_iter().map(f).collect();
        }
    }
    (0..n).map(f).collect()
}
