//! Rank → bin assignment for spatially localized correlation fits.
//!
//! Slices sharing a bin pool their correlation samples into one fit. A single
//! bin reproduces a global fit; narrower bins let the expected correlation
//! decay vary along the stack.

use serde::Deserialize;

/// Maps a slice rank to the id of the bin whose fit it uses.
pub trait Categorizer: Send + Sync {
    fn bin(&self, rank: usize) -> usize;
}

/// Every slice falls into bin `0`.
#[derive(Clone, Copy, Debug, Default)]
pub struct SingleBinCategorizer;

impl Categorizer for SingleBinCategorizer {
    fn bin(&self, _rank: usize) -> usize {
        0
    }
}

/// Consecutive windows of `bin_width` ranks share a bin.
#[derive(Clone, Copy, Debug)]
pub struct RangedCategorizer {
    bin_width: usize,
}

impl RangedCategorizer {
    pub fn new(bin_width: usize) -> Self {
        Self {
            bin_width: bin_width.max(1),
        }
    }

    pub fn bin_width(&self) -> usize {
        self.bin_width
    }
}

impl Categorizer for RangedCategorizer {
    fn bin(&self, rank: usize) -> usize {
        rank / self.bin_width
    }
}

/// Configuration-level categorizer selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum CategorizerKind {
    SingleBin,
    /// `bin_width: None` spans the whole stack with one window.
    Ranged {
        #[serde(default)]
        bin_width: Option<usize>,
    },
}

impl Default for CategorizerKind {
    fn default() -> Self {
        CategorizerKind::Ranged { bin_width: None }
    }
}

impl CategorizerKind {
    /// Instantiate the categorizer for a stack of `n` slices.
    pub fn build(&self, n: usize) -> Box<dyn Categorizer> {
        match *self {
            CategorizerKind::SingleBin => Box::new(SingleBinCategorizer),
            CategorizerKind::Ranged { bin_width } => {
                Box::new(RangedCategorizer::new(bin_width.unwrap_or(n)))
            }
        }
    }
}
