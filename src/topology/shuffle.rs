//! Randomized traversal order.
//!
//! Both the rewirer and the scheduler walk the graph in a freshly shuffled
//! order each pass. Two shuffles are available:
//!
//! - **Uniform** (default): Fisher-Yates through [`SliceRandom::shuffle`],
//!   every permutation equally likely.
//! - **Legacy**: for each index `i` a partner `j` is drawn from the whole
//!   range `[0, n)` and swapped in. This is *not* uniform (some permutations
//!   come up measurably more often). It is kept so that runs can be
//!   compared against older results.
//!
//! Switching modes changes which nodes tend to be visited first, which in
//! turn shifts rewiring degree statistics and round-internal read order.
//! Both modes always return a permutation.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Shuffle algorithm used to build per-pass visiting orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShuffleMode {
    /// Unbiased Fisher-Yates
    #[default]
    Uniform,
    /// Full-range swap shuffle (biased)
    Legacy,
}

impl ShuffleMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ShuffleMode::Uniform => "uniform",
            ShuffleMode::Legacy => "legacy",
        }
    }
}

/// Permutes `items` in place using the selected algorithm
pub fn shuffle_in_place<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R, mode: ShuffleMode) {
    match mode {
        ShuffleMode::Uniform => items.shuffle(rng),
        ShuffleMode::Legacy => {
            let n = items.len();
            for i in 0..n {
                let j = rng.gen_range(0..n);
                if i != j {
                    items.swap(i, j);
                }
            }
        }
    }
}
