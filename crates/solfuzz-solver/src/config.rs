//! Solver configuration.

use serde::{Deserialize, Serialize};

/// Configuration for one [`TypeDependencyDag`](crate::TypeDependencyDag).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Seed for the PRNG behind weak-edge choices. The same seed and the same
    /// graph always produce the same resolved types.
    pub random_seed: u64,
    /// Upper bound on the number of head-type combinations `resolve_heads`
    /// materializes.
    pub max_head_combinations: usize,
}

impl SolverConfig {
    pub const DEFAULT_MAX_HEAD_COMBINATIONS: usize = 1_000_000;

    /// Default configuration with the given seed.
    pub fn with_seed(random_seed: u64) -> Self {
        SolverConfig {
            random_seed,
            ..Self::default()
        }
    }
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            random_seed: 0,
            max_head_combinations: Self::DEFAULT_MAX_HEAD_COMBINATIONS,
        }
    }
}
