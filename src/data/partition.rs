//! Train/test partitioning strategies.

use std::sync::Arc;

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::data::dataset::{SharedDataset, Subset};

/// How the held-out partition is sized and drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionStrategy {
    /// Train and test come from separate sources; the test source is capped
    /// at `floor(len(train) * (1 - train_test_split))` samples.
    FractionOfTrain,
    /// One pool is shuffled and split: `floor(n * (1 - train_test_split))`
    /// samples go to test, the rest to train.
    RandomSplit,
}

/// Held-out sample count for `n` samples at the given train ratio.
pub fn test_size(n: usize, train_ratio: f64) -> usize {
    // Plain floor of the float product: 10 · (1 - 0.9) is just below 1 and gives 0.
    ((n as f64) * (1.0 - train_ratio)).floor().max(0.0) as usize
}

/// Randomly splits `pool` into disjoint `(train, test)` subsets.
pub fn random_split(pool: SharedDataset, train_ratio: f64, seed: u64) -> (Subset, Subset) {
    let n = pool.len();
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let n_test = test_size(n, train_ratio).min(n);
    let test_indices = indices.split_off(n - n_test);
    (Subset::new(Arc::clone(&pool), indices), Subset::new(pool, test_indices))
}
