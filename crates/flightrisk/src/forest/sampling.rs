//! Row and feature sampling for forest training.
//!
//! Every tree draws a bootstrap sample of the rows and, at each node, a
//! random subset of features. All randomness flows from one master seed so
//! a given seed always produces the same forest.

use rand::prelude::*;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::flight::{RiskLevel, N_CLASSES};

/// Derive one independent seed per tree from the master seed.
#[must_use]
pub fn tree_seeds(master_seed: u64, n_trees: usize) -> Vec<u64> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(master_seed);
    (0..n_trees).map(|_| rng.gen::<u64>()).collect()
}

/// Draw `n_rows` row indices with replacement and return how often each row
/// was drawn.
#[must_use]
pub fn bootstrap_counts<R: Rng>(n_rows: usize, rng: &mut R) -> Vec<u32> {
    let mut counts = vec![0u32; n_rows];
    if n_rows == 0 {
        return counts;
    }
    for _ in 0..n_rows {
        counts[rng.gen_range(0..n_rows)] += 1;
    }
    counts
}

/// Per-class weights.
///
/// With balancing, class `c` gets `n / (k * count_c)` where `k` is the number
/// of classes present, so every present class carries the same total weight.
/// Classes absent from `labels` get weight 0. Without balancing every class
/// weighs 1.
#[must_use]
pub fn class_weights(labels: &[RiskLevel], balanced: bool) -> [f64; N_CLASSES] {
    if !balanced {
        return [1.0; N_CLASSES];
    }

    let counts = class_counts(labels);
    let present = counts.iter().filter(|&&c| c > 0).count();
    let n = labels.len() as f64;

    let mut weights = [0.0; N_CLASSES];
    for (weight, &count) in weights.iter_mut().zip(&counts) {
        if count > 0 {
            *weight = n / (present as f64 * count as f64);
        }
    }
    weights
}

/// Number of rows per class.
#[must_use]
pub fn class_counts(labels: &[RiskLevel]) -> [usize; N_CLASSES] {
    let mut counts = [0usize; N_CLASSES];
    for label in labels {
        counts[label.index()] += 1;
    }
    counts
}

/// Number of features to draw per split.
///
/// Defaults to `floor(sqrt(n_features))`; an explicit value is capped at
/// `n_features`. Never less than 1.
#[must_use]
pub fn resolve_max_features(n_features: usize, configured: Option<usize>) -> usize {
    let wanted = configured.unwrap_or_else(|| {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let sqrt = (n_features as f64).sqrt().floor() as usize;
        sqrt
    });
    wanted.clamp(1, n_features.max(1))
}
