//! Random forest risk classifier.
//!
//! A bagged ensemble of CART trees. Each tree sees a bootstrap sample of the
//! training rows, optionally reweighted so that rare risk classes carry as
//! much total weight as common ones. The forest probability for a row is the
//! mean of the tree probabilities.
//!
//! # Example
//!
//! ```
//! use flightrisk::dataset::FeatureMatrix;
//! use flightrisk::flight::RiskLevel;
//! use flightrisk::forest::{ForestParams, RandomForest};
//!
//! let matrix = FeatureMatrix::from_rows(&[
//!     vec![0.0, 1.0],
//!     vec![0.1, 0.9],
//!     vec![0.9, 0.1],
//!     vec![1.0, 0.0],
//! ])?;
//! let labels = [RiskLevel::Low, RiskLevel::Low, RiskLevel::High, RiskLevel::High];
//! let params = ForestParams { n_trees: 10, ..ForestParams::default() };
//!
//! let forest = RandomForest::fit(&matrix, &labels, &params)?;
//! let proba = forest.predict_proba(&[0.95, 0.05]);
//! assert!((proba.as_array().iter().sum::<f64>() - 1.0).abs() < 1e-9);
//! # Ok::<(), flightrisk::Error>(())
//! ```

pub mod sampling;
pub mod tree;

use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;
use serde::Serialize;
use tracing::{debug, info, trace};

use crate::config::ModelConfig;
use crate::dataset::FeatureMatrix;
use crate::error::{Error, Result};
use crate::flight::{round2, RiskLevel, N_CLASSES};

pub use tree::{DecisionTree, Node, TreeParams};

/// Training parameters for the whole ensemble.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForestParams {
    /// Number of trees.
    pub n_trees: usize,
    /// Master seed.
    pub seed: u64,
    /// Reweight classes inversely to their frequency.
    pub class_balance: bool,
    /// Maximum tree depth, unlimited when `None`.
    pub max_depth: Option<usize>,
    /// Minimum distinct rows needed to split a node.
    pub min_samples_split: usize,
    /// Features drawn per split; `floor(sqrt(n_features))` when `None`.
    pub max_features: Option<usize>,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self::from(&ModelConfig::default())
    }
}

impl From<&ModelConfig> for ForestParams {
    fn from(config: &ModelConfig) -> Self {
        Self {
            n_trees: config.n_trees,
            seed: config.seed,
            class_balance: config.class_balance,
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            max_features: config.max_features,
        }
    }
}

/// Probability distribution over the risk classes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClassProbabilities([f64; N_CLASSES]);

impl ClassProbabilities {
    /// Wrap a raw distribution.
    #[must_use]
    pub fn new(probabilities: [f64; N_CLASSES]) -> Self {
        Self(probabilities)
    }

    /// Probability of one class.
    #[must_use]
    pub fn get(&self, level: RiskLevel) -> f64 {
        self.0[level.index()]
    }

    /// Probability of one class as a percentage rounded to two decimals.
    #[must_use]
    pub fn percent(&self, level: RiskLevel) -> f64 {
        round2(self.get(level) * 100.0)
    }

    /// The most probable class. Ties go to the lower class.
    #[must_use]
    pub fn most_likely(&self) -> RiskLevel {
        let mut best = RiskLevel::Low;
        for level in RiskLevel::ALL {
            if self.get(level) > self.get(best) {
                best = level;
            }
        }
        best
    }

    /// Raw probabilities in class order.
    #[must_use]
    pub fn as_array(&self) -> &[f64; N_CLASSES] {
        &self.0
    }
}

/// A fitted random forest.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
    class_weights: [f64; N_CLASSES],
}

impl RandomForest {
    /// Train a forest on `matrix` against `labels`.
    ///
    /// Training is deterministic for a given `params.seed`.
    ///
    /// # Errors
    ///
    /// - [`Error::EmptyFeatureMatrix`] if the matrix has no rows or no columns
    /// - [`Error::ConfigValidation`] if `n_trees` is 0
    /// - [`Error::Internal`] if `labels` does not have one entry per row
    pub fn fit(
        matrix: &FeatureMatrix,
        labels: &[RiskLevel],
        params: &ForestParams,
    ) -> Result<Self> {
        if matrix.is_empty() {
            return Err(Error::EmptyFeatureMatrix {
                rows: matrix.n_rows(),
                columns: matrix.n_cols(),
            });
        }
        if labels.len() != matrix.n_rows() {
            return Err(Error::internal(format!(
                "{} labels for {} feature rows",
                labels.len(),
                matrix.n_rows()
            )));
        }
        if params.n_trees == 0 {
            return Err(Error::config_validation("n_trees must be greater than 0"));
        }

        let class_weights = sampling::class_weights(labels, params.class_balance);
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            max_features: sampling::resolve_max_features(matrix.n_cols(), params.max_features),
        };

        info!(
            "Training random forest: {} trees on {} rows x {} features (max_features {}, balanced {})",
            params.n_trees,
            matrix.n_rows(),
            matrix.n_cols(),
            tree_params.max_features,
            params.class_balance
        );
        debug!("Class weights: {:?}", class_weights);

        let mut weights = vec![0.0; matrix.n_rows()];
        let trees = sampling::tree_seeds(params.seed, params.n_trees)
            .into_iter()
            .enumerate()
            .map(|(idx, seed)| {
                let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
                let counts = sampling::bootstrap_counts(matrix.n_rows(), &mut rng);
                for ((weight, &count), label) in weights.iter_mut().zip(&counts).zip(labels) {
                    *weight = f64::from(count) * class_weights[label.index()];
                }

                let tree = DecisionTree::fit(matrix, labels, &weights, &tree_params, &mut rng);
                trace!(
                    "Tree {}: {} nodes, {} leaves, depth {}",
                    idx,
                    tree.n_nodes(),
                    tree.n_leaves(),
                    tree.depth()
                );
                tree
            })
            .collect::<Vec<_>>();

        info!("Random forest trained");
        Ok(Self {
            trees,
            n_features: matrix.n_cols(),
            class_weights,
        })
    }

    /// Mean class probabilities over all trees.
    #[must_use]
    pub fn predict_proba(&self, row: &[f64]) -> ClassProbabilities {
        debug_assert_eq!(row.len(), self.n_features, "feature count mismatch");

        let mut sum = [0.0; N_CLASSES];
        for tree in &self.trees {
            for (acc, p) in sum.iter_mut().zip(tree.predict_proba(row)) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        ClassProbabilities(sum.map(|s| s / n))
    }

    /// Number of trees.
    #[must_use]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Per-class weights used during training.
    #[must_use]
    pub fn class_weights(&self) -> &[f64; N_CLASSES] {
        &self.class_weights
    }
}
