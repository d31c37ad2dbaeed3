//! CART classification trees.
//!
//! Trees are grown depth-first on weighted rows using Gini impurity. Nodes
//! live in a flat vector; a split refers to its children by index.

use rand::prelude::*;

use crate::dataset::FeatureMatrix;
use crate::flight::{RiskLevel, N_CLASSES};

/// Two feature values closer than this are treated as equal when searching
/// for thresholds.
const FEATURE_THRESHOLD: f64 = 1e-7;

/// Growth limits for a single tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeParams {
    /// Maximum depth; the root is depth 0. Unlimited when `None`.
    pub max_depth: Option<usize>,
    /// Nodes with fewer distinct rows than this become leaves.
    pub min_samples_split: usize,
    /// Features inspected per split before settling on the best one.
    pub max_features: usize,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            max_features: 1,
        }
    }
}

/// A node in a decision tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// Internal split node. Rows with `value <= threshold` go left.
    Split {
        /// Feature index.
        feature: u32,
        /// Split threshold.
        threshold: f64,
        /// Index of the left child.
        left: u32,
        /// Index of the right child.
        right: u32,
    },
    /// Leaf with the normalised weighted class distribution of its rows.
    Leaf([f64; N_CLASSES]),
}

/// A fitted classification tree.
#[derive(Debug, Clone, PartialEq)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    depth: usize,
}

/// Best split found so far for a node.
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature: usize,
    threshold: f64,
    /// Weighted sum of child impurities; lower is better.
    child_impurity: f64,
}

/// A node waiting to be grown.
#[derive(Debug)]
struct PendingNode {
    node: usize,
    rows: Vec<u32>,
    depth: usize,
}

impl DecisionTree {
    /// Grow a tree.
    ///
    /// `weights[i]` is the sample weight of row `i`; rows with zero weight
    /// (e.g. not drawn by the bootstrap) are left out entirely.
    ///
    /// # Panics
    ///
    /// Panics if `labels` or `weights` do not have one entry per matrix row.
    pub fn fit<R: Rng>(
        matrix: &FeatureMatrix,
        labels: &[RiskLevel],
        weights: &[f64],
        params: &TreeParams,
        rng: &mut R,
    ) -> Self {
        assert_eq!(labels.len(), matrix.n_rows(), "one label per row");
        assert_eq!(weights.len(), matrix.n_rows(), "one weight per row");

        let builder = TreeBuilder {
            matrix,
            labels,
            weights,
            params,
        };
        builder.grow(rng)
    }

    /// A tree made of a single leaf. Used when no row carries weight.
    #[must_use]
    pub fn constant(distribution: [f64; N_CLASSES]) -> Self {
        Self {
            nodes: vec![Node::Leaf(normalise(distribution))],
            depth: 0,
        }
    }

    /// Class probabilities for one row of features.
    ///
    /// A feature missing from `row` sends the row right.
    #[must_use]
    pub fn predict_proba(&self, row: &[f64]) -> [f64; N_CLASSES] {
        let mut idx = 0usize;
        loop {
            match &self.nodes[idx] {
                Node::Leaf(proba) => return *proba,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let go_left = row
                        .get(*feature as usize)
                        .is_some_and(|&value| value <= *threshold);
                    let next = if go_left { *left } else { *right };
                    idx = next as usize;
                }
            }
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Number of leaves.
    #[must_use]
    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf(_)))
            .count()
    }

    /// Depth of the deepest leaf.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth
    }
}

struct TreeBuilder<'a> {
    matrix: &'a FeatureMatrix,
    labels: &'a [RiskLevel],
    weights: &'a [f64],
    params: &'a TreeParams,
}

impl TreeBuilder<'_> {
    fn grow<R: Rng>(&self, rng: &mut R) -> DecisionTree {
        let root_rows: Vec<u32> = (0..self.matrix.n_rows())
            .filter(|&i| self.weights[i] > 0.0)
            .filter_map(|i| u32::try_from(i).ok())
            .collect();

        if root_rows.is_empty() {
            return DecisionTree::constant([1.0; N_CLASSES]);
        }

        let mut nodes = vec![Node::Leaf([0.0; N_CLASSES])];
        let mut max_depth = 0;
        let mut stack = vec![PendingNode {
            node: 0,
            rows: root_rows,
            depth: 0,
        }];
        let mut scratch = Vec::new();

        while let Some(pending) = stack.pop() {
            max_depth = max_depth.max(pending.depth);
            let distribution = self.distribution(&pending.rows);

            let split = if self.is_terminal(&pending, &distribution) {
                None
            } else {
                self.best_split(&pending.rows, &distribution, &mut scratch, rng)
            };

            let Some(split) = split else {
                nodes[pending.node] = Node::Leaf(normalise(distribution));
                continue;
            };

            let (left_rows, right_rows): (Vec<u32>, Vec<u32>) = pending
                .rows
                .iter()
                .partition(|&&r| self.matrix.value(r as usize, split.feature) <= split.threshold);

            let left = nodes.len();
            let right = left + 1;
            nodes.push(Node::Leaf([0.0; N_CLASSES]));
            nodes.push(Node::Leaf([0.0; N_CLASSES]));
            nodes[pending.node] = Node::Split {
                feature: index_u32(split.feature),
                threshold: split.threshold,
                left: index_u32(left),
                right: index_u32(right),
            };

            stack.push(PendingNode {
                node: right,
                rows: right_rows,
                depth: pending.depth + 1,
            });
            stack.push(PendingNode {
                node: left,
                rows: left_rows,
                depth: pending.depth + 1,
            });
        }

        DecisionTree {
            nodes,
            depth: max_depth,
        }
    }

    /// Weighted class totals over `rows`.
    fn distribution(&self, rows: &[u32]) -> [f64; N_CLASSES] {
        let mut dist = [0.0; N_CLASSES];
        for &r in rows {
            let r = r as usize;
            dist[self.labels[r].index()] += self.weights[r];
        }
        dist
    }

    fn is_terminal(&self, pending: &PendingNode, distribution: &[f64; N_CLASSES]) -> bool {
        let pure = distribution.iter().filter(|&&w| w > 0.0).count() <= 1;
        let too_deep = self
            .params
            .max_depth
            .is_some_and(|limit| pending.depth >= limit);
        pure || too_deep || pending.rows.len() < self.params.min_samples_split
    }

    /// Search for the split with the lowest weighted Gini impurity.
    ///
    /// Features are visited in random order. The search stops after
    /// `max_features` non-constant features once a valid split exists, and
    /// keeps going past that limit until one is found.
    fn best_split<R: Rng>(
        &self,
        rows: &[u32],
        parent: &[f64; N_CLASSES],
        scratch: &mut Vec<(f64, u32)>,
        rng: &mut R,
    ) -> Option<SplitCandidate> {
        let mut features: Vec<usize> = (0..self.matrix.n_cols()).collect();
        features.shuffle(rng);

        let parent_weight: f64 = parent.iter().sum();
        let mut best: Option<SplitCandidate> = None;
        let mut visited = 0;

        for feature in features {
            if visited >= self.params.max_features && best.is_some() {
                break;
            }

            scratch.clear();
            scratch.extend(rows.iter().map(|&r| (self.matrix.value(r as usize, feature), r)));
            scratch.sort_by(|a, b| a.0.total_cmp(&b.0));

            let (Some(first), Some(last)) = (scratch.first(), scratch.last()) else {
                continue;
            };
            if last.0 <= first.0 + FEATURE_THRESHOLD {
                // Constant features do not count towards max_features
                continue;
            }
            visited += 1;

            let mut left = [0.0; N_CLASSES];
            let mut left_weight = 0.0;
            for pos in 0..scratch.len() - 1 {
                let (value, row) = scratch[pos];
                let w = self.weights[row as usize];
                left[self.labels[row as usize].index()] += w;
                left_weight += w;

                let next = scratch[pos + 1].0;
                if next <= value + FEATURE_THRESHOLD {
                    continue;
                }

                let right: [f64; N_CLASSES] = std::array::from_fn(|c| parent[c] - left[c]);
                let right_weight = parent_weight - left_weight;

                let child_impurity = left_weight * gini(&left, left_weight)
                    + right_weight * gini(&right, right_weight);

                if best.map_or(true, |b| child_impurity < b.child_impurity) {
                    let mut threshold = value / 2.0 + next / 2.0;
                    if threshold >= next || !threshold.is_finite() {
                        threshold = value;
                    }
                    best = Some(SplitCandidate {
                        feature,
                        threshold,
                        child_impurity,
                    });
                }
            }
        }

        best
    }
}

/// Gini impurity of a weighted class distribution.
fn gini(distribution: &[f64; N_CLASSES], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - distribution
        .iter()
        .map(|w| {
            let p = w / total;
            p * p
        })
        .sum::<f64>()
}

/// Scale a distribution to sum to 1. An all-zero input becomes uniform.
fn normalise(distribution: [f64; N_CLASSES]) -> [f64; N_CLASSES] {
    let total: f64 = distribution.iter().sum();
    if total <= 0.0 {
        return [1.0 / N_CLASSES as f64; N_CLASSES];
    }
    distribution.map(|w| w / total)
}

fn index_u32(index: usize) -> u32 {
    u32::try_from(index).unwrap_or(u32::MAX)
}
