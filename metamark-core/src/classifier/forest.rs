//! Random forest over binary presence features.

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::features::FeatureVector;

/// A node of a fitted tree, indexed into the tree's node arena.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
enum Node {
    /// Fraction of tampered samples that reached this leaf during fitting.
    Leaf { probability: f64 },
    /// Goes left when `features[feature] <= threshold`.
    Split {
        feature: usize,
        threshold: f32,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct GrowParams {
    n_features: usize,
    max_depth: usize,
    min_split: usize,
    mtry: usize,
}

fn gini(positives: usize, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let p = positives as f64 / total as f64;
    1.0 - p * p - (1.0 - p) * (1.0 - p)
}

fn feature_at(features: &FeatureVector, index: usize) -> f32 {
    features.values().get(index).copied().unwrap_or(0.0)
}

impl DecisionTree {
    fn fit(
        x: &[FeatureVector],
        y: &[bool],
        indices: Vec<usize>,
        params: &GrowParams,
        rng: &mut StdRng,
    ) -> DecisionTree {
        let mut nodes = Vec::new();
        Self::grow(&mut nodes, x, y, indices, 0, params, rng);
        DecisionTree { nodes }
    }

    fn grow(
        nodes: &mut Vec<Node>,
        x: &[FeatureVector],
        y: &[bool],
        indices: Vec<usize>,
        depth: usize,
        params: &GrowParams,
        rng: &mut StdRng,
    ) -> usize {
        let positives = indices.iter().filter(|&&i| y[i]).count();
        let probability = positives as f64 / indices.len() as f64;
        if depth >= params.max_depth
            || indices.len() < params.min_split
            || positives == 0
            || positives == indices.len()
        {
            nodes.push(Node::Leaf { probability });
            return nodes.len() - 1;
        }

        let mut candidates: Vec<usize> = (0..params.n_features).collect();
        candidates.shuffle(rng);
        candidates.truncate(params.mtry);

        let parent_gini = gini(positives, indices.len());
        let mut best: Option<(usize, f64)> = None;
        for &feature in &candidates {
            let mut left = (0usize, 0usize);
            let mut right = (0usize, 0usize);
            for &i in &indices {
                let side = if feature_at(&x[i], feature) <= 0.5 {
                    &mut left
                } else {
                    &mut right
                };
                side.0 += 1;
                if y[i] {
                    side.1 += 1;
                }
            }
            if left.0 == 0 || right.0 == 0 {
                continue;
            }
            let weighted = (left.0 as f64 * gini(left.1, left.0)
                + right.0 as f64 * gini(right.1, right.0))
                / indices.len() as f64;
            if best.map_or(true, |(_, score)| weighted < score) {
                best = Some((feature, weighted));
            }
        }

        match best {
            // A split must actually reduce impurity, otherwise the node
            // becomes a leaf.
            Some((feature, weighted)) if weighted < parent_gini - 1e-12 => {
                let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
                    .iter()
                    .copied()
                    .partition(|&i| feature_at(&x[i], feature) <= 0.5);

                let node = nodes.len();
                nodes.push(Node::Split {
                    feature,
                    threshold: 0.5,
                    left: 0,
                    right: 0,
                });
                let left = Self::grow(nodes, x, y, left_idx, depth + 1, params, rng);
                let right = Self::grow(nodes, x, y, right_idx, depth + 1, params, rng);
                if let Node::Split {
                    left: l, right: r, ..
                } = &mut nodes[node]
                {
                    *l = left;
                    *r = right;
                }
                node
            }
            _ => {
                nodes.push(Node::Leaf { probability });
                nodes.len() - 1
            }
        }
    }

    fn probability(&self, features: &FeatureVector) -> f64 {
        let mut at = 0;
        loop {
            match self.nodes.get(at) {
                None => return 0.0,
                Some(Node::Leaf { probability }) => return *probability,
                Some(Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    at = if feature_at(features, *feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}

/// A bagged ensemble of decision trees.
///
/// Each tree fits a bootstrap resample of the training set with a fresh
/// random feature subset considered at every split. The ensemble probability
/// is the mean of the per-tree leaf probabilities. Fitting is fully
/// deterministic given the RNG handed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
}

impl PresenceForest {
    pub(crate) fn fit_samples(
        x: &[FeatureVector],
        y: &[bool],
        trees: usize,
        max_depth: usize,
        min_split: usize,
        rng: &mut StdRng,
    ) -> PresenceForest {
        let n_features = x.first().map(|v| v.len()).unwrap_or(0);
        if x.is_empty() {
            return PresenceForest {
                trees: Vec::new(),
                n_features,
            };
        }
        let params = GrowParams {
            n_features,
            max_depth,
            min_split,
            mtry: ((n_features as f64).sqrt().ceil() as usize).max(1),
        };
        let n = x.len();
        let trees = (0..trees.max(1))
            .map(|_| {
                let indices: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
                DecisionTree::fit(x, y, indices, &params, rng)
            })
            .collect();
        PresenceForest { trees, n_features }
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Mean tampered probability across the ensemble.
    pub fn probability(&self, features: &FeatureVector) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trees.iter().map(|t| t.probability(features)).sum();
        sum / self.trees.len() as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn vectors(rows: &[[f32; 5]]) -> Vec<FeatureVector> {
        rows.iter().map(|r| FeatureVector::new(r.to_vec())).collect()
    }

    fn separable_data() -> (Vec<FeatureVector>, Vec<bool>) {
        let mut x = Vec::new();
        let mut y = Vec::new();
        for _ in 0..10 {
            x.push(FeatureVector::new(vec![1.0; 5]));
            y.push(false);
            x.push(FeatureVector::new(vec![0.0; 5]));
            y.push(true);
        }
        (x, y)
    }

    #[test]
    fn test_separable_classes_get_confident_probabilities() {
        let (x, y) = separable_data();
        let mut rng = StdRng::seed_from_u64(7);
        let forest = PresenceForest::fit_samples(&x, &y, 25, 8, 2, &mut rng);

        assert!(forest.probability(&FeatureVector::new(vec![0.0; 5])) > 0.8);
        assert!(forest.probability(&FeatureVector::new(vec![1.0; 5])) < 0.2);
    }

    #[test]
    fn test_fitting_is_deterministic_for_a_seed() {
        let (x, y) = separable_data();
        let mut rng_a = StdRng::seed_from_u64(42);
        let mut rng_b = StdRng::seed_from_u64(42);

        let forest_a = PresenceForest::fit_samples(&x, &y, 10, 8, 2, &mut rng_a);
        let forest_b = PresenceForest::fit_samples(&x, &y, 10, 8, 2, &mut rng_b);
        assert_eq!(forest_a, forest_b);
    }

    #[test]
    fn test_single_class_data_yields_constant_probability() {
        let x = vectors(&[[1.0, 0.0, 1.0, 0.0, 1.0], [0.0, 1.0, 0.0, 1.0, 0.0]]);
        let y = vec![false, false];
        let mut rng = StdRng::seed_from_u64(3);
        let forest = PresenceForest::fit_samples(&x, &y, 5, 8, 2, &mut rng);

        assert_eq!(forest.probability(&FeatureVector::new(vec![1.0; 5])), 0.0);
        assert_eq!(forest.probability(&FeatureVector::new(vec![0.0; 5])), 0.0);
    }

    #[test]
    fn test_empty_training_set_yields_an_inert_forest() {
        let mut rng = StdRng::seed_from_u64(3);
        let forest = PresenceForest::fit_samples(&[], &[], 5, 8, 2, &mut rng);
        assert_eq!(forest.n_trees(), 0);
        assert_eq!(forest.probability(&FeatureVector::new(vec![1.0; 5])), 0.0);
    }

    #[test]
    fn test_short_input_vectors_read_as_absent() {
        let (x, y) = separable_data();
        let mut rng = StdRng::seed_from_u64(7);
        let forest = PresenceForest::fit_samples(&x, &y, 25, 8, 2, &mut rng);

        // Missing positions behave like zeros, the all-absent direction.
        let short = FeatureVector::new(vec![]);
        assert!(forest.probability(&short) > 0.8);
    }
}
