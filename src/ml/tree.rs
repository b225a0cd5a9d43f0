//! CART classification tree with Gini impurity.
//!
//! Nodes live in a flat array; leaves keep the class frequency vector of the
//! training samples that reached them, so every prediction is a proper
//! probability distribution.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::ModelError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Samples with `row[feature] <= threshold` go left.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf { distribution: Vec<f64> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeParams {
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    /// Features considered per split.
    pub max_features: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
    n_features: usize,
    n_classes: usize,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    score: f64,
}

impl DecisionTree {
    /// Grow a tree over `samples`, a list of row indices into `x` (repeats allowed,
    /// which is how bootstrap weights are expressed).
    pub fn fit<R: Rng + ?Sized>(
        x: &[Vec<f64>],
        y: &[usize],
        samples: &[usize],
        n_classes: usize,
        params: TreeParams,
        rng: &mut R,
    ) -> Result<Self, ModelError> {
        if samples.is_empty() || x.is_empty() {
            return Err(ModelError::EmptyInput("tree fit"));
        }
        if x.len() != y.len() {
            return Err(ModelError::LengthMismatch {
                features: x.len(),
                labels: y.len(),
            });
        }
        if let Some(&label) = y.iter().find(|&&l| l >= n_classes) {
            return Err(ModelError::LabelOutOfRange { label, n_classes });
        }
        let n_features = x[0].len();
        if let Some(row) = x.iter().find(|r| r.len() != n_features) {
            return Err(ModelError::FeatureWidth {
                expected: n_features,
                actual: row.len(),
            });
        }
        if params.max_features == 0 || params.max_features > n_features {
            return Err(ModelError::InvalidParameter(format!(
                "max_features must be in 1..={n_features}, got {}",
                params.max_features
            )));
        }

        let mut nodes = vec![Node::Leaf {
            distribution: Vec::new(),
        }];
        let mut stack = vec![(0usize, samples.to_vec(), 0usize)];
        let mut features: Vec<usize> = (0..n_features).collect();

        while let Some((id, idx, depth)) = stack.pop() {
            let counts = class_counts(y, &idx, n_classes);
            let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
            let depth_reached = params.max_depth.is_some_and(|d| depth >= d);

            let split = if pure || depth_reached || idx.len() < params.min_samples_split {
                None
            } else {
                features.shuffle(rng);
                best_split(x, y, &idx, &features, params.max_features, n_classes)
            };

            match split {
                Some(split) => {
                    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = idx
                        .iter()
                        .partition(|&&i| x[i][split.feature] <= split.threshold);

                    let left = nodes.len();
                    let right = left + 1;
                    nodes.push(Node::Leaf {
                        distribution: Vec::new(),
                    });
                    nodes.push(Node::Leaf {
                        distribution: Vec::new(),
                    });
                    nodes[id] = Node::Split {
                        feature: split.feature,
                        threshold: split.threshold,
                        left,
                        right,
                    };
                    stack.push((right, right_idx, depth + 1));
                    stack.push((left, left_idx, depth + 1));
                }
                None => {
                    let total = idx.len() as f64;
                    nodes[id] = Node::Leaf {
                        distribution: counts.iter().map(|&c| c as f64 / total).collect(),
                    };
                }
            }
        }

        Ok(Self {
            nodes,
            n_features,
            n_classes,
        })
    }

    /// Class distribution of the leaf `row` falls into.
    pub fn predict_proba(&self, row: &[f64]) -> &[f64] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
                Node::Leaf { distribution } => return distribution,
            }
        }
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        let mut max_depth = 0;
        let mut stack = vec![(0usize, 0usize)];
        while let Some((id, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Node::Split { left, right, .. } = &self.nodes[id] {
                stack.push((*left, depth + 1));
                stack.push((*right, depth + 1));
            }
        }
        max_depth
    }

    /// Structural check for deserialized trees: child links point forward and
    /// every leaf is a distribution over `n_classes`.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.nodes.is_empty() {
            return Err(ModelError::Corrupt("tree has no nodes".into()));
        }
        for (id, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= self.n_features
                        || *left <= id
                        || *right <= id
                        || *left >= self.nodes.len()
                        || *right >= self.nodes.len()
                    {
                        return Err(ModelError::Corrupt(format!("bad split node {id}")));
                    }
                }
                Node::Leaf { distribution } => {
                    let sum: f64 = distribution.iter().sum();
                    if distribution.len() != self.n_classes || (sum - 1.0).abs() > 1e-6 {
                        return Err(ModelError::Corrupt(format!("bad leaf node {id}")));
                    }
                }
            }
        }
        Ok(())
    }
}

fn class_counts(y: &[usize], idx: &[usize], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; n_classes];
    for &i in idx {
        counts[y[i]] += 1;
    }
    counts
}

/// Sum of squared class counts over side size; larger means purer children.
fn purity(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    counts.iter().map(|&c| (c * c) as f64).sum::<f64>() / n as f64
}

/// Examine the first `max_features` entries of `features`, continuing past them
/// only while every feature examined so far was constant.
fn best_split(
    x: &[Vec<f64>],
    y: &[usize],
    idx: &[usize],
    features: &[usize],
    max_features: usize,
    n_classes: usize,
) -> Option<SplitCandidate> {
    let total = class_counts(y, idx, n_classes);
    let mut best: Option<SplitCandidate> = None;
    let mut values: Vec<(f64, usize)> = Vec::with_capacity(idx.len());

    for (visited, &feature) in features.iter().enumerate() {
        if visited >= max_features && best.is_some() {
            break;
        }

        values.clear();
        values.extend(idx.iter().map(|&i| (x[i][feature], y[i])));
        values.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left = vec![0usize; n_classes];
        let mut right = total.clone();
        let n = values.len();

        for pos in 0..n - 1 {
            let (value, label) = values[pos];
            left[label] += 1;
            right[label] -= 1;

            let next = values[pos + 1].0;
            if value >= next {
                continue;
            }

            let score = purity(&left, pos + 1) + purity(&right, n - pos - 1);
            if best.as_ref().map_or(true, |b| score > b.score) {
                let mut threshold = value + (next - value) / 2.0;
                // midpoint can round up to `next` for adjacent floats
                if threshold >= next {
                    threshold = value;
                }
                best = Some(SplitCandidate {
                    feature,
                    threshold,
                    score,
                });
            }
        }
    }

    best
}
