//! Bagged ensemble of [`DecisionTree`]s.
//!
//! Each tree is grown on a bootstrap sample with `sqrt(n_features)` candidate
//! features per split. Class probabilities are the mean of the trees' leaf
//! distributions and the hard label is their argmax.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use super::tree::{DecisionTree, TreeParams};
use super::ModelError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<DecisionTree>,
    n_features: usize,
    n_classes: usize,
}

impl RandomForest {
    pub fn fit(
        x: &[Vec<f64>],
        y: &[usize],
        n_classes: usize,
        params: ForestParams,
    ) -> Result<Self, ModelError> {
        if x.is_empty() {
            return Err(ModelError::EmptyInput("forest fit"));
        }
        if params.n_estimators == 0 {
            return Err(ModelError::InvalidParameter(
                "n_estimators must be at least 1".into(),
            ));
        }

        let n = x.len();
        let n_features = x[0].len();
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split.max(2),
            max_features: ((n_features as f64).sqrt() as usize).clamp(1, n_features.max(1)),
        };

        let mut trees = Vec::with_capacity(params.n_estimators);
        for t in 0..params.n_estimators {
            let mut rng = ChaCha8Rng::seed_from_u64(params.seed.wrapping_add(t as u64));
            let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let tree = DecisionTree::fit(x, y, &bootstrap, n_classes, tree_params, &mut rng)?;
            tracing::trace!(tree = t, nodes = tree.n_nodes(), depth = tree.depth(), "Tree grown");
            trees.push(tree);
        }

        Ok(Self {
            trees,
            n_features,
            n_classes,
        })
    }

    /// Mean class distribution over all trees.
    pub fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, ModelError> {
        if row.len() != self.n_features {
            return Err(ModelError::FeatureWidth {
                expected: self.n_features,
                actual: row.len(),
            });
        }

        let mut proba = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in proba.iter_mut().zip(tree.predict_proba(row)) {
                *acc += p;
            }
        }

        let total: f64 = proba.iter().sum();
        if !(total.is_finite() && total > 0.0) {
            return Err(ModelError::Corrupt("forest produced no probability mass".into()));
        }
        for p in &mut proba {
            *p /= total;
        }
        Ok(proba)
    }

    /// Index of the most probable class; ties go to the lowest index.
    pub fn predict(&self, row: &[f64]) -> Result<usize, ModelError> {
        Ok(argmax(&self.predict_proba(row)?))
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        if self.trees.is_empty() {
            return Err(ModelError::Corrupt("empty forest".into()));
        }
        for tree in &self.trees {
            if tree.n_features() != self.n_features {
                return Err(ModelError::Corrupt(
                    "inconsistent n_features across trees".into(),
                ));
            }
            tree.validate()?;
        }
        Ok(())
    }
}

pub fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in values.iter().enumerate().skip(1) {
        if v > values[best] {
            best = i;
        }
    }
    best
}
