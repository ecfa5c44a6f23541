use crate::domain::ports::ModelConfig;
use crate::ml::tree::{DecisionTree, TreeParams};
use crate::utils::error::{ForecastError, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Bagged ensemble of [`DecisionTree`]s over integer class labels.
#[derive(Debug, Clone)]
pub struct RandomForestClassifier {
    classes: Vec<u32>,
    trees: Vec<DecisionTree>,
}

/// `n / (n_classes * count(c))` per class, aligned with `counts`.
pub fn balanced_class_weights(counts: &[usize]) -> Vec<f64> {
    let n: usize = counts.iter().sum();
    let k = counts.len();
    counts
        .iter()
        .map(|&c| {
            if c == 0 {
                0.0
            } else {
                n as f64 / (k * c) as f64
            }
        })
        .collect()
}

/// Features considered per split: floor(sqrt(width)), at least one.
pub fn sqrt_features(width: usize) -> usize {
    ((width as f64).sqrt() as usize).max(1)
}

impl RandomForestClassifier {
    pub fn fit(x: &[Vec<f64>], y: &[u32], config: &ModelConfig) -> Result<Self> {
        if x.is_empty() {
            return Err(ForecastError::ModelError {
                message: "cannot fit on an empty training set".to_string(),
            });
        }
        if x.len() != y.len() {
            return Err(ForecastError::ModelError {
                message: format!("{} feature rows but {} targets", x.len(), y.len()),
            });
        }
        if config.n_estimators == 0 {
            return Err(ForecastError::ModelError {
                message: "n_estimators must be at least 1".to_string(),
            });
        }

        let mut classes: Vec<u32> = y.to_vec();
        classes.sort_unstable();
        classes.dedup();

        let encoded: Vec<usize> = y
            .iter()
            .map(|label| classes.binary_search(label).unwrap_or_else(|pos| pos))
            .collect();

        let mut counts = vec![0usize; classes.len()];
        for &c in &encoded {
            counts[c] += 1;
        }
        let class_weights = if config.balanced_class_weight {
            balanced_class_weights(&counts)
        } else {
            vec![1.0; classes.len()]
        };

        let params = TreeParams {
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split,
            max_features: sqrt_features(x[0].len()),
        };

        // seeds are drawn up front so the ensemble does not depend on thread scheduling
        let mut master = ChaCha8Rng::seed_from_u64(config.random_state);
        let seeds: Vec<u64> = (0..config.n_estimators).map(|_| master.gen()).collect();

        let n = x.len();
        let n_classes = classes.len();
        let trees: Vec<DecisionTree> = seeds
            .par_iter()
            .map(|&seed| {
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                let mut weights = vec![0.0; n];
                for _ in 0..n {
                    weights[rng.gen_range(0..n)] += 1.0;
                }
                for (w, &c) in weights.iter_mut().zip(&encoded) {
                    *w *= class_weights[c];
                }
                DecisionTree::fit(x, &encoded, &weights, n_classes, params, &mut rng)
            })
            .collect();

        tracing::debug!(
            "Fitted {} trees over {} samples and {} classes",
            trees.len(),
            n,
            n_classes
        );

        Ok(Self { classes, trees })
    }

    /// Sorted class labels; the column order of [`Self::predict_proba`].
    pub fn classes(&self) -> &[u32] {
        &self.classes
    }

    pub fn n_estimators(&self) -> usize {
        self.trees.len()
    }

    pub fn predict_proba_row(&self, row: &[f64]) -> Vec<f64> {
        let mut probabilities = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (p, leaf) in probabilities.iter_mut().zip(tree.predict_proba_row(row)) {
                *p += leaf;
            }
        }
        let n = self.trees.len() as f64;
        probabilities.iter_mut().for_each(|p| *p /= n);
        probabilities
    }

    pub fn predict_proba(&self, rows: &[Vec<f64>]) -> Vec<Vec<f64>> {
        rows.iter().map(|row| self.predict_proba_row(row)).collect()
    }
}
