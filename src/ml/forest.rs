// ============================================================
// Layer 5 - Random Forest Classifier
// ============================================================
// An ensemble of decision trees for ONE label column.
//
// Fitting:
//   1. Classes are the sorted distinct label values; labels are
//      re-encoded as indices into that list
//   2. A master RNG (seeded from the caller) hands every tree its
//      own seed, so results do not depend on thread scheduling
//   3. Each tree gets a bootstrap sample (n draws with replacement,
//      stored as per-row draw counts) and is grown in parallel
//
// Prediction: average the trees' class probabilities and pick the
// most probable class (ties → lowest class value).

use anyhow::{bail, Result};
use ndarray::ArrayView1;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::ml::sparse::CsrMatrix;
use crate::ml::tree::{DecisionTree, TreeParams};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestParams {
    pub n_estimators: usize,
    pub bootstrap:    bool,
    pub tree:         TreeParams,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 10,
            bootstrap:    true,
            tree:         TreeParams::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    params:  ForestParams,
    classes: Vec<i64>,
    trees:   Vec<DecisionTree>,
}

impl RandomForest {
    pub fn new(params: ForestParams) -> Self {
        Self { params, classes: Vec::new(), trees: Vec::new() }
    }

    pub fn fit(&mut self, x: &CsrMatrix, y: ArrayView1<'_, i64>, seed: u64) -> Result<()> {
        if x.n_rows() != y.len() {
            bail!("forest got {} feature rows but {} labels", x.n_rows(), y.len());
        }
        if x.n_rows() == 0 {
            bail!("cannot fit a forest on zero samples");
        }
        if self.params.n_estimators == 0 {
            bail!("n_estimators must be at least 1");
        }

        self.classes = y.iter().copied().collect::<BTreeSet<_>>().into_iter().collect();
        let encoded: Vec<usize> = y
            .iter()
            .map(|v| self.classes.binary_search(v).unwrap_or_default())
            .collect();

        let mut master = StdRng::seed_from_u64(seed);
        let seeds: Vec<u64> = (0..self.params.n_estimators).map(|_| master.gen()).collect();

        let n_samples = x.n_rows();
        let n_classes = self.classes.len();
        let params    = self.params;

        self.trees = seeds
            .par_iter()
            .map(|&tree_seed| {
                let mut rng = StdRng::seed_from_u64(tree_seed);
                let weights = if params.bootstrap {
                    bootstrap_weights(n_samples, &mut rng)
                } else {
                    vec![1.0; n_samples]
                };
                DecisionTree::fit(x, &encoded, &weights, n_classes, &params.tree, &mut rng)
            })
            .collect();

        tracing::trace!(
            "Fitted forest: {} trees, {} classes, {} total nodes",
            self.trees.len(),
            n_classes,
            self.trees.iter().map(DecisionTree::node_count).sum::<usize>()
        );
        Ok(())
    }

    /// Mean class probabilities of every row, columns ordered like `classes()`
    pub fn predict_proba(&self, x: &CsrMatrix) -> Result<Vec<Vec<f64>>> {
        if self.trees.is_empty() {
            bail!("RandomForest is not fitted");
        }
        let n_trees = self.trees.len() as f64;
        let probas = (0..x.n_rows())
            .into_par_iter()
            .map(|row| {
                let mut acc = vec![0.0; self.classes.len()];
                for tree in &self.trees {
                    for (a, p) in acc.iter_mut().zip(tree.predict_proba_row(x, row)) {
                        *a += p;
                    }
                }
                acc.iter_mut().for_each(|a| *a /= n_trees);
                acc
            })
            .collect();
        Ok(probas)
    }

    pub fn predict(&self, x: &CsrMatrix) -> Result<Vec<i64>> {
        let probas = self.predict_proba(x)?;
        Ok(probas
            .iter()
            .map(|p| self.classes[argmax(p)])
            .collect())
    }

    pub fn classes(&self) -> &[i64] {
        &self.classes
    }

    #[cfg(test)]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

/// Draw `n` rows with replacement; weight = times drawn
fn bootstrap_weights<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<f64> {
    let mut weights = vec![0.0; n];
    for _ in 0..n {
        weights[rng.gen_range(0..n)] += 1.0;
    }
    weights
}

/// Index of the largest value; the first one wins a tie
fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}
