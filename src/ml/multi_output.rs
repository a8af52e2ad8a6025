// ============================================================
// Layer 5 - Multi-Output Classifier
// ============================================================
// Third pipeline stage. Wraps one independent RandomForest per
// label column:
//
//   labels [n, k]  ──►  forest_0 fits column 0
//                       forest_1 fits column 1
//                       ...
//                       forest_k-1 fits column k-1
//
// Prediction stacks each forest's column back into an [n, k]
// matrix. Every forest gets its own seed drawn from one master
// seed, so a fixed `random_state` makes the whole stage
// reproducible; `None` draws a fresh master seed per fit.

use anyhow::{bail, Result};
use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::ml::forest::{ForestParams, RandomForest};
use crate::ml::sparse::CsrMatrix;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultiOutputClassifier {
    params:       ForestParams,
    random_state: Option<u64>,
    estimators:   Vec<RandomForest>,
}

impl MultiOutputClassifier {
    pub fn new(params: ForestParams, random_state: Option<u64>) -> Self {
        Self { params, random_state, estimators: Vec::new() }
    }

    pub fn fit(&mut self, x: &CsrMatrix, labels: &Array2<i64>) -> Result<()> {
        if x.n_rows() != labels.nrows() {
            bail!(
                "got {} feature rows but {} label rows",
                x.n_rows(),
                labels.nrows()
            );
        }
        if labels.ncols() == 0 {
            bail!("need at least one label column");
        }

        let seed = self.random_state.unwrap_or_else(rand::random);
        let mut master = StdRng::seed_from_u64(seed);

        let mut estimators = Vec::with_capacity(labels.ncols());
        for (k, column) in labels.columns().into_iter().enumerate() {
            let mut forest = RandomForest::new(self.params);
            forest.fit(x, column, master.gen())?;
            tracing::trace!("Label column {k}: classes {:?}", forest.classes());
            estimators.push(forest);
        }
        self.estimators = estimators;
        Ok(())
    }

    pub fn predict(&self, x: &CsrMatrix) -> Result<Array2<i64>> {
        if self.estimators.is_empty() {
            bail!("MultiOutputClassifier is not fitted");
        }
        let mut out = Array2::<i64>::zeros((x.n_rows(), self.estimators.len()));
        for (k, forest) in self.estimators.iter().enumerate() {
            let column = Array1::from(forest.predict(x)?);
            out.column_mut(k).assign(&column);
        }
        Ok(out)
    }

    #[cfg(test)]
    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    #[cfg(test)]
    pub fn estimators(&self) -> &[RandomForest] {
        &self.estimators
    }
}
