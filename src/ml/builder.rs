// ============================================================
// Layer 5 - Model Builder
// ============================================================
// Assembles the unfitted estimator:
//
//   GridSearch(
//     Pipeline[ CountVectorizer → TfidfTransformer → MultiOutput(RandomForest) ],
//     grid = { tfidf.use_idf: [true, false], clf.min_samples_split: [2, 4] },
//     cv   = KFold(3)
//   )
//
// Nothing is fitted here; build_model() is pure and cheap.

use serde::{Deserialize, Serialize};

use crate::ml::forest::ForestParams;
use crate::ml::grid_search::{GridSearch, KFold, ParamGrid};
use crate::ml::pipeline::PipelineTemplate;

/// Hyperparameters of the search and the fixed parts of the pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Trees per label column
    pub n_estimators:           usize,
    /// Number of cross-validation folds
    pub cv_folds:               usize,
    /// Values of `tfidf.use_idf` to try
    pub use_idf_grid:           Vec<bool>,
    /// Values of `clf.min_samples_split` to try
    pub min_samples_split_grid: Vec<usize>,
    /// Master seed for every forest; None = fresh entropy per fit
    pub random_state:           Option<u64>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            n_estimators:           10,
            cv_folds:               3,
            use_idf_grid:           vec![true, false],
            min_samples_split_grid: vec![2, 4],
            random_state:           None,
        }
    }
}

pub fn build_model(cfg: &ModelConfig) -> GridSearch {
    let grid = ParamGrid {
        min_samples_split: cfg.min_samples_split_grid.clone(),
        use_idf:           cfg.use_idf_grid.clone(),
    };
    let template = PipelineTemplate {
        forest: ForestParams {
            n_estimators: cfg.n_estimators,
            ..ForestParams::default()
        },
        random_state: cfg.random_state,
    };

    tracing::debug!(
        "Built grid search: {} candidates x {} folds, {} trees per label",
        grid.candidates().len(),
        cfg.cv_folds,
        cfg.n_estimators
    );
    GridSearch::new(grid, KFold::new(cfg.cv_folds), template)
}
