// ============================================================
// Layer 5 - Grid Search with K-Fold Cross-Validation
// ============================================================
// Exhaustively tries every combination in the parameter grid:
//
//   for each candidate params:
//       for each of k folds:
//           fit a fresh pipeline on the other k-1 folds
//           score it (subset accuracy) on the held-out fold
//       mean / std of the k scores
//
//   best = highest mean score (earliest candidate wins a tie)
//   refit the best candidate on ALL training rows
//
// Candidate order walks the parameter names alphabetically with
// the last name varying fastest:
//   clf.min_samples_split=2, tfidf.use_idf=true
//   clf.min_samples_split=2, tfidf.use_idf=false
//   clf.min_samples_split=4, tfidf.use_idf=true
//   clf.min_samples_split=4, tfidf.use_idf=false
//
// Folds are contiguous and unshuffled; the first n % k folds hold
// one extra row.

use anyhow::{bail, Context, Result};
use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::domain::traits::MultiLabelClassifier;
use crate::ml::pipeline::{PipelineParams, PipelineTemplate, TextPipeline};

// ─── Parameter grid ───────────────────────────────────────────────────────────
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParamGrid {
    pub min_samples_split: Vec<usize>,
    pub use_idf:           Vec<bool>,
}

impl ParamGrid {
    /// Every combination, in search order
    pub fn candidates(&self) -> Vec<PipelineParams> {
        self.min_samples_split
            .iter()
            .flat_map(|&min_samples_split| {
                self.use_idf
                    .iter()
                    .map(move |&use_idf| PipelineParams { use_idf, min_samples_split })
            })
            .collect()
    }
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            min_samples_split: vec![2, 4],
            use_idf:           vec![true, false],
        }
    }
}

// ─── K-fold splitter ──────────────────────────────────────────────────────────
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KFold {
    pub n_splits: usize,
}

/// Row indices of one fold: (train, test)
pub type FoldIndices = (Vec<usize>, Vec<usize>);

impl KFold {
    pub fn new(n_splits: usize) -> Self {
        Self { n_splits }
    }

    pub fn split(&self, n_samples: usize) -> Result<Vec<FoldIndices>> {
        let k = self.n_splits;
        if k < 2 {
            bail!("cross-validation needs at least 2 folds, got {k}");
        }
        if k > n_samples {
            bail!("cannot make {k} folds out of {n_samples} samples");
        }

        let base  = n_samples / k;
        let extra = n_samples % k;

        let mut folds = Vec::with_capacity(k);
        let mut start = 0;
        for fold in 0..k {
            let size = base + usize::from(fold < extra);
            let stop = start + size;
            let test: Vec<usize>  = (start..stop).collect();
            let train: Vec<usize> = (0..start).chain(stop..n_samples).collect();
            folds.push((train, test));
            start = stop;
        }
        Ok(folds)
    }
}

// ─── Results ──────────────────────────────────────────────────────────────────
/// Cross-validation outcome of one candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CvResult {
    pub params:          PipelineParams,
    pub fold_scores:     Vec<f64>,
    pub mean_test_score: f64,
    pub std_test_score:  f64,
    /// 1 = best; equal means share the lower rank
    pub rank:            usize,
}

// ─── GridSearch ───────────────────────────────────────────────────────────────
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GridSearch {
    grid:           ParamGrid,
    cv:             KFold,
    template:       PipelineTemplate,
    results:        Vec<CvResult>,
    best_index:     Option<usize>,
    best_estimator: Option<TextPipeline>,
}

impl GridSearch {
    pub fn new(grid: ParamGrid, cv: KFold, template: PipelineTemplate) -> Self {
        Self {
            grid,
            cv,
            template,
            results:        Vec::new(),
            best_index:     None,
            best_estimator: None,
        }
    }

    #[cfg(test)]
    pub fn grid(&self) -> &ParamGrid {
        &self.grid
    }

    #[cfg(test)]
    pub fn cv(&self) -> KFold {
        self.cv
    }

    #[cfg(test)]
    pub fn template(&self) -> &PipelineTemplate {
        &self.template
    }

    /// Per-candidate results, in candidate order (empty before fitting)
    pub fn results(&self) -> &[CvResult] {
        &self.results
    }

    pub fn best_result(&self) -> Option<&CvResult> {
        self.best_index.map(|i| &self.results[i])
    }

    #[cfg(test)]
    pub fn best_params(&self) -> Option<PipelineParams> {
        self.best_result().map(|r| r.params)
    }

    pub fn best_estimator(&self) -> Option<&TextPipeline> {
        self.best_estimator.as_ref()
    }

    fn cross_validate(
        &self,
        params: PipelineParams,
        texts:  &[String],
        labels: &Array2<i64>,
        folds:  &[FoldIndices],
    ) -> Result<Vec<f64>> {
        let mut scores = Vec::with_capacity(folds.len());
        for (f, (train, test)) in folds.iter().enumerate() {
            let train_texts: Vec<String> = train.iter().map(|&i| texts[i].clone()).collect();
            let test_texts:  Vec<String> = test.iter().map(|&i| texts[i].clone()).collect();
            let train_labels = labels.select(Axis(0), train);
            let test_labels  = labels.select(Axis(0), test);

            let mut pipeline = TextPipeline::new(params, &self.template);
            pipeline
                .fit(&train_texts, &train_labels)
                .with_context(|| format!("fitting fold {} for [{params}]", f + 1))?;
            let score = pipeline.score(&test_texts, &test_labels)?;

            tracing::debug!("[CV {}/{}] {params}; score={score:.3}", f + 1, folds.len());
            scores.push(score);
        }
        Ok(scores)
    }
}

impl MultiLabelClassifier for GridSearch {
    fn fit(&mut self, texts: &[String], labels: &Array2<i64>) -> Result<()> {
        if texts.len() != labels.nrows() {
            bail!("got {} texts but {} label rows", texts.len(), labels.nrows());
        }
        let candidates = self.grid.candidates();
        if candidates.is_empty() {
            bail!("parameter grid is empty");
        }

        let folds = self.cv.split(texts.len())?;
        tracing::info!(
            "Fitting {} folds for each of {} candidates, totalling {} fits",
            folds.len(),
            candidates.len(),
            folds.len() * candidates.len()
        );

        let mut results = Vec::with_capacity(candidates.len());
        for params in candidates {
            let fold_scores = self.cross_validate(params, texts, labels, &folds)?;
            let (mean, std) = mean_std(&fold_scores);
            tracing::info!("{params}: mean score {mean:.4} (+/- {std:.4})");
            results.push(CvResult {
                params,
                fold_scores,
                mean_test_score: mean,
                std_test_score:  std,
                rank:            0,
            });
        }
        assign_ranks(&mut results);

        let best_index = results
            .iter()
            .position(|r| r.rank == 1)
            .context("grid search produced no ranked candidate")?;
        let best_params = results[best_index].params;

        // ── Refit the winner on every training row ────────────────────────────
        let mut best = TextPipeline::new(best_params, &self.template);
        best.fit(texts, labels).context("refitting the best candidate")?;

        self.results        = results;
        self.best_index     = Some(best_index);
        self.best_estimator = Some(best);
        Ok(())
    }

    fn predict(&self, texts: &[String]) -> Result<Array2<i64>> {
        self.best_estimator
            .as_ref()
            .context("GridSearch is not fitted")?
            .predict(texts)
    }
}

/// Mean and population standard deviation
fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n    = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var  = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, var.sqrt())
}

/// Rank by descending mean score; ties share the lowest rank (1, 2, 2, 4)
fn assign_ranks(results: &mut [CvResult]) {
    let means: Vec<f64> = results.iter().map(|r| r.mean_test_score).collect();
    for r in results.iter_mut() {
        r.rank = 1 + means.iter().filter(|&&m| m > r.mean_test_score).count();
    }
}
