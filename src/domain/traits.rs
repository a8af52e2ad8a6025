// ============================================================
// Layer 3 - Core Traits (Abstractions)
// ============================================================
// The application layer only talks to these traits:
//   - CorpusSource        → SqliteLoader (Layer 4)
//   - MultiLabelClassifier → TextPipeline, GridSearch (Layer 5)
//   - Persistable          → TrainedModel (Layer 6)
//
// Reference: Rust Book §10 (Traits: Defining Shared Behaviour)

use anyhow::{bail, Result};
use ndarray::Array2;
use std::path::Path;

use crate::domain::corpus::Corpus;

// ─── CorpusSource ─────────────────────────────────────────────────────────────
/// Any component that can produce a labelled message corpus.
pub trait CorpusSource {
    /// Read the whole corpus. Fails if the source is missing or malformed.
    fn load(&self) -> Result<Corpus>;
}

// ─── MultiLabelClassifier ─────────────────────────────────────────────────────
/// Predicts one label per category for each raw message.
///
/// Labels are passed and returned as `[n_messages, n_categories]`
/// matrices, in the category order of the corpus they came from.
pub trait MultiLabelClassifier {
    /// Fit on raw texts and their label matrix. Refitting replaces
    /// any previous state.
    fn fit(&mut self, texts: &[String], labels: &Array2<i64>) -> Result<()>;

    /// Predict a label matrix with one row per text.
    fn predict(&self, texts: &[String]) -> Result<Array2<i64>>;

    /// Subset accuracy: the fraction of rows whose every label is right.
    fn score(&self, texts: &[String], labels: &Array2<i64>) -> Result<f64> {
        let predicted = self.predict(texts)?;
        subset_accuracy(labels, &predicted)
    }
}

/// Fraction of rows where `predicted` matches `truth` in every column.
pub fn subset_accuracy(truth: &Array2<i64>, predicted: &Array2<i64>) -> Result<f64> {
    if truth.dim() != predicted.dim() {
        bail!(
            "cannot score predictions of shape {:?} against labels of shape {:?}",
            predicted.dim(),
            truth.dim()
        );
    }
    if truth.nrows() == 0 {
        return Ok(0.0);
    }
    let exact = truth
        .outer_iter()
        .zip(predicted.outer_iter())
        .filter(|(t, p)| t == p)
        .count();
    Ok(exact as f64 / truth.nrows() as f64)
}

// ─── Persistable ──────────────────────────────────────────────────────────────
/// Any component whose state can be saved and restored from disk.
pub trait Persistable: Sized {
    /// Save this component's state to the given path, replacing any file there
    fn save(&self, path: &Path) -> Result<()>;

    /// Load a component's state from the given path
    fn load(path: &Path) -> Result<Self>;
}
