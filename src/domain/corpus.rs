// ============================================================
// Layer 3 - Corpus Domain Type
// ============================================================
// The message corpus: an ordered collection of messages, each
// paired with one integer label per category.
//
// Layout:
//   messages    [n]            raw message text
//   labels      [n, k]         one row per message, one column per category
//   categories  [k]            column names, in table order
//
// Labels are not restricted to 0/1. The real disaster table
// carries a `related` column with values {0, 1, 2}, so every
// column is treated as a small multiclass target.

use anyhow::{bail, Result};
use ndarray::{Array2, ArrayView1, Axis};

/// Labelled messages loaded from the store.
///
/// Construction goes through [`Corpus::new`], which enforces the
/// shape invariants; after that the fields are read-only.
#[derive(Debug, Clone)]
pub struct Corpus {
    messages:   Vec<String>,
    labels:     Array2<i64>,
    categories: Vec<String>,
}

impl Corpus {
    /// Build a corpus, checking that row counts and column counts agree.
    pub fn new(
        messages:   Vec<String>,
        labels:     Array2<i64>,
        categories: Vec<String>,
    ) -> Result<Self> {
        if messages.len() != labels.nrows() {
            bail!(
                "corpus has {} messages but {} label rows",
                messages.len(),
                labels.nrows()
            );
        }
        if categories.len() != labels.ncols() {
            bail!(
                "corpus has {} categories but {} label columns",
                categories.len(),
                labels.ncols()
            );
        }
        Ok(Self { messages, labels, categories })
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }

    pub fn labels(&self) -> &Array2<i64> {
        &self.labels
    }

    pub fn categories(&self) -> &[String] {
        &self.categories
    }

    /// Labels of a single category, one entry per message
    pub fn category_labels(&self, index: usize) -> ArrayView1<'_, i64> {
        self.labels.column(index)
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// A new corpus holding only the rows at `indices`, in that order.
    /// Category names are shared by every subset.
    pub fn select(&self, indices: &[usize]) -> Corpus {
        Corpus {
            messages:   indices.iter().map(|&i| self.messages[i].clone()).collect(),
            labels:     self.labels.select(Axis(0), indices),
            categories: self.categories.clone(),
        }
    }
}
