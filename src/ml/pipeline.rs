// ============================================================
// Layer 5 - Text Classification Pipeline
// ============================================================
// The fixed three-stage model:
//
//   raw texts ──► CountVectorizer ──► TfidfTransformer ──► MultiOutputClassifier
//                 (tokenize+count)    (weight+normalise)   (one forest per label)
//
// fit() fits each stage on the previous stage's output;
// predict() runs the fitted stages in the same order.
//
// Only two knobs vary between grid-search candidates
// (PipelineParams); everything else comes from the fixed
// PipelineTemplate.

use anyhow::Result;
use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::traits::MultiLabelClassifier;
use crate::ml::forest::ForestParams;
use crate::ml::multi_output::MultiOutputClassifier;
use crate::ml::tfidf::TfidfTransformer;
use crate::ml::tree::TreeParams;
use crate::ml::vectorizer::CountVectorizer;

/// The tunable hyperparameters of one pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineParams {
    /// tfidf: weight terms by inverse document frequency
    pub use_idf:           bool,
    /// forest trees: minimum samples needed to split a node
    pub min_samples_split: usize,
}

impl fmt::Display for PipelineParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "clf.min_samples_split={}, tfidf.use_idf={}",
            self.min_samples_split, self.use_idf
        )
    }
}

/// Settings shared by every candidate pipeline
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PipelineTemplate {
    pub forest:       ForestParams,
    pub random_state: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextPipeline {
    params:     PipelineParams,
    vectorizer: CountVectorizer,
    tfidf:      TfidfTransformer,
    classifier: MultiOutputClassifier,
}

impl TextPipeline {
    /// An unfitted pipeline with `params` applied on top of `template`
    pub fn new(params: PipelineParams, template: &PipelineTemplate) -> Self {
        let forest = ForestParams {
            tree: TreeParams {
                min_samples_split: params.min_samples_split,
                ..template.forest.tree
            },
            ..template.forest
        };
        Self {
            params,
            vectorizer: CountVectorizer::new(),
            tfidf:      TfidfTransformer::new(params.use_idf),
            classifier: MultiOutputClassifier::new(forest, template.random_state),
        }
    }

    #[cfg(test)]
    pub fn params(&self) -> PipelineParams {
        self.params
    }

    pub fn vocabulary_size(&self) -> usize {
        self.vectorizer.vocabulary_size()
    }
}

impl MultiLabelClassifier for TextPipeline {
    fn fit(&mut self, texts: &[String], labels: &Array2<i64>) -> Result<()> {
        let counts   = self.vectorizer.fit_transform(texts)?;
        let weighted = self.tfidf.fit_transform(&counts)?;
        tracing::debug!(
            "Vectorised {} texts: {} terms, {} non-zeros",
            counts.n_rows(),
            counts.n_cols(),
            counts.nnz()
        );
        self.classifier.fit(&weighted, labels)
    }

    fn predict(&self, texts: &[String]) -> Result<Array2<i64>> {
        let counts   = self.vectorizer.transform(texts)?;
        let weighted = self.tfidf.transform(&counts)?;
        self.classifier.predict(&weighted)
    }
}
